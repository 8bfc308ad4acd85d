use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::word::Word;

/// Two operand instructions. The discriminant is the 5 bit opcode that sits
/// in the low bits of the instruction word.
#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicOp {
    SET = 0x01,
    ADD = 0x02,
    SUB = 0x03,
    MUL = 0x04,
    MLI = 0x05,
    DIV = 0x06,
    DVI = 0x07,
    MOD = 0x08,
    MDI = 0x09,
    AND = 0x0A,
    BOR = 0x0B,
    XOR = 0x0C,
    SHR = 0x0D,
    ASR = 0x0E,
    SHL = 0x0F,

    IFB = 0x10,
    IFC = 0x11,
    IFE = 0x12,
    IFN = 0x13,
    IFG = 0x14,
    IFA = 0x15,
    IFL = 0x16,
    IFU = 0x17,

    ADX = 0x1A,
    SBX = 0x1B,

    STI = 0x1E,
    STD = 0x1F,
}

/// One operand instructions. These live in the `b` field of a word whose
/// low five bits are zero.
#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialOp {
    JSR = 0x01,

    INT = 0x08,
    IAG = 0x09,
    IAS = 0x0A,
    RFI = 0x0B,
    IAQ = 0x0C,

    HWN = 0x10,
    HWQ = 0x11,
    HWI = 0x12,
}

#[derive(FromPrimitive, EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    X = 3,
    Y = 4,
    Z = 5,
    I = 6,
    J = 7,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRegister {
    SP = 0x1B,
    PC = 0x1C,
    EX = 0x1D,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    PUSH,
    POP,
    PEEK,
}

impl StackOp {
    pub fn code(&self) -> u8 {
        match self {
            StackOp::PUSH | StackOp::POP => PUSH_POP,
            StackOp::PEEK => PEEK,
        }
    }
}

pub const INDIRECT_REGISTER: u8 = 0x08;
pub const INDIRECT_OFFSET: u8 = 0x10;
pub const PUSH_POP: u8 = 0x18;
pub const PEEK: u8 = 0x19;
pub const PICK: u8 = 0x1A;
pub const INDIRECT_NEXT_WORD: u8 = 0x1E;
pub const NEXT_WORD: u8 = 0x1F;
pub const INLINE_LITERAL: u8 = 0x20;

/// Largest non-negative value that fits in the `a` field.
pub const INLINE_MAX: Word = 30;

const OPCODE_MASK: Word = 0x1F;
const B_MASK: Word = 0x1F;
const A_MASK: Word = 0x3F;

/// Field code for a literal folded into the `a` field, if it fits.
/// Covers 0xFFFF (-1) and 0 through 30.
pub fn inline_literal(value: Word) -> Option<u8> {
    match value {
        0xFFFF => Some(INLINE_LITERAL),
        v if v <= INLINE_MAX => Some(INLINE_LITERAL + 1 + v as u8),
        _ => None,
    }
}

/// Whether an operand field code is followed by a word of its own.
pub fn takes_next_word(code: u8) -> bool {
    matches!(code, 0x10..=0x17 | PICK | INDIRECT_NEXT_WORD | NEXT_WORD)
}

/// An encoded operand: the field bits plus the trailing word, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    pub code: u8,
    pub next_word: Option<Word>,
}

impl Value {
    pub fn field(code: u8) -> Self {
        Self {
            code,
            next_word: None,
        }
    }

    pub fn with_word(code: u8, word: Word) -> Self {
        Self {
            code,
            next_word: Some(word),
        }
    }

    pub fn is_inline_literal(&self) -> bool {
        self.code >= INLINE_LITERAL
    }

    fn len(&self) -> usize {
        usize::from(self.next_word.is_some())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no instruction word to decode")]
    Empty,
    #[error("unknown opcode in {0:#06x}")]
    UnknownOpcode(Word),
    #[error("instruction {0:#06x} is missing a trailing word")]
    Truncated(Word),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Basic { opcode: BasicOp, b: Value, a: Value },
    Special { opcode: SpecialOp, a: Value },
}

impl Instruction {
    pub fn len(&self) -> usize {
        match self {
            Instruction::Basic { b, a, .. } => 1 + b.len() + a.len(),
            Instruction::Special { a, .. } => 1 + a.len(),
        }
    }

    /// The instruction word followed by `b`'s trailing word and then `a`'s.
    pub fn to_words(&self) -> Vec<Word> {
        match self {
            Instruction::Basic { opcode, b, a } => {
                let word = *opcode as Word | Word::from(b.code) << 5 | Word::from(a.code) << 10;
                [Some(word), b.next_word, a.next_word]
                    .into_iter()
                    .flatten()
                    .collect()
            }
            Instruction::Special { opcode, a } => {
                let word = (*opcode as Word) << 5 | Word::from(a.code) << 10;
                [Some(word), a.next_word].into_iter().flatten().collect()
            }
        }
    }

    /// Decode one instruction from the front of `words`, returning it along
    /// with the number of words it used.
    pub fn from_words(words: &[Word]) -> Result<(Self, usize), DecodeError> {
        let (&word, mut rest) = words.split_first().ok_or(DecodeError::Empty)?;
        let mut operand = |code: u8| -> Result<Value, DecodeError> {
            if takes_next_word(code) {
                let (&next, tail) = rest.split_first().ok_or(DecodeError::Truncated(word))?;
                rest = tail;
                Ok(Value::with_word(code, next))
            } else {
                Ok(Value::field(code))
            }
        };

        let a_code = ((word >> 10) & A_MASK) as u8;
        let b_code = ((word >> 5) & B_MASK) as u8;
        let instruction = match word & OPCODE_MASK {
            0 => {
                let opcode = SpecialOp::from_u16(b_code.into())
                    .ok_or(DecodeError::UnknownOpcode(word))?;
                let a = operand(a_code)?;
                Instruction::Special { opcode, a }
            }
            op => {
                let opcode = BasicOp::from_u16(op).ok_or(DecodeError::UnknownOpcode(word))?;
                let b = operand(b_code)?;
                let a = operand(a_code)?;
                Instruction::Basic { opcode, b, a }
            }
        };

        let len = instruction.len();
        Ok((instruction, len))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_inline_literal_range() {
        assert_eq!(inline_literal(0xFFFF), Some(0x20));
        assert_eq!(inline_literal(0), Some(0x21));
        assert_eq!(inline_literal(30), Some(0x3F));
        assert_eq!(inline_literal(31), None);
        assert_eq!(inline_literal(0xFFFE), None);
    }

    #[test]
    fn test_mnemonics_parse() {
        assert_eq!(BasicOp::from_str("IFN"), Ok(BasicOp::IFN));
        assert_eq!(SpecialOp::from_str("HWI"), Ok(SpecialOp::HWI));
        assert!(BasicOp::from_str("JSR").is_err());
        assert!(SpecialOp::from_str("SET").is_err());
    }

    #[test]
    fn test_opcode_spaces_are_disjoint() {
        for op in BasicOp::iter() {
            assert_ne!(op as Word & OPCODE_MASK, 0, "{} collides with special space", op);
        }
        for op in SpecialOp::iter() {
            let word = Instruction::Special {
                opcode: op,
                a: Value::field(0),
            }
            .to_words()[0];
            assert_eq!(word & OPCODE_MASK, 0);
        }
    }

    #[test]
    fn test_trailing_word_order() {
        let instruction = Instruction::Basic {
            opcode: BasicOp::SET,
            b: Value::with_word(INDIRECT_NEXT_WORD, 0x1000),
            a: Value::with_word(NEXT_WORD, 0x0020),
        };

        assert_eq!(instruction.to_words(), vec![0x7FC1, 0x1000, 0x0020]);
        assert_eq!(instruction.len(), 3);
    }

    #[test]
    fn test_jsr_word() {
        let instruction = Instruction::Special {
            opcode: SpecialOp::JSR,
            a: Value::with_word(NEXT_WORD, 0x0015),
        };

        assert_eq!(instruction.to_words(), vec![0x7C20, 0x0015]);
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            Instruction::from_words(&[0x7C01]),
            Err(DecodeError::Truncated(0x7C01))
        );
        assert_eq!(
            Instruction::from_words(&[0x0000]),
            Err(DecodeError::UnknownOpcode(0x0000))
        );
    }
}
