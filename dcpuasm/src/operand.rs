use std::str::FromStr;

use libdcpu::{
    op::{
        inline_literal, Register, SpecialRegister, StackOp, Value, INDIRECT_NEXT_WORD,
        INDIRECT_OFFSET, INDIRECT_REGISTER, NEXT_WORD, PICK,
    },
    word::Word,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, tuple},
    Finish, IResult,
};
use strum_macros::Display;

use crate::{
    constants::{is_identifier, is_operand_keyword, looks_numeric, parse_number},
    error::{LabelError, ParseError},
    labels::Labels,
};

/// A name as matched (`key`) and as written (`spelling`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub key: String,
    pub spelling: String,
}

impl Ident {
    pub fn new(key: &str, spelling: &str) -> Self {
        Self {
            key: key.to_owned(),
            spelling: spelling.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(Word),
    Symbol(Ident),
}

impl Literal {
    /// Numbers wrap modulo 0x10000, so -1 is 0xFFFF.
    pub fn parse(key: &str, spelling: &str) -> Result<Self, ParseError> {
        if looks_numeric(key) {
            let value = parse_number(spelling)?;
            if !(-0x8000..=0xFFFF).contains(&value) {
                return Err(ParseError::LiteralOutOfRange(spelling.to_owned()));
            }
            Ok(Literal::Number(value.rem_euclid(0x10000) as Word))
        } else if is_identifier(key) && !is_operand_keyword(key) {
            Ok(Literal::Symbol(Ident::new(key, spelling)))
        } else {
            Err(ParseError::MalformedOperand(spelling.to_owned()))
        }
    }

    pub fn resolve(&self, labels: &Labels) -> Result<Word, LabelError> {
        match self {
            Literal::Number(value) => Ok(*value),
            Literal::Symbol(ident) => labels.get(ident),
        }
    }

    fn symbol(&self) -> Option<&Ident> {
        match self {
            Literal::Number(_) => None,
            Literal::Symbol(ident) => Some(ident),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indirection {
    Register(Register),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Stack(StackOp),
    Pick(Literal),
    Special(SpecialRegister),
    Literal(Literal),
    Indirect(Indirection),
    IndirectOffset { base: Literal, reg: Register },
}

/// Destination operands go in the 5 bit `b` field, sources in the 6 bit
/// `a` field.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Position {
    Destination,
    Source,
}

// What a bracketed operand looks like before registers are told apart
// from offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Bracketed<'a> {
    Push,
    Pop,
    Sum(Vec<&'a str>),
}

fn atom(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(char('-')),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(i)
}

fn bracketed(i: &str) -> IResult<&str, Bracketed> {
    delimited(
        pair(char('['), space0),
        alt((
            map(pair(tag("--"), tag_no_case("SP")), |_| Bracketed::Push),
            map(tuple((tag_no_case("SP"), space0, tag("++"))), |_| Bracketed::Pop),
            map(
                separated_list1(delimited(space0, char('+'), space0), atom),
                Bracketed::Sum,
            ),
        )),
        pair(space0, char(']')),
    )(i)
}

impl Operand {
    pub fn parse(key: &str, spelling: &str) -> Result<Self, ParseError> {
        if spelling.starts_with('[') {
            let (_, inner) = all_consuming(bracketed)(spelling)
                .finish()
                .map_err(|_| ParseError::MalformedIndirection(spelling.to_owned()))?;
            return Self::from_bracketed(inner, spelling);
        }

        if let Ok(reg) = Register::from_str(key) {
            Ok(Operand::Register(reg))
        } else if let Ok(special) = SpecialRegister::from_str(key) {
            Ok(Operand::Special(special))
        } else if let Ok(stack) = StackOp::from_str(key) {
            Ok(Operand::Stack(stack))
        } else {
            Ok(Operand::Literal(Literal::parse(key, spelling)?))
        }
    }

    pub fn pick(key: &str, spelling: &str) -> Result<Self, ParseError> {
        Ok(Operand::Pick(Literal::parse(key, spelling)?))
    }

    fn from_bracketed(inner: Bracketed, spelling: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedIndirection(spelling.to_owned());
        let offset = |text: &str| {
            Literal::parse(&text.to_ascii_uppercase(), text).map_err(|_| malformed())
        };

        let parts = match inner {
            Bracketed::Push => return Ok(Operand::Stack(StackOp::PUSH)),
            Bracketed::Pop => return Ok(Operand::Stack(StackOp::POP)),
            Bracketed::Sum(parts) => parts,
        };
        let keys = parts
            .iter()
            .map(|part| part.to_ascii_uppercase())
            .collect::<Vec<_>>();

        match (parts.as_slice(), keys.as_slice()) {
            ([_], [key]) if key == "SP" => Ok(Operand::Stack(StackOp::PEEK)),
            ([part], [key]) => match Register::from_str(key) {
                Ok(reg) => Ok(Operand::Indirect(Indirection::Register(reg))),
                Err(_) => Ok(Operand::Indirect(Indirection::Literal(offset(*part)?))),
            },
            ([left, right], [left_key, right_key]) => {
                match (Register::from_str(left_key), Register::from_str(right_key)) {
                    (Ok(reg), Err(_)) if right_key != "SP" => Ok(Operand::IndirectOffset {
                        base: offset(*right)?,
                        reg,
                    }),
                    (Err(_), Ok(reg)) if left_key != "SP" => Ok(Operand::IndirectOffset {
                        base: offset(*left)?,
                        reg,
                    }),
                    (Err(_), Err(_)) if left_key == "SP" => Ok(Operand::Pick(offset(*right)?)),
                    (Err(_), Err(_)) if right_key == "SP" => Ok(Operand::Pick(offset(*left)?)),
                    _ => Err(malformed()),
                }
            }
            _ => Err(malformed()),
        }
    }

    /// PUSH only makes sense as a destination and POP only as a source.
    pub fn check_position(&self, position: Position) -> Result<(), ParseError> {
        match (self, position) {
            (Operand::Stack(op @ StackOp::PUSH), Position::Source)
            | (Operand::Stack(op @ StackOp::POP), Position::Destination) => {
                Err(ParseError::MisplacedStackOp {
                    op: op.to_string(),
                    position,
                })
            }
            _ => Ok(()),
        }
    }

    /// Words this operand adds after the instruction word. Symbols always
    /// take a word since their value is not known yet.
    pub fn extra_words(&self, position: Position) -> usize {
        match self {
            Operand::Register(_)
            | Operand::Stack(_)
            | Operand::Special(_)
            | Operand::Indirect(Indirection::Register(_)) => 0,
            Operand::Literal(Literal::Number(value))
                if position == Position::Source && inline_literal(*value).is_some() =>
            {
                0
            }
            Operand::Literal(_)
            | Operand::Pick(_)
            | Operand::Indirect(Indirection::Literal(_))
            | Operand::IndirectOffset { .. } => 1,
        }
    }

    pub fn encode(&self, position: Position, labels: &Labels) -> Result<Value, LabelError> {
        Ok(match self {
            Operand::Register(reg) => Value::field(*reg as u8),
            Operand::Stack(op) => Value::field(op.code()),
            Operand::Special(special) => Value::field(*special as u8),
            Operand::Pick(n) => Value::with_word(PICK, n.resolve(labels)?),
            Operand::Indirect(Indirection::Register(reg)) => {
                Value::field(INDIRECT_REGISTER + *reg as u8)
            }
            Operand::Indirect(Indirection::Literal(lit)) => {
                Value::with_word(INDIRECT_NEXT_WORD, lit.resolve(labels)?)
            }
            Operand::IndirectOffset { base, reg } => {
                Value::with_word(INDIRECT_OFFSET + *reg as u8, base.resolve(labels)?)
            }
            Operand::Literal(Literal::Number(value)) => match inline_literal(*value) {
                Some(code) if position == Position::Source => Value::field(code),
                _ => Value::with_word(NEXT_WORD, *value),
            },
            Operand::Literal(Literal::Symbol(ident)) => {
                Value::with_word(NEXT_WORD, labels.get(ident)?)
            }
        })
    }

    /// The label this operand refers to, if any.
    pub fn symbol(&self) -> Option<&Ident> {
        match self {
            Operand::Pick(lit)
            | Operand::Literal(lit)
            | Operand::IndirectOffset { base: lit, .. }
            | Operand::Indirect(Indirection::Literal(lit)) => lit.symbol(),
            _ => None,
        }
    }
}
