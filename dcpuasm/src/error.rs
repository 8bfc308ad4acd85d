use libdcpu::word::MemoryError;
use thiserror::Error;

use crate::operand::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated indirection, expected ']'")]
    UnterminatedIndirection,
    #[error("illegal character {0:?}")]
    IllegalCharacter(char),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown mnemonic {0}")]
    UnknownMnemonic(String),
    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    Arity {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    #[error("expected ',' before {0}")]
    MissingSeparator(String),
    #[error("unexpected ','")]
    MisplacedSeparator,
    #[error("malformed operand {0}")]
    MalformedOperand(String),
    #[error("malformed indirection {0}")]
    MalformedIndirection(String),
    #[error("{0} is not a valid label name")]
    InvalidLabel(String),
    #[error("label {0} collides with a mnemonic")]
    ReservedLabel(String),
    #[error("literal {0} does not fit in 16 bits")]
    LiteralOutOfRange(String),
    #[error("malformed number {0}")]
    MalformedNumber(String),
    #[error("{0} has a leading zero, write it with a 0x, 0o or 0b prefix or without the zero")]
    AmbiguousLeadingZero(String),
    #[error("{op} cannot be used as the {position} operand")]
    MisplacedStackOp { op: String, position: Position },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("label {name} is already defined on line {first_line}")]
    Duplicate { name: String, first_line: usize },
    #[error("undefined label {0}")]
    Undefined(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("data value {0} is outside 0..=0xFFFF")]
    OutOfRange(String),
    #[error("malformed data item {0}")]
    Malformed(String),
    #[error("DAT needs at least one item")]
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("statement was sized at {sized} words but assembled to {emitted}")]
    SizeMismatch { sized: usize, emitted: usize },
    #[error("statement was placed at {expected:#06x} but assembled at {actual:#06x}")]
    AddressMismatch { expected: usize, actual: usize },
}

/// Any failure while assembling, tagged with the 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: ErrorKind,
}

pub(crate) trait AtLine<T> {
    fn at_line(self, line: usize) -> Result<T, AsmError>;
}

impl<T, E: Into<ErrorKind>> AtLine<T> for Result<T, E> {
    fn at_line(self, line: usize) -> Result<T, AsmError> {
        self.map_err(|e| AsmError {
            line,
            kind: e.into(),
        })
    }
}
