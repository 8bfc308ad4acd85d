use libdcpu::word::Word;
use strum_macros::{Display, EnumString};

use crate::{
    constants::{is_identifier, is_operand_keyword, looks_numeric, parse_number},
    error::{DataError, ErrorKind, LabelError, ParseError},
    labels::Labels,
    operand::Ident,
};

/// How quoted strings in DAT are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum StringPacking {
    /// One character code per word.
    #[default]
    #[strum(serialize = "word")]
    OnePerWord,
    /// Two bytes per word, high byte first, zero padded.
    #[strum(serialize = "packed")]
    Packed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatumSource {
    Str(String),
    Number(Word),
    Symbol(Ident),
}

impl DatumSource {
    pub fn parse(key: &str, spelling: &str) -> Result<Self, ErrorKind> {
        if looks_numeric(key) {
            let value = parse_number(spelling).map_err(|e| match e {
                ParseError::LiteralOutOfRange(_) => DataError::OutOfRange(spelling.to_owned()),
                _ => DataError::Malformed(spelling.to_owned()),
            })?;
            Word::try_from(value)
                .map(DatumSource::Number)
                .map_err(|_| DataError::OutOfRange(spelling.to_owned()).into())
        } else if is_identifier(key) && !is_operand_keyword(key) {
            Ok(DatumSource::Symbol(Ident::new(key, spelling)))
        } else {
            Err(DataError::Malformed(spelling.to_owned()).into())
        }
    }

    pub fn len(&self, packing: StringPacking) -> usize {
        match self {
            DatumSource::Str(s) => encode_string(s, packing).len(),
            DatumSource::Number(_) | DatumSource::Symbol(_) => 1,
        }
    }

    pub fn encode(
        &self,
        packing: StringPacking,
        labels: &Labels,
    ) -> Result<Vec<Word>, LabelError> {
        Ok(match self {
            DatumSource::Str(s) => encode_string(s, packing),
            DatumSource::Number(value) => vec![*value],
            DatumSource::Symbol(ident) => vec![labels.get(ident)?],
        })
    }

    pub fn symbol(&self) -> Option<&Ident> {
        match self {
            DatumSource::Symbol(ident) => Some(ident),
            _ => None,
        }
    }
}

pub fn encode_string(s: &str, packing: StringPacking) -> Vec<Word> {
    match packing {
        StringPacking::OnePerWord => s.encode_utf16().collect(),
        StringPacking::Packed => s
            .as_bytes()
            .chunks(2)
            .map(|pair| match pair {
                [hi, lo] => Word::from_be_bytes([*hi, *lo]),
                [hi] => Word::from_be_bytes([*hi, 0]),
                _ => 0,
            })
            .collect(),
    }
}
