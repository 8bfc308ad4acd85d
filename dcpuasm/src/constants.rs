use std::str::FromStr;

use libdcpu::op::{BasicOp, Register, SpecialOp, SpecialRegister, StackOp};
use nom::combinator::all_consuming;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::{error::ParseError, lexer::ident};

pub static NUMBER_REGEX: OnceCell<Regex> = OnceCell::new();
static NUMBER_REGEX_PATTERN: &str = r#"^(?P<neg>-)?(?:0[xX](?P<hex>[0-9a-fA-F]+)|0[oO](?P<oct>[0-7]+)|0[bB](?P<bin>[01]+)|(?P<dec>[0-9]+))$"#;

pub const DATA_DIRECTIVE: &str = "DAT";
pub const PICK: &str = "PICK";

pub fn number_regex() -> &'static Regex {
    NUMBER_REGEX.get_or_init(|| Regex::new(NUMBER_REGEX_PATTERN).expect("Invalid number regex"))
}

pub fn is_identifier(s: &str) -> bool {
    all_consuming(ident)(s).is_ok()
}

/// Tokens that start like a number are parsed as one or rejected.
pub fn looks_numeric(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

/// Mnemonics and directives, which can never name a label.
pub fn is_mnemonic(key: &str) -> bool {
    key == DATA_DIRECTIVE || BasicOp::from_str(key).is_ok() || SpecialOp::from_str(key).is_ok()
}

/// Names that mean something in operand position.
pub fn is_operand_keyword(key: &str) -> bool {
    key == PICK
        || Register::from_str(key).is_ok()
        || SpecialRegister::from_str(key).is_ok()
        || StackOp::from_str(key).is_ok()
}

/// Parse a numeric literal. Plain decimals may not start with a zero since
/// older sources disagree on whether that means octal.
pub fn parse_number(s: &str) -> Result<i64, ParseError> {
    let captures = number_regex()
        .captures(s)
        .ok_or_else(|| ParseError::MalformedNumber(s.to_owned()))?;

    let (digits, radix) = if let Some(hex) = captures.name("hex") {
        (hex.as_str(), 16)
    } else if let Some(oct) = captures.name("oct") {
        (oct.as_str(), 8)
    } else if let Some(bin) = captures.name("bin") {
        (bin.as_str(), 2)
    } else if let Some(dec) = captures.name("dec") {
        if dec.as_str().len() > 1 && dec.as_str().starts_with('0') {
            return Err(ParseError::AmbiguousLeadingZero(s.to_owned()));
        }
        (dec.as_str(), 10)
    } else {
        return Err(ParseError::MalformedNumber(s.to_owned()));
    };

    let magnitude = i64::from_str_radix(digits, radix)
        .map_err(|_| ParseError::LiteralOutOfRange(s.to_owned()))?;

    Ok(if captures.name("neg").is_some() {
        -magnitude
    } else {
        magnitude
    })
}
