use libdcpu::op::{BasicOp, SpecialOp};
use nom::{character::complete::char, combinator::all_consuming, sequence::preceded, Finish};

use crate::{
    constants::{is_mnemonic, PICK},
    data::DatumSource,
    directive::Directive,
    error::{AsmError, AtLine, DataError, ErrorKind, ParseError},
    lexer::{ident, tokenize, Token},
    operand::{Ident, Operand, Position},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Basic {
        opcode: BasicOp,
        b: Operand,
        a: Operand,
    },
    Special {
        opcode: SpecialOp,
        a: Operand,
    },
    Data(Vec<DatumSource>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line_no: usize,
    pub text: String,
    pub label: Option<Ident>,
    pub statement: Option<Statement>,
}

/// Parse every line of a program, stopping at the first error.
pub fn parse_program(program_text: &str) -> Result<Vec<ParsedLine>, AsmError> {
    program_text
        .lines()
        .enumerate()
        .map(|(index, text)| {
            let line_no = index + 1;
            let (label, statement) = parse_line(text).at_line(line_no)?;
            Ok(ParsedLine {
                line_no,
                text: text.trim().to_owned(),
                label,
                statement,
            })
        })
        .collect()
}

fn parse_line(text: &str) -> Result<(Option<Ident>, Option<Statement>), ErrorKind> {
    let tokens = tokenize(text)?;
    log::trace!("tokens {:?}", tokens);
    let mut tokens = tokens.into_iter().peekable();

    let is_label = |t: &Token| matches!(t, Token::Word { key, .. } if key.starts_with(':'));
    let label = match tokens.next_if(is_label) {
        Some(Token::Word { spelling, .. }) => Some(parse_label(&spelling)?),
        _ => None,
    };

    let statement = match tokens.next() {
        None => None,
        Some(Token::Word { key, spelling }) => {
            let directive = Directive::from_str(&key)
                .ok_or_else(|| ParseError::UnknownMnemonic(spelling.clone()))?;
            let rest = tokens.collect::<Vec<_>>();
            Some(parse_statement(directive, &spelling, &rest)?)
        }
        Some(Token::Comma) => return Err(ParseError::MisplacedSeparator.into()),
        Some(token) => return Err(ParseError::UnknownMnemonic(token.to_string()).into()),
    };

    Ok((label, statement))
}

/// `:name`, where the name is an identifier that is not a mnemonic.
fn parse_label(spelling: &str) -> Result<Ident, ParseError> {
    let (_, name) = all_consuming(preceded(char(':'), ident))(spelling)
        .finish()
        .map_err(|_| ParseError::InvalidLabel(spelling.trim_start_matches(':').to_owned()))?;

    let key = name.to_ascii_uppercase();
    if is_mnemonic(&key) {
        return Err(ParseError::ReservedLabel(name.to_owned()));
    }
    Ok(Ident::new(&key, name))
}

fn parse_statement(
    directive: Directive,
    mnemonic: &str,
    tokens: &[Token],
) -> Result<Statement, ErrorKind> {
    let items = separated(tokens)?;
    Ok(match directive {
        Directive::Data => return parse_data(&items),
        Directive::Basic(opcode) => {
            let [b, a] = operands(mnemonic, &items)?;
            b.check_position(Position::Destination)?;
            a.check_position(Position::Source)?;
            Statement::Basic { opcode, b, a }
        }
        Directive::Special(opcode) => {
            let [a] = operands(mnemonic, &items)?;
            a.check_position(Position::Source)?;
            Statement::Special { opcode, a }
        }
    })
}

// Items are split on commas. An empty item means a doubled, leading or
// trailing comma.
fn separated(tokens: &[Token]) -> Result<Vec<&[Token]>, ParseError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let items = tokens
        .split(|token| *token == Token::Comma)
        .collect::<Vec<_>>();
    if items.iter().any(|item| item.is_empty()) {
        return Err(ParseError::MisplacedSeparator);
    }
    Ok(items)
}

// The operand count of each instruction class is fixed by its array length.
fn operands<const N: usize>(
    mnemonic: &str,
    items: &[&[Token]],
) -> Result<[Operand; N], ParseError> {
    let operands = items
        .iter()
        .map(|item| parse_operand(item))
        .collect::<Result<Vec<_>, _>>()?;

    <[Operand; N]>::try_from(operands).map_err(|found| ParseError::Arity {
        mnemonic: mnemonic.to_owned(),
        expected: N,
        found: found.len(),
    })
}

// `PICK n` is the only operand spread over two tokens.
fn parse_operand(item: &[Token]) -> Result<Operand, ParseError> {
    match item {
        [Token::Word { key, spelling }] => Operand::parse(key, spelling),
        [Token::Word { key: pick, .. }, Token::Word { key, spelling }] if pick == PICK => {
            Operand::pick(key, spelling)
        }
        [Token::Word { key: pick, .. }, _, next, ..] if pick == PICK => {
            Err(ParseError::MissingSeparator(next.to_string()))
        }
        [_, next, ..] => Err(ParseError::MissingSeparator(next.to_string())),
        [token] => Err(ParseError::MalformedOperand(token.to_string())),
        [] => Err(ParseError::MisplacedSeparator),
    }
}

fn parse_data(items: &[&[Token]]) -> Result<Statement, ErrorKind> {
    if items.is_empty() {
        return Err(DataError::Empty.into());
    }

    items
        .iter()
        .map(|item| match item {
            [Token::Str(s)] => Ok(DatumSource::Str(s.clone())),
            [Token::Word { key, spelling }] => DatumSource::parse(key, spelling),
            [_, next, ..] => Err(ParseError::MissingSeparator(next.to_string()).into()),
            _ => Err(ParseError::MisplacedSeparator.into()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Statement::Data)
}
