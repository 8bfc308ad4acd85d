use std::fmt::Display;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{alpha1, alphanumeric1, anychar, char, multispace0, one_of, space1},
    combinator::{all_consuming, map, opt, recognize, rest},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use crate::error::LexError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Anything outside quotes. `key` is upper-cased for matching,
    /// `spelling` is kept for messages.
    Word { key: String, spelling: String },
    /// Quoted string contents with escapes applied.
    Str(String),
    Comma,
}

impl Token {
    fn word(spelling: &str) -> Self {
        Token::Word {
            key: spelling.to_ascii_uppercase(),
            spelling: spelling.to_owned(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word { spelling, .. } => write!(f, "{}", spelling),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Comma => write!(f, ","),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '+' | '-')
}

/// A label or symbol name.
pub fn ident(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(i)
}

fn word(i: &str) -> IResult<&str, Token> {
    map(take_while1(is_word_char), Token::word)(i)
}

fn comma(i: &str) -> IResult<&str, Token> {
    map(char(','), |_| Token::Comma)(i)
}

// `\"` and `\\` are the only escapes, anything else is kept as written.
fn string_piece(i: &str) -> IResult<&str, &str> {
    alt((
        preceded(char('\\'), recognize(one_of("\"\\"))),
        recognize(pair(char('\\'), anychar)),
        is_not("\"\\"),
    ))(i)
}

fn string(i: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('"'),
            fold_many0(string_piece, String::new, |mut contents, piece| {
                contents.push_str(piece);
                contents
            }),
            char('"'),
        ),
        Token::Str,
    )(i)
}

fn indirection_body(i: &str) -> IResult<&str, &str> {
    recognize(many0(alt((space1, take_while1(is_word_char)))))(i)
}

// Brackets stay one token, spaces and all, so `[0x10 + A]` reaches the
// operand parser whole.
fn indirection(i: &str) -> IResult<&str, Token> {
    map(
        recognize(tuple((char('['), indirection_body, char(']')))),
        Token::word,
    )(i)
}

fn token(i: &str) -> IResult<&str, Token> {
    alt((string, indirection, comma, word))(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    preceded(char(';'), rest)(i)
}

fn tokens(i: &str) -> IResult<&str, Vec<Token>> {
    terminated(
        many0(preceded(multispace0, token)),
        pair(multispace0, opt(comment)),
    )(i)
}

/// Split one source line into tokens, dropping the comment.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    all_consuming(tokens)(line)
        .finish()
        .map(|(_, tokens)| tokens)
        .map_err(|e| lex_error(e.input))
}

// `rest` starts at the first character no token could be read from.
fn lex_error(rest: &str) -> LexError {
    match rest.chars().next() {
        Some('"') | None => LexError::UnterminatedString,
        Some('[') => {
            let inner = &rest[1..];
            let after = indirection_body(inner).map_or(inner, |(after, _)| after);
            match after.chars().next() {
                Some(c) if c != ';' => LexError::IllegalCharacter(c),
                _ => LexError::UnterminatedIndirection,
            }
        }
        Some(c) => LexError::IllegalCharacter(c),
    }
}
