//! Recursive-descent parser from [`Token`]s to [`Codec`]s.
//!
//! ```text
//! Document  := Codec* EndOfFile
//! Codec     := ("upstream" | "downstream") Identifier "{" Field* "}"
//! Field     := Identifier ( ":" Unit | "{" Field* "}" )
//! Unit      := Number | String | "base37" | [order] [transformation] numeric-type
//! ```
//!
//! The parser is fail-fast: the first violation aborts the whole document.

use std::io::BufRead;

use tracing::debug;

use crate::ast::{
    ByteOrder, ByteWidth, Codec, CodecBuilder, DataValue, Direction, Signedness, Transformation,
    Value,
};
use crate::error::{Error, Expected, Result};
use crate::scanner::{ScanOptions, Scanner};
use crate::token::{Span, Token, TokenKind};

/// Numeric types accepted in a unit position.
pub const NUMERIC_TYPES: &[&str] = &[
    "i8", "i16", "i24", "i32", "i64", "u8", "u16", "u24", "u32", "u64",
];

/// Default limit on composite nesting below a codec.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub scan: ScanOptions,
    /// Deepest allowed field nesting; a codec's own fields are depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            scan: ScanOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse DSL source into codecs, in document order.
pub fn parse(source: &str) -> Result<Vec<Codec>> {
    parse_with_options(source, ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<Vec<Codec>> {
    Parser::with_options(source.as_bytes(), options).parse()
}

/// Parse everything `reader` yields. The reader is released before returning.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Codec>> {
    let mut parser = Parser::new(reader);
    let result = parser.parse();
    parser.close();
    result
}

pub struct Parser<R> {
    scanner: Scanner<R>,
    current: Token,
    max_depth: usize,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ParseOptions::default())
    }

    pub fn with_options(reader: R, options: ParseOptions) -> Self {
        Self::from_scanner(Scanner::with_options(reader, options.scan), options.max_depth)
    }

    pub fn from_scanner(scanner: Scanner<R>, max_depth: usize) -> Self {
        Parser {
            scanner,
            current: Token::new(TokenKind::EndOfFile, "", Span::empty(0)),
            max_depth,
        }
    }

    /// Parses the remaining input as a document.
    pub fn parse(&mut self) -> Result<Vec<Codec>> {
        self.advance()?;
        let mut codecs = Vec::new();
        while !self.current.is_eof() {
            codecs.push(self.parse_codec()?);
        }
        debug!(codecs = codecs.len(), "parsed document");
        Ok(codecs)
    }

    /// Releases the scanner and its reader.
    pub fn close(self) {
        self.scanner.close();
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.scanner.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: Expected) -> Error {
        Error::syntax(expected, self.current.display_text(), self.current.span)
    }

    fn ensure(&self, kind: TokenKind) -> Result<()> {
        if self.current.is(kind) {
            Ok(())
        } else {
            Err(self.unexpected(Expected::Kind(kind)))
        }
    }

    /// Consumes the current token if it has the given kind.
    fn skip(&mut self, kind: TokenKind) -> Result<Token> {
        self.ensure(kind)?;
        let next = self.scanner.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consumes the current keyword if `lookup` recognises it.
    fn optional_keyword<T>(&mut self, lookup: fn(&str) -> Option<T>) -> Result<Option<T>> {
        if !self.current.is(TokenKind::Keyword) {
            return Ok(None);
        }
        match lookup(&self.current.lexeme) {
            Some(found) => {
                self.advance()?;
                Ok(Some(found))
            }
            None => Ok(None),
        }
    }

    fn parse_codec(&mut self) -> Result<Codec> {
        let direction = self
            .current
            .is(TokenKind::Keyword)
            .then(|| Direction::from_keyword(&self.current.lexeme))
            .flatten()
            .ok_or_else(|| self.unexpected(Expected::OneOf(Direction::KEYWORDS)))?;
        self.advance()?;

        let name = self.skip(TokenKind::Identifier)?.lexeme;
        self.skip(TokenKind::OpenBrace)?;

        let mut builder = CodecBuilder::new(name, direction);
        while self.current.is(TokenKind::Identifier) {
            let span = self.current.span;
            let value = self.parse_field(1)?;
            if let Err(rejected) = builder.push(value) {
                return Err(Error::DuplicateField {
                    codec: builder.name().to_string(),
                    name: rejected.name().to_string(),
                    span: Some(span),
                });
            }
        }
        self.skip(TokenKind::CloseBrace)?;

        let codec = builder.build();
        debug!(name = codec.name(), direction = %codec.direction(), fields = codec.len(), "parsed codec");
        Ok(codec)
    }

    fn parse_field(&mut self, depth: usize) -> Result<Value> {
        if depth > self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
                span: self.current.span,
            });
        }
        let name = self.skip(TokenKind::Identifier)?.lexeme;

        match self.current.kind {
            TokenKind::Colon => {
                self.advance()?;
                self.parse_unit(name)
            }
            TokenKind::OpenBrace => {
                self.advance()?;
                let mut contents = Vec::new();
                while self.current.is(TokenKind::Identifier) {
                    contents.push(self.parse_field(depth + 1)?);
                }
                self.skip(TokenKind::CloseBrace)?;
                Ok(Value::composite(name, contents))
            }
            _ => Err(self.unexpected(Expected::Production(
                "a field value (starting with `:` or `{`)",
            ))),
        }
    }

    fn parse_unit(&mut self, name: String) -> Result<Value> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.skip(TokenKind::Number)?;
                Ok(Value::integer(name, parse_integer(&token)?))
            }
            TokenKind::String => {
                let token = self.skip(TokenKind::String)?;
                Ok(Value::string(name, token.lexeme))
            }
            TokenKind::Keyword if self.current.lexeme == "base37" => {
                self.advance()?;
                Ok(Value::base37(name))
            }
            TokenKind::Keyword | TokenKind::Identifier => {
                let order = self.optional_keyword(ByteOrder::from_keyword)?;
                let transformation = self.optional_keyword(Transformation::from_keyword)?;
                let (signedness, width) = self.parse_numeric_type()?;
                Ok(DataValue::new(
                    name,
                    signedness,
                    width,
                    transformation.unwrap_or_default(),
                    order.unwrap_or_default(),
                )
                .into())
            }
            _ => Err(self.unexpected(Expected::Production("a number, string, or type"))),
        }
    }

    fn parse_numeric_type(&mut self) -> Result<(Signedness, ByteWidth)> {
        let token = &self.current;
        let numeric = match token.kind {
            TokenKind::Keyword | TokenKind::Identifier => split_numeric_type(&token.lexeme),
            _ => None,
        };
        let Some((signedness, digits)) = numeric else {
            return Err(self.unexpected(Expected::OneOf(NUMERIC_TYPES)));
        };
        let width = digits
            .parse::<u32>()
            .ok()
            .and_then(ByteWidth::from_bits)
            .ok_or_else(|| Error::UnmappedWidth {
                lexeme: token.lexeme.clone(),
                span: token.span,
            })?;
        self.advance()?;
        Ok((signedness, width))
    }
}

/// Splits `i32` into its signedness and digit suffix.
fn split_numeric_type(lexeme: &str) -> Option<(Signedness, &str)> {
    let mut chars = lexeme.chars();
    let signedness = chars.next().and_then(Signedness::from_prefix)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((signedness, digits))
}

/// Underscores separate digit groups and are dropped before conversion.
fn parse_integer(token: &Token) -> Result<i64> {
    let digits: String = token.lexeme.chars().filter(|&c| c != '_').collect();
    digits.parse::<i64>().map_err(|_| Error::InvalidInteger {
        lexeme: token.lexeme.clone(),
        span: token.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(lexeme: &str) -> Token {
        Token::new(TokenKind::Number, lexeme, Span::new(0, lexeme.len()))
    }

    #[test]
    fn integers_drop_separators() {
        assert_eq!(parse_integer(&number("1_000_000")).unwrap(), 1_000_000);
        assert_eq!(parse_integer(&number("9223372036854775807")).unwrap(), i64::MAX);
    }

    #[test]
    fn integers_reject_overflow_and_bare_separators() {
        assert!(matches!(
            parse_integer(&number("9223372036854775808")),
            Err(Error::InvalidInteger { .. })
        ));
        assert!(matches!(parse_integer(&number("__")), Err(Error::InvalidInteger { .. })));
    }

    #[test]
    fn numeric_type_split() {
        assert_eq!(split_numeric_type("u24"), Some((Signedness::Unsigned, "24")));
        assert_eq!(split_numeric_type("i9"), Some((Signedness::Signed, "9")));
        assert_eq!(split_numeric_type("big"), None);
        assert_eq!(split_numeric_type("u"), None);
        assert_eq!(split_numeric_type("u16x"), None);
    }

    #[test]
    fn max_depth_is_enforced() {
        let options = ParseOptions {
            max_depth: 2,
            ..ParseOptions::default()
        };
        assert!(parse_with_options("upstream A { a { b: u8 } }", options).is_ok());
        let err = parse_with_options("upstream A { a { b { c: u8 } } }", options).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { limit: 2, .. }));
    }
}
