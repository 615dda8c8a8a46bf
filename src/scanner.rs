//! Lexical analysis: turns a character stream into [`Token`]s on demand.
//!
//! The scanner reads UTF-8 from any [`BufRead`] one code point at a time and
//! never buffers more than the single character it peeked at. Spans are byte
//! offsets into the original input.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use tracing::trace;

use crate::error::{Error, Result};
use crate::token::{is_keyword, Span, Token, TokenKind};

/// Code points discarded between tokens.
pub const WHITESPACE: &[char] = &[
    ' ', '\n', '\r', '\t',
    '\u{000C}', // form feed
    '\u{000B}', // line tab
    '\u{0085}', // next line
    '\u{00A0}', // no-break space
    '\u{1680}', // ogham space mark
    '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
    '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', // en quad ..= hair space
    '\u{2028}', // line separator
    '\u{2029}', // paragraph separator
    '\u{202F}', // narrow no-break space
    '\u{205F}', // medium mathematical space
    '\u{3000}', // ideographic space
];

pub fn is_whitespace(c: char) -> bool {
    WHITESPACE.contains(&c)
}

/// How `#` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentStyle {
    /// Drop the `#` itself and keep scanning right after it.
    #[default]
    Marker,
    /// Drop everything from `#` through the end of the line.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    pub comments: CommentStyle,
}

/// Sequential character input with a single, non-nesting mark.
struct CharSource<R> {
    reader: R,
    /// Bytes decoded from `reader` so far.
    decoded: usize,
    marked: bool,
    /// Characters read since `mark`, replayed by `reset`.
    recorded: Vec<char>,
    pending: VecDeque<char>,
}

impl<R: BufRead> CharSource<R> {
    fn new(reader: R) -> Self {
        CharSource {
            reader,
            decoded: 0,
            marked: false,
            recorded: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    fn mark(&mut self) -> Result<()> {
        if self.marked {
            return Err(Error::AlreadyMarked);
        }
        self.marked = true;
        self.recorded.clear();
        Ok(())
    }

    fn reset(&mut self) {
        for c in self.recorded.drain(..).rev() {
            self.pending.push_front(c);
        }
        self.marked = false;
    }

    fn read(&mut self) -> Result<Option<char>> {
        let next = match self.pending.pop_front() {
            Some(c) => Some(c),
            None => self.decode()?,
        };
        if self.marked {
            self.recorded.extend(next);
        }
        Ok(next)
    }

    fn decode(&mut self) -> Result<Option<char>> {
        let offset = self.decoded;
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first).ok_or(Error::InvalidUtf8 { offset })?;
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or(Error::InvalidUtf8 { offset })?;
        }
        self.decoded += width;
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(Error::InvalidUtf8 { offset })
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = loop {
            match self.reader.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if byte.is_some() {
            self.reader.consume(1);
        }
        Ok(byte)
    }
}

/// Encoded length announced by a UTF-8 leading byte.
fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || c == '_'
}

fn is_identifier_tail(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Pull-based tokenizer over a [`BufRead`].
///
/// Once the input is exhausted every call to [`next_token`](Self::next_token)
/// returns an [`EndOfFile`](TokenKind::EndOfFile) token.
pub struct Scanner<R> {
    source: CharSource<R>,
    options: ScanOptions,
    /// Byte offset just past the last consumed character.
    offset: usize,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ScanOptions::default())
    }

    pub fn with_options(reader: R, options: ScanOptions) -> Self {
        Scanner {
            source: CharSource::new(reader),
            options,
            offset: 0,
        }
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let start = self.offset;
            let Some(c) = self.advance()? else {
                return Ok(Token::new(TokenKind::EndOfFile, "", Span::empty(start)));
            };

            let token = match c {
                c if c.is_ascii_alphabetic() => self.identifier(c, start)?,
                c if is_decimal_digit(c) => self.number(c, start)?,
                '{' => self.single(TokenKind::OpenBrace, c, start),
                '}' => self.single(TokenKind::CloseBrace, c, start),
                ',' => self.single(TokenKind::Comma, c, start),
                ':' => self.single(TokenKind::Colon, c, start),
                '"' => self.string(start)?,
                '#' => {
                    if self.options.comments == CommentStyle::Line {
                        self.skip_line()?;
                    }
                    continue;
                }
                c if is_whitespace(c) => continue,
                c => {
                    trace!(character = ?c, offset = start, "skipping unrecognised character");
                    continue;
                }
            };

            trace!(kind = ?token.kind, lexeme = %token.lexeme, start = token.span.start, end = token.span.end, "token");
            return Ok(token);
        }
    }

    /// Scans the remaining input. The returned tokens end with exactly one
    /// [`EndOfFile`](TokenKind::EndOfFile).
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.source.reader
    }

    /// Releases the underlying reader.
    pub fn close(self) {
        drop(self.into_inner());
    }

    fn advance(&mut self) -> Result<Option<char>> {
        let next = self.source.read()?;
        if let Some(c) = next {
            self.offset += c.len_utf8();
        }
        Ok(next)
    }

    fn peek(&mut self) -> Result<Option<char>> {
        self.source.mark()?;
        let next = self.source.read();
        self.source.reset();
        next
    }

    fn read_while(&mut self, lexeme: &mut String, predicate: fn(char) -> bool) -> Result<()> {
        while let Some(c) = self.peek()? {
            if !predicate(c) {
                break;
            }
            lexeme.push(c);
            self.advance()?;
        }
        Ok(())
    }

    fn single(&self, kind: TokenKind, c: char, start: usize) -> Token {
        Token::new(kind, c.to_string(), Span::new(start, self.offset))
    }

    fn identifier(&mut self, first: char, start: usize) -> Result<Token> {
        let mut lexeme = first.to_string();
        self.read_while(&mut lexeme, is_identifier_tail)?;
        let kind = if is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(Token::new(kind, lexeme, Span::new(start, self.offset)))
    }

    fn number(&mut self, first: char, start: usize) -> Result<Token> {
        let mut lexeme = first.to_string();
        self.read_while(&mut lexeme, is_decimal_digit)?;
        Ok(Token::new(TokenKind::Number, lexeme, Span::new(start, self.offset)))
    }

    fn string(&mut self, start: usize) -> Result<Token> {
        let mut lexeme = String::new();
        loop {
            match self.advance()? {
                Some('"') => break,
                Some(c) => lexeme.push(c),
                None => {
                    return Err(Error::UnterminatedString {
                        span: Span::new(start, self.offset),
                    })
                }
            }
        }
        Ok(Token::new(TokenKind::String, lexeme, Span::new(start, self.offset)))
    }

    fn skip_line(&mut self) -> Result<()> {
        while let Some(c) = self.advance()? {
            if c == '\n' {
                break;
            }
        }
        Ok(())
    }
}
