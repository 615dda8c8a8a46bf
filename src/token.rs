//! Tokens produced by the [`Scanner`](crate::scanner::Scanner).

use std::fmt;

/// Lexemes with special meaning to the parser. Matching is case-sensitive.
pub const KEYWORDS: [&str; 19] = [
    "downstream", "upstream",
    "i8", "i16", "i32", "i64",
    "u8", "u16", "u32", "u64",
    "string", "base37",
    "big", "little", "middle", "inverse",
    "added", "subtracted", "negated",
];

/// Returns `true` if `lexeme` is a member of [`KEYWORDS`].
pub fn is_keyword(lexeme: &str) -> bool {
    KEYWORDS.contains(&lexeme)
}

/// Category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An alphabetical lexeme with special meaning to the parser.
    Keyword,
    /// An alphabetical lexeme naming a codec or field.
    Identifier,
    /// A run of decimal digits and underscores.
    Number,
    /// A quote-delimited literal; the lexeme excludes the quotes.
    String,
    OpenBrace,
    CloseBrace,
    Colon,
    Comma,
    /// Input is exhausted.
    EndOfFile,
}

impl TokenKind {
    /// Noun phrase used in diagnostics, e.g. "an identifier".
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Keyword => "a keyword",
            TokenKind::Identifier => "an identifier",
            TokenKind::Number => "a number",
            TokenKind::String => "a string",
            TokenKind::OpenBrace => "an open brace `{`",
            TokenKind::CloseBrace => "a close brace `}`",
            TokenKind::Colon => "a colon `:`",
            TokenKind::Comma => "a comma `,`",
            TokenKind::EndOfFile => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Half-open byte range `start..end` into the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} past end {}", start, end);
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Span { start: offset, end: offset }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}..{}", self.start, self.end)
    }
}

/// A categorised lexeme and the bytes it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }

    /// Text shown for this token in diagnostics.
    pub fn display_text(&self) -> &str {
        match self.kind {
            TokenKind::EndOfFile => "end of file",
            _ => &self.lexeme,
        }
    }
}
