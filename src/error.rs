//! Errors raised while scanning and parsing codec definitions.
//!
//! Every failure aborts the current document. [`Error::category`] tells the
//! caller which stage rejected the input.

use std::fmt;

use thiserror::Error;

use crate::token::{Span, TokenKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The character stream could not be tokenized.
    Scan,
    /// The token stream does not match the grammar.
    Syntax,
    /// Well-formed tokens that do not map to a valid model value.
    Semantic,
    /// The underlying input failed.
    Resource,
}

/// What the parser wanted at the point of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Kind(TokenKind),
    OneOf(&'static [&'static str]),
    Production(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(kind) => f.write_str(kind.describe()),
            Expected::OneOf(values) => write!(f, "one of [{}]", values.join(", ")),
            Expected::Production(name) => f.write_str(name),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A `"` was opened and the input ended before it was closed.
    #[error("unterminated string literal starting at byte {}", .span.start)]
    UnterminatedString { span: Span },

    /// Lookahead was requested while a mark was already held.
    #[error("cannot mark an already-marked character source")]
    AlreadyMarked,

    #[error("invalid UTF-8 in input at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("expected {expected}, found `{found}` at {span}")]
    Syntax {
        expected: Expected,
        found: String,
        span: Span,
    },

    /// Composite fields nested deeper than the configured limit.
    #[error("fields nested deeper than {limit} levels at {span}")]
    NestingTooDeep { limit: usize, span: Span },

    /// A numeric type whose bit count names no byte width.
    #[error("`{lexeme}` at {span} does not name a byte width (expected 8, 16, 24, 32 or 64 bits)")]
    UnmappedWidth { lexeme: String, span: Span },

    /// An integer literal that is empty after removing separators or does not fit in 64 signed bits.
    #[error("integer literal `{lexeme}` at {span} is not a valid 64-bit signed integer")]
    InvalidInteger { lexeme: String, span: Span },

    #[error("duplicate field `{name}` in codec `{codec}`")]
    DuplicateField {
        codec: String,
        name: String,
        span: Option<Span>,
    },

    /// Canonical rewriting was refused because it would drop a `#`.
    #[error("cannot rewrite source with `#` at {span}: the canonical form drops it")]
    UnfixableComment { span: Span },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn syntax(expected: Expected, found: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            expected,
            found: found.into(),
            span,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnterminatedString { .. } | Error::AlreadyMarked | Error::InvalidUtf8 { .. } => {
                ErrorCategory::Scan
            }
            Error::Syntax { .. } | Error::NestingTooDeep { .. } => ErrorCategory::Syntax,
            Error::UnmappedWidth { .. }
            | Error::InvalidInteger { .. }
            | Error::DuplicateField { .. }
            | Error::UnfixableComment { .. } => ErrorCategory::Semantic,
            Error::Io(_) => ErrorCategory::Resource,
        }
    }

    /// Byte range of the offending input, where one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::UnterminatedString { span }
            | Error::Syntax { span, .. }
            | Error::NestingTooDeep { span, .. }
            | Error::UnmappedWidth { span, .. }
            | Error::InvalidInteger { span, .. }
            | Error::UnfixableComment { span } => Some(*span),
            Error::DuplicateField { span, .. } => *span,
            Error::InvalidUtf8 { offset } => Some(Span::empty(*offset)),
            Error::AlreadyMarked | Error::Io(_) => None,
        }
    }
}
