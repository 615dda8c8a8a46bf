//! # codecspec — Packet Codec Specification DSL
//!
//! Front end for a small DSL that describes the wire layout of binary game
//! packets: a hand-written scanner, a recursive-descent parser, and the AST a
//! code generator consumes to emit encoders and decoders.
//!
//! ## DSL structure
//!
//! - **Codecs**: `downstream Name { ... }` (server → client, an encoder) or
//!   `upstream Name { ... }` (client → server, a decoder)
//! - **Fields**: `name: unit`, or `name { fields... }` for a composite group
//!
//! ## Field units
//!
//! - Numeric: `i8`, `i16`, `i24`, `i32`, `i64`, `u8`, `u16`, `u24`, `u32`, `u64`
//! - Byte order prefix: `big` (default), `little`, `middle`, `inverse`
//! - Transformation prefix: `added`, `subtracted`, `negated`
//! - `base37` for a name packed into a `u64`
//! - Integer (`1_000`) and string (`"text"`) literals
//!
//! ## Example DSL
//!
//! ```text
//! upstream Move {
//!   coords {
//!     x: i32
//!     y: little added u8
//!   }
//!   player: base37
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use codecspec::{parse, Direction};
//!
//! let codecs = parse("downstream Example { value: big u16 }").unwrap();
//! assert_eq!(codecs[0].direction(), Direction::Encoder);
//! ```

pub mod ast;
pub mod error;
pub mod lint;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod token;

pub use ast::{
    Base37Value, ByteOrder, ByteWidth, Codec, CodecBuilder, CompositeValue, DataValue, Direction,
    IntegerValue, Signedness, StringValue, Transformation, Value,
};
pub use error::{Error, ErrorCategory, Expected, Result};
pub use parser::{parse, parse_reader, parse_with_options, ParseOptions, Parser};
pub use printer::print_codecs;
pub use scanner::{CommentStyle, ScanOptions, Scanner};
pub use token::{Span, Token, TokenKind};
