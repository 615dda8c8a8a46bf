//! Canonical DSL text for parsed codecs.
//!
//! One field per line, one tab per depth, closing braces on their own line and
//! default order/transformation keywords left out. Parsing the output yields
//! the same codecs.

use std::fmt::{self, Write};

use crate::ast::{ByteOrder, Codec, DataValue, Value};

/// Render a document: codecs separated by a blank line.
pub fn print_codecs(codecs: &[Codec]) -> String {
    codecs.iter().map(print_codec).collect::<Vec<_>>().join("\n")
}

pub fn print_codec(codec: &Codec) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_codec(&mut out, codec);
    out
}

pub fn write_codec<W: Write>(out: &mut W, codec: &Codec) -> fmt::Result {
    writeln!(out, "{} {} {{", codec.direction().keyword(), codec.name())?;
    for value in codec.fields() {
        write_value(out, value, 1)?;
    }
    writeln!(out, "}}")
}

/// Write `value` and its contents, starting `depth` tabs in.
pub fn write_value<W: Write>(out: &mut W, value: &Value, depth: usize) -> fmt::Result {
    indent(out, depth)?;
    match value {
        Value::Integer(v) => writeln!(out, "{}: {}", v.name, v.value),
        Value::String(v) => writeln!(out, "{}: \"{}\"", v.name, v.value),
        Value::Base37(v) => writeln!(out, "{}: base37", v.name),
        Value::Data(v) => writeln!(out, "{}: {}", v.name, data_unit(v)),
        Value::Composite(v) => {
            writeln!(out, "{} {{", v.name)?;
            for inner in &v.contents {
                write_value(out, inner, depth + 1)?;
            }
            indent(out, depth)?;
            writeln!(out, "}}")
        }
    }
}

/// `[order] [transformation] type`, defaults omitted.
pub fn data_unit(v: &DataValue) -> String {
    let mut parts = Vec::with_capacity(3);
    if v.order != ByteOrder::Big {
        parts.push(v.order.keyword().to_string());
    }
    if let Some(keyword) = v.transformation.keyword() {
        parts.push(keyword.to_string());
    }
    parts.push(v.type_name());
    parts.join(" ")
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_codec(f, self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0)
    }
}
