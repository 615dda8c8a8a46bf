//! Abstract Syntax Tree for the codec DSL.
//!
//! A document is a list of [`Codec`]s. Each codec owns its fields as a tree of
//! [`Value`]s; composite fields nest, nothing is shared.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Which side of the connection a codec serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `downstream`: server to client.
    Encoder,
    /// `upstream`: client to server.
    Decoder,
}

impl Direction {
    pub const KEYWORDS: &'static [&'static str] = &["upstream", "downstream"];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "downstream" => Some(Direction::Encoder),
            "upstream" => Some(Direction::Decoder),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Encoder => "downstream",
            Direction::Decoder => "upstream",
        }
    }
}

/// Number of bytes a primitive field occupies on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ByteWidth {
    Byte,
    Short,
    /// 24 bits.
    TriByte,
    Int,
    Long,
}

impl ByteWidth {
    pub const ALL: [ByteWidth; 5] = [
        ByteWidth::Byte,
        ByteWidth::Short,
        ByteWidth::TriByte,
        ByteWidth::Int,
        ByteWidth::Long,
    ];

    pub fn bytes(self) -> usize {
        match self {
            ByteWidth::Byte => 1,
            ByteWidth::Short => 2,
            ByteWidth::TriByte => 3,
            ByteWidth::Int => 4,
            ByteWidth::Long => 8,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    pub fn from_bytes(bytes: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.bytes() == bytes)
    }

    /// Exact lookup; bit counts that are not a multiple of 8 never match.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits % 8 != 0 {
            return None;
        }
        Self::from_bytes((bits / 8) as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

impl Signedness {
    /// Leading letter of the numeric type keyword.
    pub fn prefix(self) -> char {
        match self {
            Signedness::Signed => 'i',
            Signedness::Unsigned => 'u',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'i' => Some(Signedness::Signed),
            'u' => Some(Signedness::Unsigned),
            _ => None,
        }
    }
}

/// Arrangement of a multi-byte field's bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
    Middle,
    InverseMiddle,
}

impl ByteOrder {
    pub const KEYWORDS: &'static [&'static str] = &["big", "little", "middle", "inverse"];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "big" => Some(ByteOrder::Big),
            "little" => Some(ByteOrder::Little),
            "middle" => Some(ByteOrder::Middle),
            "inverse" => Some(ByteOrder::InverseMiddle),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ByteOrder::Big => "big",
            ByteOrder::Little => "little",
            ByteOrder::Middle => "middle",
            ByteOrder::InverseMiddle => "inverse",
        }
    }
}

/// Arithmetic applied to a value before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transformation {
    #[default]
    None,
    Add,
    Subtract,
    Negate,
}

impl Transformation {
    pub const KEYWORDS: &'static [&'static str] = &["added", "subtracted", "negated"];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "added" => Some(Transformation::Add),
            "subtracted" => Some(Transformation::Subtract),
            "negated" => Some(Transformation::Negate),
            _ => None,
        }
    }

    /// `None` for [`Transformation::None`], which is written by omission.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Transformation::None => None,
            Transformation::Add => Some("added"),
            Transformation::Subtract => Some("subtracted"),
            Transformation::Negate => Some("negated"),
        }
    }
}

/// Integer literal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerValue {
    pub name: String,
    pub value: i64,
}

/// String literal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    pub name: String,
    pub value: String,
}

/// A string carried on the wire as a base-37 packed `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base37Value {
    pub name: String,
}

/// Named group of sub-fields, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeValue {
    pub name: String,
    pub contents: Vec<Value>,
}

/// Primitive numeric field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataValue {
    pub name: String,
    pub signedness: Signedness,
    pub width: ByteWidth,
    pub transformation: Transformation,
    pub order: ByteOrder,
}

impl DataValue {
    pub fn new(
        name: impl Into<String>,
        signedness: Signedness,
        width: ByteWidth,
        transformation: Transformation,
        order: ByteOrder,
    ) -> Self {
        DataValue {
            name: name.into(),
            signedness,
            width,
            transformation,
            order,
        }
    }

    /// `Big` order, no transformation.
    pub fn plain(name: impl Into<String>, signedness: Signedness, width: ByteWidth) -> Self {
        Self::new(name, signedness, width, Transformation::None, ByteOrder::Big)
    }

    /// Numeric type as written in the DSL, e.g. `u16` or `i24`.
    pub fn type_name(&self) -> String {
        format!("{}{}", self.signedness.prefix(), self.width.bits())
    }
}

/// A named field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(IntegerValue),
    String(StringValue),
    Base37(Base37Value),
    Composite(CompositeValue),
    Data(DataValue),
}

impl Value {
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Value::Integer(IntegerValue { name: name.into(), value })
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Value::String(StringValue {
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn base37(name: impl Into<String>) -> Self {
        Value::Base37(Base37Value { name: name.into() })
    }

    pub fn composite(name: impl Into<String>, contents: Vec<Value>) -> Self {
        Value::Composite(CompositeValue {
            name: name.into(),
            contents,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Value::Integer(v) => &v.name,
            Value::String(v) => &v.name,
            Value::Base37(v) => &v.name,
            Value::Composite(v) => &v.name,
            Value::Data(v) => &v.name,
        }
    }

    pub fn as_data(&self) -> Option<&DataValue> {
        match self {
            Value::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            Value::Composite(v) => Some(v),
            _ => None,
        }
    }
}

impl From<DataValue> for Value {
    fn from(v: DataValue) -> Self {
        Value::Data(v)
    }
}

/// One directional packet definition.
///
/// Fields iterate in declaration order and are unique by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    name: String,
    direction: Direction,
    fields: Vec<Value>,
    fields_by_name: HashMap<String, usize>,
}

impl Codec {
    /// Fails with [`Error::DuplicateField`] if two fields share a name.
    pub fn new(name: impl Into<String>, direction: Direction, fields: Vec<Value>) -> Result<Self> {
        let mut builder = CodecBuilder::new(name, direction);
        for value in fields {
            if let Err(rejected) = builder.push(value) {
                return Err(Error::DuplicateField {
                    codec: builder.name,
                    name: rejected.name().to_string(),
                    span: None,
                });
            }
        }
        Ok(builder.build())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields_by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Accumulates a codec's fields, rejecting duplicate names.
#[derive(Debug)]
pub struct CodecBuilder {
    name: String,
    direction: Direction,
    fields: Vec<Value>,
    fields_by_name: HashMap<String, usize>,
}

impl CodecBuilder {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        CodecBuilder {
            name: name.into(),
            direction,
            fields: Vec::new(),
            fields_by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends `value`, handing it back if its name is already taken.
    pub fn push(&mut self, value: Value) -> std::result::Result<(), Value> {
        if self.fields_by_name.contains_key(value.name()) {
            return Err(value);
        }
        self.fields_by_name
            .insert(value.name().to_string(), self.fields.len());
        self.fields.push(value);
        Ok(())
    }

    pub fn build(self) -> Codec {
        Codec {
            name: self.name,
            direction: self.direction,
            fields: self.fields,
            fields_by_name: self.fields_by_name,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
