//! Value types and typed values
//!
//! Attribute values always travel as text. `ValueType` says how to read
//! that text, `Value` is the parsed form.

use std::fmt;

use serde::Serialize;

use crate::error::{ConfTreeError, Result};

/// Attribute value type
///
/// `Unknown` is a real wire value (0xFF, i.e. -1) meaning "no type".
/// A request that carries no type at all uses `Option<ValueType>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Unknown,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ValueType {
    /// All concrete (non-`Unknown`) types in code order
    pub const CONCRETE: [ValueType; 8] = [
        ValueType::Bool,
        ValueType::Byte,
        ValueType::Short,
        ValueType::Int,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::String,
    ];

    /// Wire code of this type (`Unknown` is -1, sent as 0xFF)
    pub fn code(self) -> u8 {
        match self {
            ValueType::Unknown => 0xFF,
            ValueType::Bool => 0,
            ValueType::Byte => 1,
            ValueType::Short => 2,
            ValueType::Int => 3,
            ValueType::Long => 4,
            ValueType::Float => 5,
            ValueType::Double => 6,
            ValueType::String => 7,
        }
    }

    /// Map a wire code back to a type
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0xFF => Some(ValueType::Unknown),
            0 => Some(ValueType::Bool),
            1 => Some(ValueType::Byte),
            2 => Some(ValueType::Short),
            3 => Some(ValueType::Int),
            4 => Some(ValueType::Long),
            5 => Some(ValueType::Float),
            6 => Some(ValueType::Double),
            7 => Some(ValueType::String),
            _ => None,
        }
    }

    /// Protocol name of the type, as listed by GET_TYPES
    ///
    /// `Unknown` has no name.
    pub fn name(self) -> Option<&'static str> {
        match self {
            ValueType::Unknown => None,
            ValueType::Bool => Some("bool"),
            ValueType::Byte => Some("byte"),
            ValueType::Short => Some("short"),
            ValueType::Int => Some("int"),
            ValueType::Long => Some("long"),
            ValueType::Float => Some("float"),
            ValueType::Double => Some("double"),
            ValueType::String => Some("string"),
        }
    }

    /// Parse a protocol type name; unrecognized names give `Unknown`
    pub fn from_name(name: &str) -> Self {
        match name {
            "bool" => ValueType::Bool,
            "byte" => ValueType::Byte,
            "short" => ValueType::Short,
            "int" => ValueType::Int,
            "long" => ValueType::Long,
            "float" => ValueType::Float,
            "double" => ValueType::Double,
            "string" => ValueType::String,
            _ => ValueType::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != ValueType::Unknown
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    /// Parse the textual form of a value of the given type
    pub fn parse(value_type: ValueType, text: &str) -> Result<Self> {
        let format_error = || ConfTreeError::ValueFormat {
            value_type,
            value: text.to_string(),
        };

        let value = match value_type {
            ValueType::Bool => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(format_error()),
            },
            ValueType::Byte => Value::Byte(text.parse().map_err(|_| format_error())?),
            ValueType::Short => Value::Short(text.parse().map_err(|_| format_error())?),
            ValueType::Int => Value::Int(text.parse().map_err(|_| format_error())?),
            ValueType::Long => Value::Long(text.parse().map_err(|_| format_error())?),
            ValueType::Float => Value::Float(text.parse().map_err(|_| format_error())?),
            ValueType::Double => Value::Double(text.parse().map_err(|_| format_error())?),
            ValueType::String => Value::String(text.to_string()),
            ValueType::Unknown => return Err(format_error()),
        };

        Ok(value)
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Byte(_) => ValueType::Byte,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }
}

/// Wire text of the value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
        }
    }
}
