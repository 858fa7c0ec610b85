//! Defines the dynamically typed representation of a nested record.

use std::fmt;
use std::fmt::Formatter;

/// Represents one node of a decoded record.
///
/// Records are usually produced by decoding JSON, Avro or a similar row
/// oriented format. A record is a [`Value::Map`] whose shape is checked
/// against the schema only while it is shredded.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value (true/false)
    Boolean(bool),
    /// Signed integer value
    Integer(i64),
    /// Unsigned integer value too large for [`Value::Integer`]
    UnsignedInteger(u64),
    /// Floating point value
    Float(f64),
    /// String (UTF-8) value
    String(String),
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Ordered list of values. If there are zero elements the value is
    /// considered empty.
    List(Vec<Value>),
    /// Name, value pairs in insertion order. Used both for struct-like
    /// records and for true key/value maps; the schema decides which.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Returns a string label representing the variant of this [`Value`].
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::UnsignedInteger(_) => "UnsignedInteger",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value stored under `key` in a [`Value::Map`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn fmt_with_indent(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::UnsignedInteger(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Bytes(value) => write!(f, "b{value:?}"),
            Value::List(values) if values.is_empty() => write!(f, "[]"),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?
                    }
                    value.fmt_with_indent(f, indent)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) if entries.is_empty() => write!(f, "{{}}"),
            Value::Map(entries) => {
                writeln!(f, "{{")?;
                for (name, value) in entries {
                    write!(f, "{:indent$}{name:?}: ", "", indent = indent + 2)?;
                    value.fmt_with_indent(f, indent + 2)?;
                    writeln!(f, ",")?;
                }
                write!(f, "{:indent$}}}", "", indent = indent)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_with_indent(f, 0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UnsignedInteger(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    /// Converts a decoded JSON document. Integers are kept exact when they
    /// fit in `i64` or `u64`, all other numbers become floats.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Boolean(value),
            serde_json::Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Value::Integer(value)
                } else if let Some(value) = number.as_u64() {
                    Value::UnsignedInteger(value)
                } else {
                    number.as_f64().map_or(Value::Null, Value::Float)
                }
            }
            serde_json::Value::String(value) => Value::String(value),
            serde_json::Value::Array(values) => {
                Value::List(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Ergonomic builder pattern API for creating a record value.
#[derive(Debug, Default, Clone)]
pub struct ValueBuilder {
    fields: Vec<(String, Value)>,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name, value pair to the value being built.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Add a name, repeated value to the value being built.
    ///
    /// A repeated value is represented as a [`Value::List`] of [`Value`]
    /// elements.
    pub fn repeated(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.fields.push((
            key.into(),
            Value::List(values.into_iter().map(Into::into).collect()),
        ));
        self
    }

    /// Add an explicit null value
    pub fn null(self, key: impl Into<String>) -> Self {
        self.field(key, Value::Null)
    }

    /// Consumes the builder and returns the constructed [`Value`]
    pub fn build(self) -> Value {
        Value::Map(self.fields)
    }
}
