//! Schema definitions and helper constructors for common field shapes.

use crate::field::{DataType, Field, LogicalType, PhysicalType, PrimitiveType, Repetition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use std::fmt::Write;

/// A named top-level message containing the root fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();

        writeln!(&mut buf, "message {} {{", self.name)?;
        for field in &self.fields {
            for line in field.to_string().lines() {
                writeln!(&mut buf, "  {line}")?;
            }
        }
        write!(&mut buf, "}}")?;

        write!(f, "{}", buf)
    }
}

#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn build(self) -> Schema {
        Schema::new(self.name, self.fields)
    }
}

pub fn primitive(name: &str, primitive: PrimitiveType, repetition: Repetition) -> Field {
    Field::new(name, DataType::Primitive(primitive), repetition)
}

fn boolean_type() -> PrimitiveType {
    PrimitiveType::new(PhysicalType::Boolean)
}

fn integer_type() -> PrimitiveType {
    PrimitiveType::new(PhysicalType::Int64)
}

fn double_type() -> PrimitiveType {
    PrimitiveType::new(PhysicalType::Double)
}

fn string_type() -> PrimitiveType {
    PrimitiveType::new(PhysicalType::ByteArray).with_logical(LogicalType::Utf8)
}

fn bytes_type() -> PrimitiveType {
    PrimitiveType::new(PhysicalType::ByteArray)
}

pub fn bool(name: &str) -> Field {
    primitive(name, boolean_type(), Repetition::Required)
}

pub fn integer(name: &str) -> Field {
    primitive(name, integer_type(), Repetition::Required)
}

pub fn double(name: &str) -> Field {
    primitive(name, double_type(), Repetition::Required)
}

pub fn string(name: &str) -> Field {
    primitive(name, string_type(), Repetition::Required)
}

pub fn bytes(name: &str) -> Field {
    primitive(name, bytes_type(), Repetition::Required)
}

pub fn optional_bool(name: &str) -> Field {
    primitive(name, boolean_type(), Repetition::Optional)
}

pub fn optional_integer(name: &str) -> Field {
    primitive(name, integer_type(), Repetition::Optional)
}

pub fn optional_double(name: &str) -> Field {
    primitive(name, double_type(), Repetition::Optional)
}

pub fn optional_string(name: &str) -> Field {
    primitive(name, string_type(), Repetition::Optional)
}

pub fn optional_bytes(name: &str) -> Field {
    primitive(name, bytes_type(), Repetition::Optional)
}

pub fn repeated_bool(name: &str) -> Field {
    primitive(name, boolean_type(), Repetition::Repeated)
}

pub fn repeated_integer(name: &str) -> Field {
    primitive(name, integer_type(), Repetition::Repeated)
}

pub fn repeated_string(name: &str) -> Field {
    primitive(name, string_type(), Repetition::Repeated)
}

pub fn repeated_bytes(name: &str) -> Field {
    primitive(name, bytes_type(), Repetition::Repeated)
}

pub fn required_group(name: &str, fields: Vec<Field>) -> Field {
    Field::new(name, DataType::Struct(fields), Repetition::Required)
}

pub fn optional_group(name: &str, fields: Vec<Field>) -> Field {
    Field::new(name, DataType::Struct(fields), Repetition::Optional)
}

pub fn repeated_group(name: &str, fields: Vec<Field>) -> Field {
    Field::new(name, DataType::Struct(fields), Repetition::Repeated)
}

/// Creates an optional map field. The `key` and `value` fields are renamed
/// to `key` and `value`.
pub fn optional_map(name: &str, key: Field, value: Field) -> Field {
    map(name, key, value, Repetition::Optional)
}

pub fn required_map(name: &str, key: Field, value: Field) -> Field {
    map(name, key, value, Repetition::Required)
}

fn map(name: &str, key: Field, value: Field, repetition: Repetition) -> Field {
    let key = Field::new("key", key.data_type().clone(), key.repetition());
    let value = Field::new("value", value.data_type().clone(), value.repetition());

    Field::new(
        name,
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
        },
        repetition,
    )
}

/// Creates an optional list field. The `element` field is renamed to
/// `element`.
pub fn optional_list(name: &str, element: Field) -> Field {
    list(name, element, Repetition::Optional)
}

pub fn required_list(name: &str, element: Field) -> Field {
    list(name, element, Repetition::Required)
}

fn list(name: &str, element: Field, repetition: Repetition) -> Field {
    let element = Field::new("element", element.data_type().clone(), element.repetition());
    Field::new(name, DataType::List(Box::new(element)), repetition)
}
