//! Defines the building blocks for defining schemas: [`Field`] and [`DataType`]

use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};

/// How often a field may occur inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repetition {
    /// Exactly once.
    Required,
    /// Zero or one time.
    Optional,
    /// Zero or more times.
    Repeated,
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Repetition::Required => write!(f, "required"),
            Repetition::Optional => write!(f, "optional"),
            Repetition::Repeated => write!(f, "repeated"),
        }
    }
}

/// Storage type of a primitive column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray,
}

impl PhysicalType {
    /// Checks if values of this type are stored as a byte sequence.
    pub fn is_byte_array(&self) -> bool {
        matches!(self, PhysicalType::ByteArray | PhysicalType::FixedLenByteArray)
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhysicalType::Boolean => "boolean",
            PhysicalType::Int32 => "int32",
            PhysicalType::Int64 => "int64",
            PhysicalType::Int96 => "int96",
            PhysicalType::Float => "float",
            PhysicalType::Double => "double",
            PhysicalType::ByteArray => "binary",
            PhysicalType::FixedLenByteArray => "fixed_len_byte_array",
        };
        write!(f, "{label}")
    }
}

/// Annotation describing how a physical type is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalType {
    Utf8,
    Enum,
    Json,
    Decimal,
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Interval,
}

impl LogicalType {
    /// Checks if the logical type is stored as text.
    pub fn is_textual(&self) -> bool {
        matches!(self, LogicalType::Utf8 | LogicalType::Enum | LogicalType::Json)
    }

    /// Checks if the logical type annotation is valid for `physical`.
    pub fn is_compatible_with(&self, physical: PhysicalType) -> bool {
        use PhysicalType as P;

        match self {
            LogicalType::Utf8 | LogicalType::Enum | LogicalType::Json => physical == P::ByteArray,
            LogicalType::Decimal => matches!(
                physical,
                P::Int32 | P::Int64 | P::ByteArray | P::FixedLenByteArray
            ),
            LogicalType::Date
            | LogicalType::TimeMillis
            | LogicalType::Int8
            | LogicalType::Int16
            | LogicalType::Int32
            | LogicalType::Uint8
            | LogicalType::Uint16
            | LogicalType::Uint32 => physical == P::Int32,
            LogicalType::TimeMicros
            | LogicalType::TimestampMillis
            | LogicalType::TimestampMicros
            | LogicalType::Int64
            | LogicalType::Uint64 => physical == P::Int64,
            LogicalType::Interval => physical == P::FixedLenByteArray,
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogicalType::Utf8 => "UTF8",
            LogicalType::Enum => "ENUM",
            LogicalType::Json => "JSON",
            LogicalType::Decimal => "DECIMAL",
            LogicalType::Date => "DATE",
            LogicalType::TimeMillis => "TIME_MILLIS",
            LogicalType::TimeMicros => "TIME_MICROS",
            LogicalType::TimestampMillis => "TIMESTAMP_MILLIS",
            LogicalType::TimestampMicros => "TIMESTAMP_MICROS",
            LogicalType::Int8 => "INT_8",
            LogicalType::Int16 => "INT_16",
            LogicalType::Int32 => "INT_32",
            LogicalType::Int64 => "INT_64",
            LogicalType::Uint8 => "UINT_8",
            LogicalType::Uint16 => "UINT_16",
            LogicalType::Uint32 => "UINT_32",
            LogicalType::Uint64 => "UINT_64",
            LogicalType::Interval => "INTERVAL",
        };
        write!(f, "{label}")
    }
}

/// The physical and logical type of a primitive leaf, including the length
/// of fixed width byte arrays and the precision and scale of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveType {
    physical: PhysicalType,
    #[serde(default)]
    logical: Option<LogicalType>,
    #[serde(default)]
    length: Option<u32>,
    #[serde(default)]
    precision: Option<u8>,
    #[serde(default)]
    scale: Option<u8>,
}

impl PrimitiveType {
    pub fn new(physical: PhysicalType) -> Self {
        Self {
            physical,
            logical: None,
            length: None,
            precision: None,
            scale: None,
        }
    }

    /// Creates a decimal type stored using `physical`.
    pub fn decimal(physical: PhysicalType, precision: u8, scale: u8) -> Self {
        Self::new(physical)
            .with_logical(LogicalType::Decimal)
            .with_precision(precision)
            .with_scale(scale)
    }

    pub fn with_logical(mut self, logical: LogicalType) -> Self {
        self.logical = Some(logical);
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn physical(&self) -> PhysicalType {
        self.physical
    }

    pub fn logical(&self) -> Option<LogicalType> {
        self.logical
    }

    /// Declared width of a fixed length byte array.
    pub fn length(&self) -> Option<u32> {
        self.length
    }

    pub fn precision(&self) -> Option<u8> {
        self.precision
    }

    /// Decimal scale, zero when not declared.
    pub fn scale(&self) -> u8 {
        self.scale.unwrap_or(0)
    }

    /// Largest decimal precision the storage can hold.
    ///
    /// A fixed length byte array of `n` bytes holds
    /// `floor(log10(2^(8n - 1) - 1))` digits, capped at 38.
    pub fn max_decimal_precision(&self) -> u8 {
        match self.physical {
            PhysicalType::Int32 => 9,
            PhysicalType::Int64 => 18,
            PhysicalType::FixedLenByteArray => match self.length {
                Some(length @ 1..=15) => {
                    let largest = (1i128 << (8 * length - 1)) - 1;
                    let mut precision = 0;
                    let mut bound: i128 = 10;
                    while bound - 1 <= largest {
                        precision += 1;
                        bound *= 10;
                    }
                    precision
                }
                Some(0) | None => 0,
                Some(_) => 38,
            },
            _ => 38,
        }
    }

    /// Checks if this is a byte array without any logical annotation.
    pub fn is_raw_bytes(&self) -> bool {
        self.physical.is_byte_array() && self.logical.is_none()
    }

    /// Returns a string label for error messages, eg. `binary (UTF8)`.
    pub fn type_label(&self) -> String {
        self.to_string()
    }
}

impl PrimitiveType {
    /// Physical type label including the declared width, eg. `fixed_len_byte_array(16)`.
    pub(crate) fn physical_label(&self) -> String {
        match self.length {
            Some(length) => format!("{}({length})", self.physical),
            None => self.physical.to_string(),
        }
    }

    /// Logical type annotation, eg. `(UTF8)` or `(DECIMAL(10,2))`.
    fn annotation(&self) -> Option<String> {
        self.logical.map(|logical| match logical {
            LogicalType::Decimal => format!(
                "(DECIMAL({},{}))",
                self.precision.unwrap_or(0),
                self.scale()
            ),
            logical => format!("({logical})"),
        })
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.annotation() {
            Some(annotation) => write!(f, "{} {annotation}", self.physical_label()),
            None => write!(f, "{}", self.physical_label()),
        }
    }
}

/// Represents the primitive, nested and repeated types of a schema.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A leaf value stored in its own column.
    Primitive(PrimitiveType),
    /// A nested structure (group/record) containing named fields.
    Struct(Vec<Field>),
    /// A key/value map. Stored as a repeated `key_value` group holding the
    /// `key` and `value` fields.
    Map { key: Box<Field>, value: Box<Field> },
    /// A list of elements. Stored as a repeated `list` group holding the
    /// `element` field.
    List(Box<Field>),
}

impl DataType {
    /// Checks if data type is a [`DataType::Primitive`]
    pub fn is_primitive(&self) -> bool {
        matches!(self, DataType::Primitive(_))
    }

    /// Returns a string label representing the variant of this [`DataType`].
    pub fn type_label(&self) -> String {
        let label = match self {
            DataType::Primitive(primitive) => return primitive.type_label(),
            DataType::Struct(_) => "Struct", // does not include fields
            DataType::Map { .. } => "Map",
            DataType::List(_) => "List",
        };

        label.into()
    }
}

/// Represents a named schema element, its data type and its repetition.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Field {
    name: String,
    repetition: Repetition,
    data_type: DataType,
}

impl Field {
    /// Creates a field definition.
    ///
    /// # Parameters
    /// * `name` - Name of the field.
    /// * `data_type` - The [`DataType`] of the field.
    /// * `repetition` - Whether the field is required, optional or repeated.
    pub fn new(name: impl Into<String>, data_type: DataType, repetition: Repetition) -> Self {
        Field {
            name: name.into(),
            repetition,
            data_type,
        }
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the [`DataType`] of the field.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn is_optional(&self) -> bool {
        self.repetition == Repetition::Optional
    }

    pub fn is_repeated(&self) -> bool {
        self.repetition == Repetition::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.repetition == Repetition::Required
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_group(
    f: &mut Formatter<'_>,
    header: &str,
    fields: impl IntoIterator<Item = String>,
) -> fmt::Result {
    let mut buf = String::new();
    for field in fields {
        writeln!(buf, "{field}")?;
    }

    writeln!(f, "{header} {{")?;
    if !buf.is_empty() {
        writeln!(f, "{}", indent(&buf))?;
    }
    write!(f, "}}")
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.data_type {
            DataType::Primitive(primitive) => {
                write!(
                    f,
                    "{} {} {}",
                    self.repetition,
                    primitive.physical_label(),
                    self.name
                )?;
                if let Some(annotation) = primitive.annotation() {
                    write!(f, " {annotation}")?;
                }
                write!(f, ";")
            }
            DataType::Struct(fields) => write_group(
                f,
                &format!("{} group {}", self.repetition, self.name),
                fields.iter().map(ToString::to_string),
            ),
            DataType::Map { key, value } => {
                let mut key_value = String::new();
                write!(
                    key_value,
                    "{}",
                    GroupDisplay("repeated group key_value", &[key.as_ref(), value.as_ref()])
                )?;
                write_group(
                    f,
                    &format!("{} group {} (MAP)", self.repetition, self.name),
                    [key_value],
                )
            }
            DataType::List(element) => {
                let mut list = String::new();
                write!(list, "{}", GroupDisplay("repeated group list", &[element.as_ref()]))?;
                write_group(
                    f,
                    &format!("{} group {} (LIST)", self.repetition, self.name),
                    [list],
                )
            }
        }
    }
}

struct GroupDisplay<'a>(&'a str, &'a [&'a Field]);

impl fmt::Display for GroupDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_group(f, self.0, self.1.iter().map(ToString::to_string))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive(primitive) => write!(f, "{primitive}"),
            DataType::Struct(fields) => write_group(f, "Struct", fields.iter().map(ToString::to_string)),
            DataType::Map { key, value } => write!(f, "Map [ {} => {} ]", key.data_type, value.data_type),
            DataType::List(element) => write!(f, "List [ {} ]", element.data_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8() -> DataType {
        DataType::Primitive(PrimitiveType::new(PhysicalType::ByteArray).with_logical(LogicalType::Utf8))
    }

    fn int64() -> DataType {
        DataType::Primitive(PrimitiveType::new(PhysicalType::Int64))
    }

    #[test]
    fn test_basic_field() {
        let field = Field::new("name", utf8(), Repetition::Required);

        assert_eq!(field.name(), "name");
        assert_eq!(field.data_type(), &utf8());
        assert!(field.is_required());
        assert!(!field.is_optional());
        assert!(!field.is_repeated());
    }

    #[test]
    fn test_nested_record() {
        let name = Field::new("name", utf8(), Repetition::Required);
        let age = Field::new("age", int64(), Repetition::Optional);
        let emails = Field::new("emails", utf8(), Repetition::Repeated);

        let person = Field::new(
            "person",
            DataType::Struct(vec![name, age, emails]),
            Repetition::Required,
        );

        match person.data_type() {
            DataType::Struct(fields) => {
                assert_eq!(
                    fields.len(),
                    3,
                    "Top-level struct 'person' should contain exactly 3 fields, found {}",
                    fields.len()
                );
                assert_eq!(fields[2].name(), "emails");
                assert!(fields[2].is_repeated());
            }
            _ => panic!(
                "Expected 'person' to be a `Struct` type, found {:?}",
                person.data_type()
            ),
        }
    }

    #[test]
    fn test_logical_type_compatibility() {
        assert!(LogicalType::Utf8.is_compatible_with(PhysicalType::ByteArray));
        assert!(!LogicalType::Utf8.is_compatible_with(PhysicalType::Int32));
        assert!(LogicalType::Decimal.is_compatible_with(PhysicalType::FixedLenByteArray));
        assert!(!LogicalType::Decimal.is_compatible_with(PhysicalType::Boolean));
        assert!(LogicalType::Uint64.is_compatible_with(PhysicalType::Int64));
        assert!(!LogicalType::Date.is_compatible_with(PhysicalType::Int64));
    }

    #[test]
    fn test_max_decimal_precision() {
        let fixed = |length| PrimitiveType::new(PhysicalType::FixedLenByteArray).with_length(length);

        assert_eq!(fixed(1).max_decimal_precision(), 2);
        assert_eq!(fixed(4).max_decimal_precision(), 9);
        assert_eq!(fixed(8).max_decimal_precision(), 18);
        assert_eq!(fixed(15).max_decimal_precision(), 35);
        assert_eq!(fixed(16).max_decimal_precision(), 38);
        assert_eq!(
            PrimitiveType::new(PhysicalType::Int32).max_decimal_precision(),
            9
        );
        assert_eq!(
            PrimitiveType::new(PhysicalType::ByteArray).max_decimal_precision(),
            38
        );
    }

    #[test]
    fn test_display_primitive() {
        let field = Field::new("name", utf8(), Repetition::Optional);
        assert_eq!(field.to_string(), "optional binary name (UTF8);");

        let price = Field::new(
            "price",
            DataType::Primitive(PrimitiveType::decimal(PhysicalType::Int64, 10, 2)),
            Repetition::Required,
        );
        assert_eq!(price.to_string(), "required int64 price (DECIMAL(10,2));");
    }

    #[test]
    fn test_display_list() {
        let tags = Field::new(
            "tags",
            DataType::List(Box::new(Field::new("element", utf8(), Repetition::Required))),
            Repetition::Optional,
        );

        let expected = "optional group tags (LIST) {\n  repeated group list {\n    required binary element (UTF8);\n  }\n}";
        assert_eq!(tags.to_string(), expected);
    }

    #[test]
    fn test_deserialize_field() {
        let json = r#"{
            "name": "id",
            "repetition": "required",
            "data_type": { "primitive": { "physical": "INT64" } }
        }"#;

        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field, Field::new("id", int64(), Repetition::Required));
    }
}
