//! Conversion of scalar values into the physical representation of a
//! primitive column, and back again for reassembly.

use crate::error::{Result, ShredError};
use crate::field::{LogicalType, PhysicalType, PrimitiveType};
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_traits::{PrimInt, Signed};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// A value in the physical representation of its column.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96([u8; 12]),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

impl EncodedValue {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            EncodedValue::Boolean(_) => PhysicalType::Boolean,
            EncodedValue::Int32(_) => PhysicalType::Int32,
            EncodedValue::Int64(_) => PhysicalType::Int64,
            EncodedValue::Int96(_) => PhysicalType::Int96,
            EncodedValue::Float(_) => PhysicalType::Float,
            EncodedValue::Double(_) => PhysicalType::Double,
            EncodedValue::ByteArray(_) => PhysicalType::ByteArray,
            EncodedValue::FixedLenByteArray(_) => PhysicalType::FixedLenByteArray,
        }
    }
}

impl From<&str> for EncodedValue {
    fn from(value: &str) -> Self {
        EncodedValue::ByteArray(value.as_bytes().to_vec())
    }
}

impl fmt::Display for EncodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedValue::Boolean(v) => write!(f, "{v}"),
            EncodedValue::Int32(v) => write!(f, "{v}"),
            EncodedValue::Int64(v) => write!(f, "{v}"),
            EncodedValue::Float(v) => write!(f, "{v}"),
            EncodedValue::Double(v) => write!(f, "{v}"),
            EncodedValue::ByteArray(v) | EncodedValue::FixedLenByteArray(v) => {
                match std::str::from_utf8(v) {
                    Ok(s) => write!(f, "{s:?}"),
                    Err(_) => write!(f, "b{v:?}"),
                }
            }
            EncodedValue::Int96(v) => write!(f, "b{v:?}"),
        }
    }
}

/// Parses decimal text into an unscaled integer.
///
/// Fraction digits beyond `scale` are truncated. Text with more integer
/// digits than `precision - scale` does not fit and is rejected.
#[derive(Debug)]
pub struct DecimalParser<T: PrimInt> {
    precision: u8,
    scale: u8,
    _type: PhantomData<T>,
}

impl<T: PrimInt + Signed> DecimalParser<T> {
    pub fn new(precision: u8, scale: u8) -> Self {
        DecimalParser {
            precision,
            scale,
            _type: PhantomData,
        }
    }

    pub fn parse(&self, s: &str) -> Option<T> {
        let bs = s.trim().as_bytes();
        let (neg, bs) = match bs.first() {
            Some(b'-') => (true, &bs[1..]),
            Some(b'+') => (false, &bs[1..]),
            _ => (false, bs),
        };

        let ten = T::from(10)?;
        let mut val = T::zero();
        let mut int_digits: u8 = 0;
        let mut frac_digits: u8 = 0;
        let mut seen_digit = false;
        let mut iter = bs.iter();

        // Leading digits.
        for b in iter.by_ref() {
            match b {
                b'0'..=b'9' => {
                    seen_digit = true;
                    // Leading zero.
                    if int_digits == 0 && *b == b'0' {
                        continue;
                    }
                    int_digits = int_digits.checked_add(1)?;
                    val = val.checked_mul(&ten)?.checked_add(&T::from(b - b'0')?)?;
                }
                b'.' => break,
                _ => return None,
            }
        }

        // Digits after decimal.
        for b in iter {
            match b {
                b'0'..=b'9' => {
                    seen_digit = true;
                    if frac_digits < self.scale {
                        frac_digits += 1;
                        val = val.checked_mul(&ten)?.checked_add(&T::from(b - b'0')?)?;
                    }
                }
                _ => return None,
            }
        }

        if !seen_digit || int_digits > self.precision.saturating_sub(self.scale) {
            return None;
        }

        for _ in frac_digits..self.scale {
            val = val.checked_mul(&ten)?;
        }

        Some(if neg { -val } else { val })
    }
}

/// Formats an unscaled decimal integer as text, eg. `-12345` with scale 2
/// is `-123.45`.
pub fn format_decimal(unscaled: i128, scale: u8) -> String {
    let digits = unscaled.unsigned_abs().to_string();
    let sign = if unscaled < 0 { "-" } else { "" };
    let scale = usize::from(scale);

    if scale == 0 {
        return format!("{sign}{digits}");
    }

    let digits = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}

/// Converts one scalar [`Value`] into the physical representation demanded
/// by a primitive leaf.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveEncoder<'a> {
    primitive: &'a PrimitiveType,
    path_str: &'a str,
}

impl<'a> PrimitiveEncoder<'a> {
    /// Creates an encoder for the leaf at `path_str`, used in errors.
    pub fn new(primitive: &'a PrimitiveType, path_str: &'a str) -> Self {
        Self {
            primitive,
            path_str,
        }
    }

    /// Encodes `value` or fails with [`ShredError::UnconvertiblePrimitive`].
    ///
    /// A null value is always an error. Absent values are emitted by the
    /// shredder as structural nulls and never reach the encoder.
    pub fn encode(&self, value: &Value) -> Result<EncodedValue> {
        let blob;
        let value = match value {
            Value::Null => return Err(self.unconvertible(value, "null value for a primitive")),
            // A list of bytes stored in a byte array column is one blob
            Value::List(items) if self.primitive.physical().is_byte_array() => {
                blob = Value::Bytes(self.collect_blob(value, items)?);
                &blob
            }
            Value::List(_) | Value::Map(_) => {
                return Err(self.unconvertible(value, "nested value for a primitive"))
            }
            value => value,
        };

        match self.primitive.logical() {
            Some(LogicalType::Decimal) => return self.encode_decimal(value),
            Some(LogicalType::Interval) => {
                let v = self.integer(value)?;
                return Ok(EncodedValue::FixedLenByteArray(int_to_le_bytes(v).to_vec()));
            }
            Some(logical) if logical.is_textual() => {
                return Ok(EncodedValue::ByteArray(self.text(value)?.into_owned().into_bytes()));
            }
            _ => {}
        }

        match self.primitive.physical() {
            PhysicalType::Boolean => match value {
                Value::Boolean(b) => Ok(EncodedValue::Boolean(*b)),
                Value::String(s) => s
                    .trim()
                    .parse::<bool>()
                    .map(EncodedValue::Boolean)
                    .map_err(|err| self.unconvertible(value, err.to_string())),
                _ => Err(self.unconvertible(value, "expected a boolean")),
            },
            PhysicalType::Int32 => {
                let v = self.integer(value)?;
                let narrowed = match self.primitive.logical() {
                    Some(LogicalType::Uint8 | LogicalType::Uint16 | LogicalType::Uint32) => {
                        v as u32 as i32
                    }
                    _ => v as i32,
                };
                Ok(EncodedValue::Int32(narrowed))
            }
            PhysicalType::Int64 => {
                let v = self.integer(value)?;
                let narrowed = match self.primitive.logical() {
                    Some(LogicalType::Uint64) => v as u64 as i64,
                    _ => v as i64,
                };
                Ok(EncodedValue::Int64(narrowed))
            }
            PhysicalType::Int96 => Ok(EncodedValue::Int96(int_to_le_bytes(self.integer(value)?))),
            PhysicalType::Float => Ok(EncodedValue::Float(self.float(value)? as f32)),
            PhysicalType::Double => Ok(EncodedValue::Double(self.float(value)?)),
            PhysicalType::ByteArray => Ok(EncodedValue::ByteArray(self.raw_bytes(value)?)),
            PhysicalType::FixedLenByteArray => {
                let bytes = self.raw_bytes(value)?;
                let length = self.primitive.length().unwrap_or(0) as usize;
                if bytes.len() != length {
                    return Err(self.unconvertible(
                        value,
                        format!("expected {length} bytes, found {}", bytes.len()),
                    ));
                }
                Ok(EncodedValue::FixedLenByteArray(bytes))
            }
        }
    }

    /// Converts an encoded value back into a [`Value`]. Narrowed numeric
    /// types are widened, decimals become text.
    pub fn decode(&self, encoded: &EncodedValue) -> Result<Value> {
        let value = match (self.primitive.logical(), encoded) {
            (Some(LogicalType::Decimal), encoded) => {
                let unscaled = match encoded {
                    EncodedValue::Int32(v) => i128::from(*v),
                    EncodedValue::Int64(v) => i128::from(*v),
                    EncodedValue::ByteArray(bytes) | EncodedValue::FixedLenByteArray(bytes) => {
                        be_bytes_to_int(bytes).ok_or_else(|| {
                            self.unconvertible(&Value::Bytes(bytes.clone()), "decimal too wide")
                        })?
                    }
                    other => return Err(self.undecodable(other)),
                };
                Value::String(format_decimal(unscaled, self.primitive.scale()))
            }
            (Some(logical), EncodedValue::ByteArray(bytes)) if logical.is_textual() => {
                Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
            (Some(LogicalType::Uint64), EncodedValue::Int64(v)) => Value::UnsignedInteger(*v as u64),
            (Some(LogicalType::Uint32), EncodedValue::Int32(v)) => Value::Integer(i64::from(*v as u32)),
            (_, EncodedValue::Boolean(v)) => Value::Boolean(*v),
            (_, EncodedValue::Int32(v)) => Value::Integer(i64::from(*v)),
            (_, EncodedValue::Int64(v)) => Value::Integer(*v),
            (_, EncodedValue::Float(v)) => Value::Float(f64::from(*v)),
            (_, EncodedValue::Double(v)) => Value::Float(*v),
            (_, EncodedValue::Int96(bytes)) => Value::Bytes(bytes.to_vec()),
            (_, EncodedValue::ByteArray(bytes) | EncodedValue::FixedLenByteArray(bytes)) => {
                Value::Bytes(bytes.clone())
            }
        };

        Ok(value)
    }

    fn unconvertible(&self, value: &Value, reason: impl Into<String>) -> ShredError {
        ShredError::UnconvertiblePrimitive {
            path_str: self.path_str.to_string(),
            type_label: self.primitive.type_label(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn undecodable(&self, encoded: &EncodedValue) -> ShredError {
        ShredError::inconsistent(
            self.path_str,
            format!(
                "{} value: {encoded} stored in {} column",
                encoded.physical_type(),
                self.primitive.type_label()
            ),
        )
    }

    fn collect_blob(&self, list: &Value, items: &[Value]) -> Result<Vec<u8>> {
        items
            .iter()
            .map(|item| match item {
                Value::Integer(b) => u8::try_from(*b).ok(),
                Value::UnsignedInteger(b) => u8::try_from(*b).ok(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.unconvertible(list, "list elements are not bytes"))
    }

    /// Canonical textual form of a scalar.
    fn text<'v>(&self, value: &'v Value) -> Result<Cow<'v, str>> {
        match value {
            Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
            Value::Boolean(v) => Ok(Cow::Owned(v.to_string())),
            Value::Integer(v) => Ok(Cow::Owned(v.to_string())),
            Value::UnsignedInteger(v) => Ok(Cow::Owned(v.to_string())),
            Value::Float(v) => Ok(Cow::Owned(v.to_string())),
            Value::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|err| self.unconvertible(value, err.to_string())),
            Value::Null | Value::List(_) | Value::Map(_) => {
                Err(self.unconvertible(value, "expected a scalar"))
            }
        }
    }

    /// Integer value, floats are truncated towards zero.
    fn integer(&self, value: &Value) -> Result<i128> {
        match value {
            Value::Integer(v) => Ok(i128::from(*v)),
            Value::UnsignedInteger(v) => Ok(i128::from(*v)),
            Value::Float(v) if v.is_finite() => Ok(v.trunc() as i128),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite())
                            .map(|v| v.trunc() as i128)
                    })
                    .ok_or_else(|| self.unconvertible(value, "not an integer"))
            }
            _ => Err(self.unconvertible(value, "expected an integer")),
        }
    }

    fn float(&self, value: &Value) -> Result<f64> {
        match value {
            Value::Integer(v) => Ok(*v as f64),
            Value::UnsignedInteger(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|err| self.unconvertible(value, err.to_string())),
            _ => Err(self.unconvertible(value, "expected a number")),
        }
    }

    /// Bytes for a byte array without a logical type. The textual form of
    /// raw binary is base64, so byte values pass through unchanged and
    /// strings are decoded.
    fn raw_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::String(s) => STANDARD
                .decode(s.as_bytes())
                .map_err(|err| self.unconvertible(value, format!("invalid base64: {err}"))),
            _ => Err(self.unconvertible(value, "expected bytes or base64 text")),
        }
    }

    fn encode_decimal(&self, value: &Value) -> Result<EncodedValue> {
        let text = match value {
            Value::String(_) | Value::Integer(_) | Value::UnsignedInteger(_) | Value::Float(_) => {
                self.text(value)?
            }
            _ => return Err(self.unconvertible(value, "expected a decimal number")),
        };

        let precision = self.primitive.precision().unwrap_or(38);
        let unscaled = DecimalParser::<i128>::new(precision, self.primitive.scale())
            .parse(&text)
            .ok_or_else(|| {
                self.unconvertible(
                    value,
                    format!(
                        "does not fit DECIMAL({precision},{})",
                        self.primitive.scale()
                    ),
                )
            })?;

        let encoded = match self.primitive.physical() {
            PhysicalType::Int32 => EncodedValue::Int32(unscaled as i32),
            PhysicalType::Int64 => EncodedValue::Int64(unscaled as i64),
            PhysicalType::FixedLenByteArray => {
                let length = self.primitive.length().unwrap_or(16) as usize;
                if int_to_min_be_bytes(unscaled).len() > length {
                    return Err(self.unconvertible(
                        value,
                        format!("unscaled value does not fit in {length} bytes"),
                    ));
                }
                EncodedValue::FixedLenByteArray(int_to_be_bytes(unscaled, length))
            }
            _ => EncodedValue::ByteArray(int_to_min_be_bytes(unscaled)),
        };

        Ok(encoded)
    }
}

/// Lower 12 bytes of the little-endian two's complement representation.
fn int_to_le_bytes(v: i128) -> [u8; 12] {
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(&v.to_le_bytes()[..12]);
    bytes
}

/// Big-endian two's complement in exactly `length` bytes, sign extended.
/// The value must fit in `length` bytes.
fn int_to_be_bytes(v: i128, length: usize) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    if length >= bytes.len() {
        let fill = if v < 0 { 0xff } else { 0x00 };
        let mut out = vec![fill; length - bytes.len()];
        out.extend_from_slice(&bytes);
        out
    } else {
        bytes[bytes.len() - length..].to_vec()
    }
}

/// Shortest big-endian two's complement representation.
fn int_to_min_be_bytes(v: i128) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn be_bytes_to_int(bytes: &[u8]) -> Option<i128> {
    if bytes.is_empty() {
        return Some(0);
    }
    // Strip sign extension beyond 16 bytes
    let excess = bytes.len().saturating_sub(16);
    let (extension, bytes) = bytes.split_at(excess);
    let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0x00 };
    if extension.iter().any(|b| *b != fill) {
        return None;
    }

    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Some(i128::from_be_bytes(buf))
}
