//! Striper error types

use thiserror::Error;

/// Result type for [`ShredError`]
pub type Result<T, E = ShredError> = std::result::Result<T, E>;

/// Error Type
#[derive(Debug, Error)]
pub enum ShredError {
    /// The schema definition is inconsistent and a schema tree cannot be
    /// built from it.
    #[error("Malformed schema at path: {path_str}: {reason}")]
    MalformedSchema { path_str: String, reason: String },

    /// The runtime shape of a value does not match the structural kind
    /// expected by the schema node.
    #[error("Value does not match schema at path: {path_str}, expected: {expected}, found: {found}")]
    SchemaMismatch {
        path_str: String,
        expected: String,
        found: String,
    },

    /// A scalar value could not be converted into the physical type of the
    /// primitive leaf.
    #[error("Cannot convert value: {value} into {type_label} at path: {path_str}: {reason}")]
    UnconvertiblePrimitive {
        path_str: String,
        type_label: String,
        value: String,
        reason: String,
    },

    /// A property name found in a map value is not defined in the schema.
    /// Only raised when unknown fields are rejected.
    #[error("Struct contains undefined property: {undefined_property_name} at path: {path_str}")]
    StructContainsUndefinedProperty {
        undefined_property_name: String,
        path_str: String,
    },

    /// A column table expected by the schema tree is not present.
    #[error("Column table not found for path: {path_str}")]
    ColumnNotFound { path_str: String },

    /// The column tables disagree with the schema about the record
    /// structure and cannot be reassembled.
    #[error("Column table at path: {path_str} is inconsistent: {reason}")]
    InconsistentColumn { path_str: String, reason: String },
}

impl ShredError {
    pub(crate) fn mismatch(
        path_str: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ShredError::SchemaMismatch {
            path_str: path_str.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn malformed(path_str: impl Into<String>, reason: impl Into<String>) -> Self {
        ShredError::MalformedSchema {
            path_str: path_str.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(path_str: impl Into<String>, reason: impl Into<String>) -> Self {
        ShredError::InconsistentColumn {
            path_str: path_str.into(),
            reason: reason.into(),
        }
    }
}
