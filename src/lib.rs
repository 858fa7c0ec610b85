//! A library which implements column shredding of nested records by
//! encoding definition and repetition levels for each value. The definition
//! and repetition levels preserve the structural hierarchy of the nested
//! record, so it is possible to reassemble the record in its original form
//! from the encoded columns.
//!
//! Records are dynamically typed [`Value`] trees, as produced by decoding
//! JSON or Avro. They are shredded against a [`SchemaTree`] built from a
//! [`Schema`] into a [`ColumnTableSet`], which holds the values, definition
//! levels and repetition levels of every leaf column.
//!
//! # Design
//! The technique for column shredding is described in the paper:
//! [Dremel: Interactive Analysis of Web-Scale Datasets](https://static.googleusercontent.com/media/research.google.com/en//pubs/archive/36632.pdf).
//!
//! Maps and lists follow the three-level layout of Parquet: a map field
//! holds a repeated `key_value` group of `key` and `value`, and a list field
//! holds a repeated `list` group of `element`.

#![warn(missing_debug_implementations)]

pub mod assembler;
pub mod column;
pub mod common;
pub mod encoder;
pub mod error;
pub mod field;
mod path_vector;
pub mod resolver;
pub mod schema;
pub mod schema_tree;
pub mod shredder;
pub mod value;

pub use self::assembler::RecordAssembler;
pub use self::column::{ColumnTable, ColumnTableSet};
pub use self::encoder::{EncodedValue, PrimitiveEncoder};
pub use self::error::{Result, ShredError};
pub use self::path_vector::PathVector;
pub use self::resolver::{ExportedNameResolver, FieldNameResolver, IdentityResolver};
pub use self::schema::{Schema, SchemaBuilder};
pub use self::schema_tree::SchemaTree;
pub use self::shredder::{ShredOptions, Shredder, UnknownFieldPolicy};
pub use self::value::{Value, ValueBuilder};
