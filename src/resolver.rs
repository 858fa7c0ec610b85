//! Translation of record keys into the field names used by a schema.

use std::borrow::Cow;
use std::fmt::Debug;

/// Maps a key found in a record map to the name of a schema field.
///
/// Resolvers are shared by all partitions of a parallel batch, so they must
/// be `Send + Sync`.
pub trait FieldNameResolver: Debug + Send + Sync {
    fn resolve<'a>(&self, key: &'a str) -> Cow<'a, str>;
}

/// Uses record keys unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityResolver;

impl FieldNameResolver for IdentityResolver {
    fn resolve<'a>(&self, key: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(key)
    }
}

/// Resolves keys to the exported-identifier form used by schemas generated
/// for Go structs.
///
/// Every byte that is not an ASCII letter or digit is replaced by its
/// decimal code, and the first letter is upper-cased. A name that does not
/// begin with a letter is prefixed with `PARGO_PREFIX_`.
///
/// ```
/// use striper::resolver::{ExportedNameResolver, FieldNameResolver};
///
/// let resolver = ExportedNameResolver;
/// assert_eq!(resolver.resolve("name"), "Name");
/// assert_eq!(resolver.resolve("first_name"), "First95name");
/// assert_eq!(resolver.resolve("_id"), "PARGO_PREFIX_95id");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportedNameResolver;

impl ExportedNameResolver {
    pub const PREFIX: &'static str = "PARGO_PREFIX_";
}

impl FieldNameResolver for ExportedNameResolver {
    fn resolve<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if key.is_empty() {
            return Cow::Borrowed(key);
        }

        let mut name = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() {
                name.push(char::from(b));
            } else {
                name.push_str(&b.to_string());
            }
        }

        // Starts with an ASCII character after the replacement above
        let head = name.as_bytes()[0];
        if head.is_ascii_alphabetic() {
            name[..1].make_ascii_uppercase();
            Cow::Owned(name)
        } else {
            Cow::Owned(format!("{}{name}", Self::PREFIX))
        }
    }
}
