//! Internal representation of a schema path as a sequence of field names.

use std::fmt::{Display, Formatter};
use std::ops::Deref;

/// Provides a type-safe representation for paths in the schema tree and
/// path specific methods.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PathVector(Vec<String>);

impl Deref for PathVector {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&[&str]> for PathVector {
    fn from(slice: &[&str]) -> Self {
        PathVector(slice.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for PathVector {
    fn from(vec: Vec<String>) -> Self {
        PathVector(vec)
    }
}

impl From<&str> for PathVector {
    /// Splits a dotted path, eg. `a.b.c`. An empty string is the root.
    fn from(dotted: &str) -> Self {
        if dotted.is_empty() {
            PathVector::root()
        } else {
            PathVector(dotted.split('.').map(String::from).collect())
        }
    }
}

impl Display for PathVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.join("."))
        }
    }
}

impl PathVector {
    pub fn root() -> Self {
        PathVector(vec![])
    }

    /// Checks if path represents the root (is empty)
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// Creates a new `PathVector` by appending a path component.
    pub fn append_name(&self, name: impl Into<String>) -> Self {
        PathVector(
            self.iter()
                .cloned()
                .chain(std::iter::once(name.into()))
                .collect(),
        )
    }

    /// Returns the count of components(depth) in a path
    pub fn depth(&self) -> usize {
        self.len()
    }

    /// Returns the dotted form used as a column key. The root is the empty
    /// string.
    pub fn dotted(&self) -> String {
        self.join(".")
    }

    /// Checks if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &PathVector) -> bool {
        other.starts_with(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let root = PathVector::root();

        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.dotted(), "");
        assert_eq!(root.to_string(), "<root>");
        assert_eq!(PathVector::from(""), root);
    }

    #[test]
    fn test_append_name() {
        let path = PathVector::root().append_name("a").append_name("b");

        assert_eq!(path.depth(), 2);
        assert_eq!(path.dotted(), "a.b");
        assert_eq!(path, PathVector::from("a.b"));
    }

    #[test]
    fn test_prefix() {
        let parent = PathVector::from("a.b");

        assert!(parent.is_prefix_of(&PathVector::from("a.b")));
        assert!(parent.is_prefix_of(&PathVector::from("a.b.c")));
        assert!(!parent.is_prefix_of(&PathVector::from("a.bc")));
        assert!(!parent.is_prefix_of(&PathVector::from("a")));
        assert!(PathVector::root().is_prefix_of(&parent));
    }
}
