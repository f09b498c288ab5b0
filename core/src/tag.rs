//! Host type tags.
//!
//! A tag identifies a host-language type without the metamodel knowing
//! anything about that type. Tags are compared by their textual identity.

use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a host-language type, used for reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostTypeTag(Arc<str>);

impl HostTypeTag {
    /// Create a tag from an arbitrary identifier.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Create the tag for a Rust type.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostTypeTag {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
