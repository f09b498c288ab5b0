//! Opaque metadata attached to definitions and resolved types.
//!
//! Metadata is keyed by the Rust type of the value. External processors
//! attach whatever they need; the metamodel only stores and copies it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single metadata entry.
#[derive(Clone)]
struct MetadataEntry {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// Map from a capability identifier (the value's type) to an opaque value.
#[derive(Clone, Default)]
pub struct Metadata {
    entries: HashMap<TypeId, MetadataEntry>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value, replacing any previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.entries.insert(
            TypeId::of::<T>(),
            MetadataEntry {
                type_name: std::any::type_name::<T>(),
                value: Arc::new(value),
            },
        );
    }

    /// Builder-style variant of [`Metadata::insert`].
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Get the value attached for type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// Check if a value of type `T` is attached.
    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Copy all entries of `other` into this map. Entries of `other` win.
    pub fn extend(&mut self, other: &Metadata) {
        for (key, entry) in &other.entries {
            self.entries.insert(*key, entry.clone());
        }
    }

    /// Type names of the attached values, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convenience accessor for [`Documentation`].
    pub fn documentation(&self) -> Option<&str> {
        self.get::<Documentation>().map(|doc| doc.0.as_str())
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}

/// Human-readable documentation of a type, attribute, value or function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation(pub String);

impl Documentation {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}
