//! Name maps with configurable case sensitivity.
//!
//! Keys are normalized once on insert and once on lookup, so a map built in
//! case-insensitive mode finds `"Name"` when asked for `"NAME"` while still
//! reporting the name as it was declared.

use indexmap::IndexMap;
use std::borrow::Cow;

/// Key normalization strategy for a [`NameMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseMode {
    /// Keys must match exactly.
    #[default]
    Sensitive,
    /// Keys are folded to lower case before comparison.
    Insensitive,
}

impl CaseMode {
    pub fn from_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseMode::Sensitive
        } else {
            CaseMode::Insensitive
        }
    }

    pub fn is_sensitive(self) -> bool {
        self == CaseMode::Sensitive
    }

    /// Normalize a name into its lookup key.
    pub fn normalize(self, name: &str) -> Cow<'_, str> {
        match self {
            CaseMode::Sensitive => Cow::Borrowed(name),
            CaseMode::Insensitive => Cow::Owned(name.to_lowercase()),
        }
    }
}

/// Insertion-ordered map from names to values.
#[derive(Debug, Clone)]
pub struct NameMap<V> {
    mode: CaseMode,
    /// Normalized key to (declared name, value).
    entries: IndexMap<String, (String, V)>,
}

impl<V> NameMap<V> {
    pub fn new(mode: CaseMode) -> Self {
        Self {
            mode,
            entries: IndexMap::new(),
        }
    }

    pub fn mode(&self) -> CaseMode {
        self.mode
    }

    /// Insert a value. Returns the displaced entry (declared name and value)
    /// when another name already occupied the same key.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<(String, V)> {
        let name = name.into();
        let key = self.mode.normalize(&name).into_owned();
        self.entries.insert(key, (name, value))
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .get(self.mode.normalize(name).as_ref())
            .map(|(_, value)| value)
    }

    /// Get the declared name together with the value.
    pub fn get_entry(&self, name: &str) -> Option<(&str, &V)> {
        self.entries
            .get(self.mode.normalize(name).as_ref())
            .map(|(declared, value)| (declared.as_str(), value))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries
            .contains_key(self.mode.normalize(name).as_ref())
    }

    /// Iterate entries by declared name, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for NameMap<V> {
    fn default() -> Self {
        Self::new(CaseMode::default())
    }
}
