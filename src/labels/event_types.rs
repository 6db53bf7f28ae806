//! Event-type map: integer label keys <-> type names.
//!
//! One map belongs to a label scheme and is shared by every label stream
//! using that scheme. Renames are in-place and visible to all holders.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Integer key stored on every label
pub type LabelKey = i64;

/// Reserved key for unlabeled intervals
pub const NULL_LABEL_KEY: LabelKey = -1;

/// Display name of the reserved null type
pub const NULL_LABEL_NAME: &str = "null";

/// Shared handle to a scheme's event-type map
pub type SharedEventTypes = Rc<RefCell<EventTypeMap>>;

/// A type key as it arrives from callers: either an integer or a string.
///
/// Strings made only of digits are the same key as the integer they spell;
/// any other string is a type name looked up in the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKey {
    Key(LabelKey),
    Name(String),
}

impl From<LabelKey> for TypeKey {
    fn from(key: LabelKey) -> Self {
        TypeKey::Key(key)
    }
}

impl From<&str> for TypeKey {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        let is_digits = !trimmed.is_empty()
            && trimmed
                .strip_prefix('-')
                .unwrap_or(trimmed)
                .chars()
                .all(|c| c.is_ascii_digit());

        match trimmed.parse::<LabelKey>() {
            Ok(key) if is_digits => TypeKey::Key(key),
            _ => TypeKey::Name(value.to_string()),
        }
    }
}

impl From<String> for TypeKey {
    fn from(value: String) -> Self {
        TypeKey::from(value.as_str())
    }
}

/// Bidirectional mapping between label keys and type names
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTypeMap {
    types: BTreeMap<LabelKey, String>,
}

impl Default for EventTypeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTypeMap {
    /// Create a map holding only the reserved null type
    pub fn new() -> Self {
        let mut types = BTreeMap::new();
        types.insert(NULL_LABEL_KEY, NULL_LABEL_NAME.to_string());
        Self { types }
    }

    /// Create a map with keys 0.. assigned to `names` in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (key, name) in names.into_iter().enumerate() {
            map.insert(key as LabelKey, name);
        }
        map
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedEventTypes {
        Rc::new(RefCell::new(self))
    }

    /// Insert or replace a type
    pub fn insert(&mut self, key: LabelKey, name: impl Into<String>) {
        self.types.insert(key, name.into());
    }

    /// Rename an existing type. Returns false if the key is unknown.
    pub fn rename(&mut self, key: LabelKey, name: impl Into<String>) -> bool {
        match self.types.get_mut(&key) {
            Some(existing) => {
                *existing = name.into();
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: LabelKey) -> bool {
        self.types.contains_key(&key)
    }

    /// Type name for a key, or `None` (with a warning) if the key is unknown
    pub fn name_of(&self, key: LabelKey) -> Option<&str> {
        let name = self.types.get(&key).map(String::as_str);
        if name.is_none() {
            tracing::warn!("Label key {} is not in the event type map", key);
        }
        name
    }

    /// Key for a type name
    pub fn key_of(&self, name: &str) -> Option<LabelKey> {
        self.types
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(k, _)| *k)
    }

    /// Normalize a caller-supplied type key to its integer form
    pub fn resolve(&self, key: &TypeKey) -> Option<LabelKey> {
        match key {
            TypeKey::Key(k) => Some(*k),
            TypeKey::Name(name) => self.key_of(name),
        }
    }

    /// Iterate over (key, name) pairs in key order, null type included
    pub fn iter(&self) -> impl Iterator<Item = (LabelKey, &str)> {
        self.types.iter().map(|(k, n)| (*k, n.as_str()))
    }

    /// Number of types, null type included
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
