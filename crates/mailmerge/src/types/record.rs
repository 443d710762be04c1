use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

/// The key/value data driving one merge.
///
/// Keys are looked up by presence: a key mapped to the empty string is
/// still present.
///
/// # Example
///
/// ```
/// use mailmerge::DataRecord;
///
/// let mut record = DataRecord::new();
/// record.insert("name", "Alice");
/// assert_eq!(record.get("name"), Some("Alice"));
/// assert!(!record.contains_key("city"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataRecord {
    values: BTreeMap<String, String>,
}

impl DataRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the record defines `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<'a> IntoIterator for &'a DataRecord {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
