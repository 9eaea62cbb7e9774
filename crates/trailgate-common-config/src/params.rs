//! Plugin parameters handed over by the host.

use std::collections::BTreeMap;

/// Key/value parameters with case-insensitive keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginParams {
    entries: BTreeMap<String, String>,
}

impl PluginParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any value under the same key.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Set a parameter, builder style.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a parameter. Blank values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill in every key `other` has and `self` lacks.
    pub fn merge_missing(&mut self, other: PluginParams) {
        for (key, value) in other.entries {
            self.entries.entry(key).or_insert(value);
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PluginParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}
