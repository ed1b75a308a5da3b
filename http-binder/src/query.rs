//! Parsed query strings
//!
//! [`QueryParams`] maps each key to the ordered list of raw values it was
//! given. Keys may repeat in the query string (`?tag=a&tag=b`); their values
//! are collected under one entry. Keys are iterated in first-seen order.
//!
//! # Example
//!
//! ```rust
//! use http_binder::QueryParams;
//!
//! let params = QueryParams::parse("status=active&tag=a&tag=b&empty=");
//! assert_eq!(params.get("status"), Some("active"));
//! assert_eq!(params.get_all("tag"), ["a", "b"]);
//! assert_eq!(params.get("empty"), Some(""));
//! assert_eq!(params.get("missing"), None);
//! ```

use std::collections::HashMap;

/// Query string parameters keyed by name
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl PartialEq for QueryParams {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for QueryParams {}

impl QueryParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (percent-encoded) query string, without the leading `?`
    #[must_use]
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Append a value to a key, creating the key if needed
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1.push(value),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// First value for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// First value for a key, treating an empty value the same as a missing key
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// All values for a key, in the order they appeared
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.index
            .get(key)
            .map_or(&[], |&slot| self.entries[slot].1.as_slice())
    }

    /// Whether the key appeared at all
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate keys with their values in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}
