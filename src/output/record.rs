//! Output record type
//!
//! Field sets differ between movies and shows and part of them is harvested
//! from page content, so a record is an ordered label → value mapping rather
//! than a fixed struct.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Keys present in every emitted record
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "synopsis",
    "cast",
    "tomatometer",
    "audience score",
    "url",
];

/// Ordered mapping from lower-cased field label to optional value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an existing value in place
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into().to_lowercase();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Returns the value of a field; `None` when absent or null
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// The `title` field, or a placeholder for logging
    pub fn display_title(&self) -> &str {
        self.get("title").unwrap_or("<untitled>")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces() {
        let mut record = Record::new();
        record.insert("title", Some("Alien".to_string()));
        record.insert("Genre", Some("Horror".to_string()));
        record.insert("title", Some("Aliens".to_string()));

        assert_eq!(record.get("title"), Some("Aliens"));
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"title":"Aliens","genre":"Horror"}"#
        );
    }

    #[test]
    fn test_null_values() {
        let mut record = Record::new();
        record.insert("tomatometer", None);

        assert!(record.contains_key("tomatometer"));
        assert_eq!(record.get("tomatometer"), None);
        assert_eq!(record.display_title(), "<untitled>");
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut record = Record::new();
        record.insert("title", Some("Heat".to_string()));
        record.insert("audience score", None);
        record.insert("url", Some("https://www.rottentomatoes.com/m/heat".to_string()));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Heat","audience score":null,"url":"https://www.rottentomatoes.com/m/heat"}"#
        );
    }
}
