use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single table record: column name -> string value.
///
/// Fields keep their insertion order. Rows produced by the store are always
/// in the table's schema order, so they serialize to JSON objects whose keys
/// follow the column order on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Set `column` only when a value is given (used for partial updates)
    pub fn with_some(self, column: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(value) => self.with(column, value),
            None => self,
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `column`, or the empty string when the row has no such column
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Insert or overwrite a column, keeping the position of an existing one
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when at least one column holds a non-empty value
    pub fn has_data(&self) -> bool {
        self.fields.iter().any(|(_, value)| !value.is_empty())
    }

    /// Exactly `columns`, in that order. Missing columns become empty strings
    /// and columns outside the list are dropped.
    pub fn project(&self, columns: &[&str]) -> Row {
        columns
            .iter()
            .map(|column| (*column, self.value(column)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of column names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
        let mut row = Row::new();
        while let Some((column, value)) = access.next_entry::<String, String>()? {
            row.set(column, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Row, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let mut row = Row::new().with("id", "1").with("name", "a");
        row.set("id", "2");
        row.set("currency", "USD");

        let columns: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["id", "name", "currency"]);
        assert_eq!(row.value("id"), "2");
    }

    #[test]
    fn test_project_pads_and_drops() {
        let row = Row::new().with("extra", "x").with("name", "X");
        let projected = row.project(&["id", "name", "user_id"]);

        assert_eq!(
            projected,
            Row::new().with("id", "").with("name", "X").with("user_id", "")
        );
        assert!(!projected.contains("extra"));
    }

    #[test]
    fn test_has_data() {
        assert!(!Row::new().with("a", "").with("b", "").has_data());
        assert!(Row::new().with("a", "").with("b", "1").has_data());
    }

    #[test]
    fn test_json_preserves_column_order() {
        let row = Row::new().with("id", "1").with("user_id", "u1").with("name", "X");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":"1","user_id":"u1","name":"X"}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_json_rejects_non_string_values() {
        assert!(serde_json::from_str::<Row>(r#"{"quantity": 10}"#).is_err());
    }
}
