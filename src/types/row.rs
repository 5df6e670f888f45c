use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single cell value as seen by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Text shown by the default cell renderer.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Ordering used when a column has no comparator.
    ///
    /// Nulls sort first, then booleans, numbers and text.
    pub fn compare(&self, other: &Self) -> Ordering {
        fn rank(v: &CellValue) -> u8 {
            match v {
                CellValue::Null => 0,
                CellValue::Bool(_) => 1,
                CellValue::Number(_) => 2,
                CellValue::Text(_) => 3,
            }
        }
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<CellValue> for serde_json::Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Null => Self::Null,
            CellValue::Bool(b) => Self::Bool(b),
            CellValue::Number(n) => serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number),
            CellValue::Text(s) => Self::String(s),
        }
    }
}

/// Stable identity of a row, used by the row-selection set and row updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<usize> for RowKey {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or_else(|_| Self::Str(i.to_string()), Self::Int)
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// Caller-supplied row data.
///
/// Rows are never mutated in place: edits produce a new row through
/// [`GridRow::with_cell_value`] which is handed back to the caller.
pub trait GridRow: Clone + PartialEq {
    /// Value stored under a column key.
    fn cell_value(&self, key: &str) -> Option<CellValue>;

    /// A copy of this row with one value replaced.
    #[must_use]
    fn with_cell_value(&self, key: &str, value: CellValue) -> Self;
}

/// JSON object rows, as used by the wasm facade and the CLI.
pub type JsonRow = serde_json::Map<String, serde_json::Value>;

impl GridRow for JsonRow {
    fn cell_value(&self, key: &str) -> Option<CellValue> {
        self.get(key).cloned().map(CellValue::from)
    }

    fn with_cell_value(&self, key: &str, value: CellValue) -> Self {
        let mut row = self.clone();
        row.insert(key.to_string(), value.into());
        row
    }
}

/// Row key derived from a JSON field, falling back to the row index.
pub fn json_row_key(row: &JsonRow, field: &str, row_idx: usize) -> RowKey {
    match row.get(field) {
        Some(serde_json::Value::Number(n)) => n.as_i64().map_or_else(|| RowKey::Str(n.to_string()), RowKey::Int),
        Some(serde_json::Value::String(s)) => RowKey::Str(s.clone()),
        _ => RowKey::from(row_idx),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> JsonRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_json_row_values() {
        let r = row(json!({"id": 1, "title": "Task", "done": false}));
        assert_eq!(r.cell_value("id"), Some(CellValue::Number(1.0)));
        assert_eq!(r.cell_value("title"), Some(CellValue::Text("Task".into())));
        assert_eq!(r.cell_value("done"), Some(CellValue::Bool(false)));
        assert_eq!(r.cell_value("missing"), None);
    }

    #[test]
    fn test_with_cell_value_leaves_original() {
        let r = row(json!({"id": 1, "title": "Task"}));
        let updated = r.with_cell_value("title", CellValue::Text("Renamed".into()));
        assert_eq!(r.cell_value("title"), Some(CellValue::Text("Task".into())));
        assert_eq!(updated.cell_value("title"), Some(CellValue::Text("Renamed".into())));
        assert_eq!(updated.cell_value("id"), Some(CellValue::Number(1.0)));
    }

    #[test]
    fn test_json_row_key() {
        let r = row(json!({"id": 7, "code": "A-1"}));
        assert_eq!(json_row_key(&r, "id", 0), RowKey::Int(7));
        assert_eq!(json_row_key(&r, "code", 0), RowKey::Str("A-1".into()));
        assert_eq!(json_row_key(&r, "missing", 3), RowKey::Int(3));
    }

    #[test]
    fn test_value_ordering() {
        assert_eq!(CellValue::Null.compare(&CellValue::Number(1.0)), Ordering::Less);
        assert_eq!(
            CellValue::Number(2.0).compare(&CellValue::Number(10.0)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Text("b".into()).compare(&CellValue::Text("a".into())),
            Ordering::Greater
        );
    }
}
