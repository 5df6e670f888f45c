//! Row mutations produced by cell editors.
//!
//! Rows are immutable from the engine's point of view: every edit yields a
//! new row that flows back to the caller through the row-update callback.

use crate::types::{CellValue, GridRow};

/// Interpret text typed into an editor.
///
/// - Empty (after trimming) → Null
/// - "true"/"false" (case-insensitive) → Bool
/// - Parseable as f64 → Number
/// - Otherwise → Text, untrimmed
pub fn parse_input(text: &str) -> CellValue {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // "NaN"/"inf" parse as f64 but are kept as text
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return CellValue::Number(n);
        }
    }

    CellValue::Text(text.to_string())
}

/// A copy of `row` with the typed text stored under `key`.
pub fn apply_text_edit<R: GridRow>(row: &R, key: &str, text: &str) -> R {
    row.with_cell_value(key, parse_input(text))
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
    use crate::types::JsonRow;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("" => CellValue::Null; "empty")]
    #[test_case("   " => CellValue::Null; "blank")]
    #[test_case("TRUE" => CellValue::Bool(true); "bool upper")]
    #[test_case("false" => CellValue::Bool(false); "bool lower")]
    #[test_case("42" => CellValue::Number(42.0); "integer")]
    #[test_case(" -1.5 " => CellValue::Number(-1.5); "float trimmed")]
    #[test_case("NaN" => CellValue::Text("NaN".into()); "nan stays text")]
    #[test_case("hello world" => CellValue::Text("hello world".into()); "text")]
    fn test_parse_input(text: &str) -> CellValue {
        parse_input(text)
    }

    #[test]
    fn test_apply_text_edit_keeps_other_fields() {
        let row: JsonRow = json!({"id": 1, "title": "old", "done": false})
            .as_object()
            .cloned()
            .unwrap();
        let edited = apply_text_edit(&row, "title", "new");
        assert_eq!(edited.get("title"), Some(&json!("new")));
        assert_eq!(edited.get("id"), row.get("id"));
        assert_eq!(edited.get("done"), row.get("done"));
    }
}
