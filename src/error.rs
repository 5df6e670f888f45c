//! Structured error types for gridview.
//!
//! Only column configuration and host input can fail. Navigation and span
//! normalization never produce errors; they clamp or ignore instead.

/// All errors that can occur while configuring a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Two columns share the same key.
    #[error("Duplicate column key: {0}")]
    DuplicateColumnKey(String),

    /// A column's minimum width exceeds its maximum width.
    #[error("Column {key}: min width {min} exceeds max width {max}")]
    InvalidWidthBounds { key: String, min: f32, max: f32 },

    /// A column width that cannot be resolved (negative or non-finite).
    #[error("Column {key}: invalid width {width}")]
    InvalidColumnWidth { key: String, width: String },

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Host input the grid could not convert (e.g. a malformed JS value).
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_converts_to_other() {
        let err = GridError::from("invalid type: expected a map".to_string());
        assert!(matches!(err, GridError::Other(_)));
        assert_eq!(err.to_string(), "invalid type: expected a map");
    }

    #[test]
    fn test_json_error_message() {
        let err: GridError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON: "));
    }
}
