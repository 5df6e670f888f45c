//! Grid configuration.
//!
//! `GridConfig` collects the knobs a host sets once per grid: row heights,
//! overscan margins, virtualization and text direction. It deserializes from
//! camelCase JSON so the wasm facade and the CLI can accept it directly.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::error::Result;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f32 = 35.0;

/// Default minimum column width in pixels.
pub const DEFAULT_MIN_COLUMN_WIDTH: f32 = 50.0;

/// Default number of extra rows rendered above and below the visible window.
pub const DEFAULT_OVERSCAN_ROW_COUNT: usize = 4;

/// Text direction. In `Rtl` grids ArrowLeft moves to the next column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Options applied to every column that does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultColumnOptions {
    pub min_width: f32,
    pub max_width: Option<f32>,
    pub sortable: bool,
    pub resizable: bool,
}

impl Default for DefaultColumnOptions {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            max_width: None,
            sortable: false,
            resizable: false,
        }
    }
}

/// Grid-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Height of every data row unless a per-row accessor is installed
    pub row_height: f32,
    /// Header row height (falls back to `row_height`)
    pub header_row_height: Option<f32>,
    /// Summary row height (falls back to `row_height`)
    pub summary_row_height: Option<f32>,
    /// Rows rendered beyond each edge of the visible window
    pub overscan_row_count: usize,
    /// Scrollable columns rendered beyond each edge of the visible window
    pub overscan_column_count: usize,
    /// When false every row and column is materialized
    pub enable_virtualization: bool,
    pub direction: Direction,
    pub default_column_options: DefaultColumnOptions,
    /// Draw a border between summary rows and data rows
    pub show_summary_border: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            header_row_height: None,
            summary_row_height: None,
            overscan_row_count: DEFAULT_OVERSCAN_ROW_COUNT,
            overscan_column_count: 0,
            enable_virtualization: true,
            direction: Direction::Ltr,
            default_column_options: DefaultColumnOptions::default(),
            show_summary_border: false,
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON for this shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn header_row_height(&self) -> f32 {
        self.header_row_height.unwrap_or(self.row_height)
    }

    pub fn summary_row_height(&self) -> f32 {
        self.summary_row_height.unwrap_or(self.row_height)
    }
}

/// Declared height of data rows.
///
/// The engine never measures rows; it trusts whatever this returns.
pub enum RowHeight<R> {
    /// Every row has the same height
    Fixed(f32),
    /// Height derived from the row and its index
    PerRow(Rc<dyn Fn(&R, usize) -> f32>),
}

impl<R> Clone for RowHeight<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(h) => Self::Fixed(*h),
            Self::PerRow(f) => Self::PerRow(Rc::clone(f)),
        }
    }
}

impl<R> std::fmt::Debug for RowHeight<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(h) => f.debug_tuple("Fixed").field(h).finish(),
            Self::PerRow(_) => f.write_str("PerRow(..)"),
        }
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

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(config.header_row_height(), DEFAULT_ROW_HEIGHT);
        assert_eq!(config.overscan_row_count, 4);
        assert!(config.enable_virtualization);
        assert_eq!(config.direction, Direction::Ltr);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            GridConfig::from_json(r#"{"rowHeight": 58, "direction": "rtl", "overscanRowCount": 2}"#)
                .unwrap();
        assert_eq!(config.row_height, 58.0);
        assert_eq!(config.summary_row_height(), 58.0);
        assert_eq!(config.direction, Direction::Rtl);
        assert_eq!(config.overscan_row_count, 2);
        assert_eq!(config.default_column_options.min_width, DEFAULT_MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(GridConfig::from_json("{\"rowHeight\": \"tall\"}").is_err());
    }
}
