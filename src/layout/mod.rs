//! Layout engine: column resolution, row offsets and viewport calculation.
//!
//! This module handles:
//! - Resolving column definitions into widths and cumulative offsets
//! - Cumulative row offsets for uniform and per-row heights
//! - Deciding which rows and columns to materialize for a scroll position
//! - Binary search for cell lookup at content coordinates

mod columns;
mod row_offsets;
mod viewport;

pub use columns::{resolve_columns, CalculatedColumn, ColumnLayout};
pub use row_offsets::RowOffsets;
pub use viewport::{compute_viewport, scroll_into_view, ScrollMetrics, Viewport, ViewportOptions};
