//! Viewport calculation: which rows and columns must be materialized.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::{ColumnLayout, RowOffsets};

/// Scroll state of the grid's scroll container, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_left: f32,
    pub client_width: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_left: f32, client_width: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_left,
            client_width,
            client_height,
        }
    }
}

/// Overscan and virtualization switches for [`compute_viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportOptions {
    pub overscan_row_count: usize,
    pub overscan_column_count: usize,
    pub enable_virtualization: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            overscan_row_count: crate::config::DEFAULT_OVERSCAN_ROW_COUNT,
            overscan_column_count: 0,
            enable_virtualization: true,
        }
    }
}

/// Index ranges to materialize for one scroll position.
///
/// All ranges are half-open. `cols` covers scrollable columns only; the
/// frozen prefix `0..frozen_count` is always materialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Data rows, overscan included
    pub rows: Range<usize>,
    /// Scrollable columns, overscan included
    pub cols: Range<usize>,
    pub frozen_count: usize,
    /// Data rows intersecting the visible rectangle
    pub visible_rows: Range<usize>,
    /// Scrollable columns intersecting the visible rectangle
    pub visible_cols: Range<usize>,
}

impl Viewport {
    pub fn row_overscan_start_idx(&self) -> usize {
        self.rows.start
    }

    /// Exclusive end of the materialized rows.
    pub fn row_overscan_end_idx(&self) -> usize {
        self.rows.end
    }

    pub fn col_overscan_start_idx(&self) -> usize {
        self.cols.start
    }

    /// Exclusive end of the materialized columns.
    pub fn col_overscan_end_idx(&self) -> usize {
        self.cols.end
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn contains_col(&self, idx: usize) -> bool {
        idx < self.frozen_count || self.cols.contains(&idx)
    }

    /// Frozen columns followed by the scrollable range.
    pub fn column_indices(&self) -> impl Iterator<Item = usize> {
        (0..self.frozen_count).chain(self.cols.clone())
    }
}

fn expand(visible: &Range<usize>, overscan: usize, floor: usize, count: usize) -> Range<usize> {
    let start = visible.start.saturating_sub(overscan).max(floor);
    let end = visible.end.saturating_add(overscan).min(count);
    start..end.max(start)
}

fn visible_rows(offsets: &RowOffsets, top: f32, height: f32) -> Range<usize> {
    let count = offsets.len();
    if count == 0 {
        return 0..0;
    }
    let start = offsets
        .first_row_ending_after(top)
        .unwrap_or(count - 1);
    let end = offsets
        .last_row_starting_before(top + height)
        .filter(|&end| end >= start)
        .map_or(start, |end| end + 1);
    start..end
}

fn visible_cols<R, SR>(columns: &ColumnLayout<R, SR>, start_x: f32, end_x: f32) -> Range<usize> {
    let count = columns.len();
    let frozen = columns.frozen_count();
    if frozen >= count {
        return count..count;
    }
    let rights = columns.col_positions.get(frozen + 1..=count).unwrap_or_default();
    let lefts = columns.col_positions.get(frozen..count).unwrap_or_default();

    let start = (frozen + rights.partition_point(|&right| right <= start_x)).min(count - 1);
    let end = lefts
        .partition_point(|&left| left < end_x)
        .checked_sub(1)
        .map(|k| frozen + k)
        .filter(|&end| end >= start)
        .map_or(start, |end| end + 1);
    start..end
}

/// Compute the materialized ranges for a scroll position.
///
/// `metrics.client_height` is the height available to data rows (sticky
/// header and summary rows excluded). Every row and column whose box
/// intersects the visible rectangle is included; overscan only adds.
pub fn compute_viewport<R, SR>(
    metrics: &ScrollMetrics,
    offsets: &RowOffsets,
    columns: &ColumnLayout<R, SR>,
    options: ViewportOptions,
) -> Viewport {
    let _span = tracing::debug_span!(
        "compute_viewport",
        scroll_top = metrics.scroll_top,
        scroll_left = metrics.scroll_left
    )
    .entered();

    let row_count = offsets.len();
    let col_count = columns.len();
    let frozen_count = columns.frozen_count().min(col_count);

    if !options.enable_virtualization {
        return Viewport {
            rows: 0..row_count,
            cols: frozen_count..col_count,
            frozen_count,
            visible_rows: 0..row_count,
            visible_cols: frozen_count..col_count,
        };
    }

    let scroll_top = metrics.scroll_top.max(0.0);
    let scroll_left = metrics.scroll_left.max(0.0);
    let height = metrics.client_height.max(0.0);

    let visible_rows = visible_rows(offsets, scroll_top, height);
    let rows = expand(&visible_rows, options.overscan_row_count, 0, row_count);

    // Scrollable columns slide underneath the frozen block
    let start_x = scroll_left + columns.total_frozen_width;
    let end_x = scroll_left + metrics.client_width.max(0.0);
    let visible_cols = visible_cols(columns, start_x, end_x);
    let cols = expand(
        &visible_cols,
        options.overscan_column_count,
        frozen_count,
        col_count,
    );

    tracing::trace!(?rows, ?cols, frozen_count, "viewport computed");

    Viewport {
        rows,
        cols,
        frozen_count,
        visible_rows,
        visible_cols,
    }
}

/// Minimal scroll offsets that bring a data row and/or column into view.
///
/// Frozen columns never need horizontal scrolling. `metrics.client_height`
/// has the same meaning as in [`compute_viewport`].
pub fn scroll_into_view<R, SR>(
    metrics: &ScrollMetrics,
    offsets: &RowOffsets,
    columns: &ColumnLayout<R, SR>,
    row: Option<usize>,
    col: Option<usize>,
) -> ScrollMetrics {
    let mut next = *metrics;

    if let Some(row) = row.filter(|&r| r < offsets.len()) {
        let top = offsets.row_top(row);
        let bottom = top + offsets.row_height(row);
        if top < next.scroll_top {
            next.scroll_top = top;
        } else if bottom > next.scroll_top + next.client_height {
            next.scroll_top = (bottom - next.client_height).max(0.0);
        }
    }

    if let Some(column) = col.and_then(|idx| columns.get(idx)).filter(|c| !c.frozen) {
        let view_left = next.scroll_left + columns.total_frozen_width;
        let view_right = next.scroll_left + next.client_width;
        if column.left < view_left {
            next.scroll_left = (column.left - columns.total_frozen_width).max(0.0);
        } else if column.right() > view_right {
            next.scroll_left = (column.right() - next.client_width).max(0.0);
        }
    }

    next
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
    use crate::config::DefaultColumnOptions;
    use crate::layout::resolve_columns;
    use crate::types::{Column, ColumnWidth};
    use std::collections::HashMap;
    use std::rc::Rc;

    fn layout(frozen: &[f32], scrollable: &[f32]) -> ColumnLayout<()> {
        let mut columns = Vec::new();
        for (i, w) in frozen.iter().enumerate() {
            columns.push(Rc::new(
                Column::new(format!("f{i}"), "")
                    .with_width(ColumnWidth::Px(*w))
                    .with_min_width(0.0)
                    .frozen(),
            ));
        }
        for (i, w) in scrollable.iter().enumerate() {
            columns.push(Rc::new(
                Column::new(format!("c{i}"), "")
                    .with_width(ColumnWidth::Px(*w))
                    .with_min_width(0.0),
            ));
        }
        resolve_columns(&columns, 0.0, &DefaultColumnOptions::default(), &HashMap::new()).unwrap()
    }

    fn options(overscan_rows: usize) -> ViewportOptions {
        ViewportOptions {
            overscan_row_count: overscan_rows,
            ..ViewportOptions::default()
        }
    }

    #[test]
    fn test_rows_at_top_with_overscan() {
        let offsets = RowOffsets::uniform(35.0, 100);
        let columns = layout(&[], &[100.0]);
        let vp = compute_viewport(
            &ScrollMetrics::new(0.0, 0.0, 500.0, 350.0),
            &offsets,
            &columns,
            options(2),
        );
        assert_eq!(vp.visible_rows, 0..10);
        assert_eq!(vp.rows, 0..12);
        assert_eq!(vp.row_overscan_start_idx(), 0);
        assert_eq!(vp.row_overscan_end_idx(), 12);
    }

    #[test]
    fn test_rows_partially_visible_are_included() {
        let offsets = RowOffsets::uniform(35.0, 100);
        let columns = layout(&[], &[100.0]);
        let vp = compute_viewport(
            &ScrollMetrics::new(50.0, 0.0, 500.0, 100.0),
            &offsets,
            &columns,
            options(0),
        );
        // 50..150 intersects rows 1 (35..70) through 4 (140..175)
        assert_eq!(vp.visible_rows, 1..5);
        assert_eq!(vp.rows, 1..5);
    }

    #[test]
    fn test_rows_clamped_at_bottom() {
        let offsets = RowOffsets::uniform(35.0, 20);
        let columns = layout(&[], &[100.0]);
        let vp = compute_viewport(
            &ScrollMetrics::new(5000.0, 0.0, 500.0, 350.0),
            &offsets,
            &columns,
            options(4),
        );
        assert_eq!(vp.rows.end, 20);
        assert!(vp.rows.contains(&19));
    }

    #[test]
    fn test_frozen_columns_always_included() {
        let columns = layout(&[80.0, 80.0], &[100.0; 5]);
        let offsets = RowOffsets::uniform(35.0, 10);
        let vp = compute_viewport(
            &ScrollMetrics::new(0.0, 250.0, 400.0, 350.0),
            &offsets,
            &columns,
            options(0),
        );
        assert_eq!(vp.frozen_count, 2);
        assert_eq!(vp.col_overscan_start_idx(), 4);
        assert!(vp.contains_col(0));
        assert!(vp.contains_col(1));
        assert!(!vp.contains_col(3));
        let indices: Vec<usize> = vp.column_indices().collect();
        assert_eq!(indices[..3], [0, 1, 4]);
    }

    #[test]
    fn test_column_overscan_stays_right_of_frozen() {
        let columns = layout(&[80.0], &[100.0; 5]);
        let offsets = RowOffsets::uniform(35.0, 10);
        let vp = compute_viewport(
            &ScrollMetrics::new(0.0, 0.0, 300.0, 350.0),
            &offsets,
            &columns,
            ViewportOptions {
                overscan_column_count: 3,
                ..ViewportOptions::default()
            },
        );
        assert_eq!(vp.cols.start, 1);
        assert_eq!(vp.visible_cols, 1..4);
        assert_eq!(vp.cols, 1..6);
    }

    #[test]
    fn test_virtualization_disabled() {
        let columns = layout(&[80.0], &[100.0; 5]);
        let offsets = RowOffsets::uniform(35.0, 1000);
        let vp = compute_viewport(
            &ScrollMetrics::new(900.0, 200.0, 300.0, 100.0),
            &offsets,
            &columns,
            ViewportOptions {
                enable_virtualization: false,
                ..ViewportOptions::default()
            },
        );
        assert_eq!(vp.rows, 0..1000);
        assert_eq!(vp.cols, 1..6);
    }

    #[test]
    fn test_empty_grid() {
        let columns = layout(&[], &[]);
        let vp = compute_viewport(
            &ScrollMetrics::new(0.0, 0.0, 300.0, 100.0),
            &RowOffsets::default(),
            &columns,
            ViewportOptions::default(),
        );
        assert!(vp.rows.is_empty());
        assert!(vp.cols.is_empty());
    }

    #[test]
    fn test_scroll_into_view() {
        let columns = layout(&[80.0], &[100.0; 5]);
        let offsets = RowOffsets::uniform(35.0, 100);
        let metrics = ScrollMetrics::new(0.0, 0.0, 300.0, 350.0);

        let next = scroll_into_view(&metrics, &offsets, &columns, Some(20), None);
        assert_eq!(next.scroll_top, 21.0 * 35.0 - 350.0);

        let next = scroll_into_view(&next, &offsets, &columns, Some(2), None);
        assert_eq!(next.scroll_top, 70.0);

        // Column 4 spans 380..480; visible x is 80..300
        let next = scroll_into_view(&metrics, &offsets, &columns, None, Some(4));
        assert_eq!(next.scroll_left, 180.0);

        let back = scroll_into_view(&next, &offsets, &columns, None, Some(1));
        assert_eq!(back.scroll_left, 0.0);

        // Frozen columns never scroll
        let same = scroll_into_view(&next, &offsets, &columns, None, Some(0));
        assert_eq!(same.scroll_left, 180.0);
    }
}
