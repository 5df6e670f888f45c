//! Row composition: which columns a row emits and the row's own metadata.

use serde::Serialize;
use std::ops::Range;

use super::cell::{data_cell, summary_cell, CellView};
use super::header::{header_cell, HeaderSelection};
use super::RenderContext;
use crate::layout::Viewport;
use crate::span::row_segments;
use crate::types::{ColSpanArgs, GridRow, RowFlags, RowKey, RowRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Header,
    TopSummary,
    Row,
    BottomSummary,
}

/// A materialized row.
///
/// Data rows carry an absolute `top` in content coordinates. Header and top
/// summary rows stick to the top edge at `top`; bottom summary rows stick to
/// the bottom edge at `bottom`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub kind: RowKind,
    pub row_idx: i32,
    pub aria_row_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_key: Option<RowKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f32>,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_selected: Option<bool>,
    pub flags: RowFlags,
    pub cells: Vec<CellView>,
}

impl RowView {
    pub fn cell(&self, idx: usize) -> Option<&CellView> {
        self.cells.iter().find(|c| c.idx == idx)
    }

    /// Column indices of the emitted cells, in order.
    pub fn cell_indices(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.idx).collect()
    }
}

/// Sorted, disjoint column ranges to materialize: the frozen prefix, the
/// scrollable viewport range, and the active column when it falls outside both.
pub fn column_ranges(viewport: &Viewport, active_idx: Option<usize>) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(3);
    if viewport.frozen_count > 0 {
        ranges.push(0..viewport.frozen_count);
    }
    if let Some(idx) = active_idx.filter(|&i| !viewport.contains_col(i)) {
        ranges.push(idx..idx + 1);
    }
    if !viewport.cols.is_empty() {
        ranges.push(viewport.cols.clone());
    }
    ranges.sort_by_key(|r| r.start);
    ranges
}

/// Data rows to materialize: the viewport rows plus the active row.
pub fn materialized_rows(viewport: &Viewport, active_row: Option<usize>) -> Vec<usize> {
    let mut rows: Vec<usize> = viewport.rows.clone().collect();
    if let Some(row) = active_row.filter(|r| !viewport.rows.contains(r)) {
        let at = rows.partition_point(|&r| r < row);
        rows.insert(at, row);
    }
    rows
}

fn parity(row_idx: i32) -> RowFlags {
    if row_idx.rem_euclid(2) == 0 {
        RowFlags::EVEN
    } else {
        RowFlags::ODD
    }
}

pub(crate) fn header_row<R, SR>(
    ctx: &RenderContext<'_, R, SR>,
    ranges: &[Range<usize>],
    selection: HeaderSelection,
) -> RowView {
    let bounds = ctx.nav.bounds();
    let row_idx = bounds.header_row_idx();
    let cells = row_segments(ctx.nav.columns, ranges, &ColSpanArgs::Header)
        .into_iter()
        .filter_map(|segment| header_cell(ctx, row_idx, segment, selection))
        .collect();

    let mut flags = RowFlags::empty();
    if ctx.selection.active().is_some_and(|a| a.row_idx == row_idx) {
        flags |= RowFlags::ACTIVE;
    }

    RowView {
        kind: RowKind::Header,
        row_idx,
        aria_row_index: bounds.aria_row_index(row_idx),
        row_key: None,
        top: Some(0.0),
        bottom: None,
        height: ctx.config.header_row_height(),
        aria_selected: None,
        flags,
        cells,
    }
}

pub(crate) fn summary_row<R, SR>(
    ctx: &RenderContext<'_, R, SR>,
    region: RowRegion,
    ranges: &[Range<usize>],
) -> Option<RowView> {
    let bounds = ctx.nav.bounds();
    let row_idx = bounds.row_idx_of(region);
    let height = ctx.config.summary_row_height();
    let (row, kind, top, bottom, has_border) = match region {
        RowRegion::TopSummary(i) => (
            ctx.nav.top_summary_rows.get(i)?,
            RowKind::TopSummary,
            Some(ctx.config.header_row_height() + super::to_f32(i) * height),
            None,
            i + 1 == bounds.top_summary_rows,
        ),
        RowRegion::BottomSummary(j) => (
            ctx.nav.bottom_summary_rows.get(j)?,
            RowKind::BottomSummary,
            None,
            Some(super::to_f32(bounds.bottom_summary_rows.saturating_sub(j + 1)) * height),
            j == 0,
        ),
        RowRegion::Header | RowRegion::Row(_) => return None,
    };

    let args = ColSpanArgs::Summary { row };
    let cells = row_segments(ctx.nav.columns, ranges, &args)
        .into_iter()
        .filter_map(|segment| summary_cell(ctx, row, row_idx, segment))
        .collect();

    let mut flags = parity(row_idx) | RowFlags::SUMMARY;
    flags |= match kind {
        RowKind::TopSummary => RowFlags::TOP_SUMMARY,
        _ => RowFlags::BOTTOM_SUMMARY,
    };
    if has_border && ctx.config.show_summary_border {
        flags |= RowFlags::SUMMARY_BORDER;
    }
    if ctx.selection.active().is_some_and(|a| a.row_idx == row_idx) {
        flags |= RowFlags::ACTIVE;
    }

    Some(RowView {
        kind,
        row_idx,
        aria_row_index: bounds.aria_row_index(row_idx),
        row_key: None,
        top,
        bottom,
        height,
        aria_selected: None,
        flags,
        cells,
    })
}

/// A data row. The row being edited renders from its in-progress value.
pub(crate) fn data_row<R: GridRow, SR>(
    ctx: &RenderContext<'_, R, SR>,
    row_idx: usize,
    ranges: &[Range<usize>],
    content_top: f32,
) -> Option<RowView> {
    let nav = ctx.nav;
    let stored = nav.rows.get(row_idx)?;
    let row_idx_i32 = crate::types::to_i32(row_idx);
    let active = ctx.selection.active();

    let row = match ctx.selection.mode.editing_row() {
        Some(editing) if active.is_some_and(|a| a.row_idx == row_idx_i32) => editing,
        _ => stored,
    };

    let row_key = (nav.row_key)(stored, row_idx);
    let is_row_selected = nav.selected_rows.contains(&row_key);

    let args = ColSpanArgs::Row { row, row_idx };
    let cells = row_segments(nav.columns, ranges, &args)
        .into_iter()
        .filter_map(|segment| data_cell(ctx, row, row_idx, is_row_selected, segment))
        .collect();

    let mut flags = parity(row_idx_i32);
    if is_row_selected {
        flags |= RowFlags::SELECTED;
    }
    if active.is_some_and(|a| a.row_idx == row_idx_i32) {
        flags |= RowFlags::ACTIVE;
    }

    Some(RowView {
        kind: RowKind::Row,
        row_idx: row_idx_i32,
        aria_row_index: nav.bounds().aria_row_index(row_idx_i32),
        row_key: Some(row_key),
        top: Some(content_top + nav.offsets.row_top(row_idx)),
        bottom: None,
        height: nav.offsets.row_height(row_idx),
        aria_selected: Some(is_row_selected),
        flags,
        cells,
    })
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

    fn viewport(frozen_count: usize, cols: Range<usize>, rows: Range<usize>) -> Viewport {
        Viewport {
            rows: rows.clone(),
            cols: cols.clone(),
            frozen_count,
            visible_rows: rows,
            visible_cols: cols,
        }
    }

    #[test]
    fn test_column_ranges_include_frozen_prefix() {
        let vp = viewport(2, 4..7, 0..10);
        assert_eq!(column_ranges(&vp, None), vec![0..2, 4..7]);
        assert_eq!(column_ranges(&vp, Some(5)), vec![0..2, 4..7]);
        assert_eq!(column_ranges(&vp, Some(1)), vec![0..2, 4..7]);
    }

    #[test]
    fn test_column_ranges_keep_active_column() {
        let vp = viewport(2, 4..7, 0..10);
        assert_eq!(column_ranges(&vp, Some(2)), vec![0..2, 2..3, 4..7]);
        assert_eq!(column_ranges(&vp, Some(9)), vec![0..2, 4..7, 9..10]);
    }

    #[test]
    fn test_materialized_rows_keep_active_row() {
        let vp = viewport(0, 0..3, 10..14);
        assert_eq!(materialized_rows(&vp, None), vec![10, 11, 12, 13]);
        assert_eq!(materialized_rows(&vp, Some(2)), vec![2, 10, 11, 12, 13]);
        assert_eq!(materialized_rows(&vp, Some(40)), vec![10, 11, 12, 13, 40]);
        assert_eq!(materialized_rows(&vp, Some(12)), vec![10, 11, 12, 13]);
    }
}
