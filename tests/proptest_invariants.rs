//! Property tests for the grid's universal invariants.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod common;

use std::collections::HashMap;
use std::rc::Rc;

use common::{numbered_rows, px_columns, TestGrid};
use gridview::config::DefaultColumnOptions;
use gridview::layout::{compute_viewport, resolve_columns, RowOffsets, ScrollMetrics, ViewportOptions};
use gridview::span::row_segments;
use gridview::types::ColSpanArgs;
use gridview::{Column, ColumnWidth, GridConfig};
use proptest::prelude::*;

fn layout_columns(widths: &[u16], frozen: usize) -> Vec<Rc<Column<()>>> {
    widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let column = Column::new(format!("c{i}"), "")
                .with_width(ColumnWidth::Px(f32::from(w)))
                .with_min_width(0.0);
            Rc::new(if i < frozen { column.frozen() } else { column })
        })
        .collect()
}

proptest! {
    /// Every row and column intersecting the visible rectangle is materialized,
    /// and overscan only adds.
    #[test]
    fn prop_viewport_has_no_false_negatives(
        heights in prop::collection::vec(10u16..80, 1..120),
        widths in prop::collection::vec(20u16..200, 1..16),
        frozen in 0usize..4,
        scroll_top_pct in 0u16..=100,
        scroll_left_pct in 0u16..=100,
        client_width in 1u16..1200,
        client_height in 1u16..900,
        overscan in 0usize..6,
    ) {
        let frozen = frozen.min(widths.len());
        let columns = layout_columns(&widths, frozen);
        let layout = resolve_columns(&columns, 0.0, &DefaultColumnOptions::default(), &HashMap::new()).unwrap();
        let offsets = RowOffsets::from_heights(heights.iter().map(|&h| f32::from(h)));

        let scroll_top = (offsets.total_height() * f32::from(scroll_top_pct) / 100.0).floor();
        let scroll_left = (layout.total_width * f32::from(scroll_left_pct) / 100.0).floor();
        let metrics = ScrollMetrics::new(scroll_top, scroll_left, f32::from(client_width), f32::from(client_height));

        let exact = compute_viewport(&metrics, &offsets, &layout, ViewportOptions {
            overscan_row_count: 0,
            overscan_column_count: 0,
            enable_virtualization: true,
        });
        let padded = compute_viewport(&metrics, &offsets, &layout, ViewportOptions {
            overscan_row_count: overscan,
            overscan_column_count: overscan,
            enable_virtualization: true,
        });

        let view_top = metrics.scroll_top;
        let view_bottom = view_top + metrics.client_height;
        for row in 0..offsets.len() {
            let top = offsets.row_top(row);
            let bottom = top + offsets.row_height(row);
            if top < view_bottom && bottom > view_top {
                prop_assert!(exact.rows.contains(&row), "row {} missing from {:?}", row, exact.rows);
            }
        }

        let view_left = metrics.scroll_left + layout.total_frozen_width;
        let view_right = metrics.scroll_left + metrics.client_width;
        for idx in frozen..layout.len() {
            let left = layout.col_positions[idx];
            let right = layout.col_positions[idx + 1];
            if left < view_right && right > view_left {
                prop_assert!(exact.cols.contains(&idx), "column {} missing from {:?}", idx, exact.cols);
            }
        }

        prop_assert_eq!(exact.frozen_count, frozen);
        prop_assert!(padded.rows.start <= exact.rows.start && padded.rows.end >= exact.rows.end);
        prop_assert!(padded.cols.start <= exact.cols.start && padded.cols.end >= exact.cols.end);
        prop_assert!(padded.cols.start >= frozen);
    }

    /// Spans stay inside the grid and never cross the frozen boundary.
    #[test]
    fn prop_span_containment(
        requests in prop::collection::vec(-3i32..15, 1..14),
        frozen in 0usize..5,
    ) {
        let frozen = frozen.min(requests.len());
        let columns: Vec<_> = requests
            .iter()
            .enumerate()
            .map(|(i, &span)| {
                let column = Column::<()>::new(format!("c{i}"), "")
                    .with_width(ColumnWidth::Px(50.0))
                    .with_col_span(move |_| Some(span));
                Rc::new(if i < frozen { column.frozen() } else { column })
            })
            .collect();
        let layout = resolve_columns(&columns, 0.0, &DefaultColumnOptions::default(), &HashMap::new()).unwrap();

        let args = ColSpanArgs::Row { row: &(), row_idx: 0 };
        let segments = row_segments(&layout, &[0..frozen, frozen..layout.len()], &args);

        let mut next = 0;
        for segment in &segments {
            prop_assert!(segment.span >= 1);
            prop_assert!(segment.idx >= next, "overlapping segments {:?}", segments);
            prop_assert!(segment.end() <= layout.len());
            if segment.idx < frozen {
                prop_assert!(segment.end() <= frozen, "span crosses frozen boundary: {:?}", segment);
            }
            next = segment.end();
        }
        // Every column is covered exactly once
        prop_assert_eq!(next, layout.len());
    }

    /// Moving up from the first row or right from the last column is a no-op.
    #[test]
    fn prop_navigation_clamps(
        row_count in 1usize..20,
        col_count in 1usize..8,
        row in 0usize..20,
        col in 0usize..8,
    ) {
        let row = i32::try_from(row.min(row_count - 1)).unwrap();
        let col = col.min(col_count - 1);
        let last_col = col_count - 1;
        let mut grid = TestGrid::new(px_columns(col_count, 80.0), numbered_rows(row_count, &[]));

        // The header is the first row of the sequence
        grid.select(-1, col);
        grid.key("ArrowUp");
        prop_assert_eq!(grid.active(), Some((-1, col)));

        grid.select(row, last_col);
        grid.key("ArrowRight");
        prop_assert_eq!(grid.active(), Some((row, last_col)));

        let last_row = i32::try_from(row_count).unwrap() - 1;
        grid.select(last_row, col);
        grid.key("ArrowDown");
        prop_assert_eq!(grid.active(), Some((last_row, col)));

        // Tab wraps where arrows do not
        if row < last_row {
            grid.select(row, last_col);
            grid.key("Tab");
            prop_assert_eq!(grid.active(), Some((row + 1, 0)));
        }
    }
}

#[derive(Debug, Clone)]
enum Action {
    Select(i32, usize),
    Key(&'static str),
    Scroll(u16, u16),
    FocusActive,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (-1i32..200, 0usize..12).prop_map(|(r, c)| Action::Select(r, c)),
        prop::sample::select(vec![
            "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "PageDown", "PageUp", "Home", "End", "Tab",
        ])
        .prop_map(Action::Key),
        (0u16..8000, 0u16..900).prop_map(|(t, l)| Action::Scroll(t, l)),
        Just(Action::FocusActive),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Exactly one tab stop (a cell or the grid itself) across any sequence
    /// of selection, navigation and scrolling, including selections that
    /// land inside a span.
    #[test]
    fn prop_single_tab_stop(actions in prop::collection::vec(action(), 1..40)) {
        // Column 1 spans three columns on even rows
        let mut columns = px_columns(12, 100.0);
        let spanning = columns.remove(1).with_col_span(|args| match args {
            ColSpanArgs::Row { row_idx, .. } if row_idx % 2 == 0 => Some(3),
            _ => None,
        });
        columns.insert(1, spanning);
        let mut grid = TestGrid::with_config(
            columns,
            numbered_rows(200, &[]),
            GridConfig::default(),
            (400.0, 385.0),
        );

        for action in actions {
            match action {
                Action::Select(r, c) => grid.select(r, c),
                Action::Key(key) => {
                    grid.key(key);
                }
                Action::Scroll(top, left) => grid.grid.handle_scroll(f32::from(top), f32::from(left)),
                Action::FocusActive => {
                    if let Some(active) = grid.grid.active_cell() {
                        grid.grid.handle_cell_focus(active, false);
                    }
                }
            }
            let frame = grid.render();
            prop_assert_eq!(frame.tab_stop_count(), 1);
            if let Some(active) = frame.active {
                prop_assert!(frame.cell(active).is_some_and(|c| c.is_tab_stop()));
                prop_assert_eq!(frame.grid_tab_index, -1);
            } else {
                prop_assert_eq!(frame.grid_tab_index, 0);
            }
        }
    }
}
