//! Keyboard navigation tests
//!
//! Arrow keys clamp at the grid edges, Tab wraps between rows, and the
//! header and summary rows take part in the row sequence.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{numbered_rows, px_columns, row, TestGrid};
use gridview::config::Direction;
use gridview::selection::KeyInput;
use gridview::{CellPosition, GridConfig, SelectionKind};
use serde_json::json;
use test_case::test_case;

/// Five columns, ten data rows.
fn grid() -> TestGrid {
    TestGrid::new(px_columns(5, 100.0), numbered_rows(10, &[]))
}

#[test]
fn test_arrow_down_moves_and_clamps_at_last_row() {
    let mut grid = grid();
    grid.select(3, 2);
    assert!(grid.key("ArrowDown"));
    assert_eq!(grid.active(), Some((4, 2)));

    grid.select(9, 2);
    grid.key("ArrowDown");
    assert_eq!(grid.active(), Some((9, 2)));
}

#[test]
fn test_up_from_first_row_is_unchanged() {
    let mut grid = grid();
    grid.select(0, 1);
    grid.key("ArrowUp");
    // The header row is the first row of the sequence
    assert_eq!(grid.active(), Some((-1, 1)));
    grid.key("ArrowUp");
    assert_eq!(grid.active(), Some((-1, 1)));
}

#[test]
fn test_right_from_last_column_does_not_wrap() {
    let mut grid = grid();
    grid.select(2, 4);
    grid.key("ArrowRight");
    assert_eq!(grid.active(), Some((2, 4)));
    grid.select(2, 0);
    grid.key("ArrowLeft");
    assert_eq!(grid.active(), Some((2, 0)));
}

#[test]
fn test_tab_wraps_to_next_row() {
    let mut grid = grid();
    grid.select(2, 4);
    grid.key("Tab");
    assert_eq!(grid.active(), Some((3, 0)));
    grid.press(KeyInput::new("Tab").with_shift());
    assert_eq!(grid.active(), Some((2, 4)));
}

#[test]
fn test_tab_at_last_cell_releases_focus() {
    let mut grid = grid();
    grid.select(9, 4);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(9, 4), false);

    // The browser default must run so focus can leave the grid
    assert!(!grid.key("Tab"));
    assert_eq!(grid.active(), Some((9, 4)));
    assert!(!grid.grid.focus().has_focus());
}

#[test]
fn test_shift_tab_at_first_cell_leaves_key_to_browser() {
    let mut grid = grid();
    grid.select(-1, 0);
    grid.grid.handle_cell_focus(CellPosition::new(-1, 0), false);

    assert!(!grid.press(KeyInput::new("Tab").with_shift()));
    assert_eq!(grid.active(), Some((-1, 0)));
    assert!(!grid.grid.focus().has_focus());

    // Inside the grid Tab is still consumed
    grid.select(4, 2);
    assert!(grid.key("Tab"));
    assert!(grid.press(KeyInput::new("Tab").with_shift()));
}

#[test_case("Home", false => (4, 0); "home")]
#[test_case("End", false => (4, 4); "end")]
#[test_case("Home", true => (-1, 0); "ctrl home")]
#[test_case("End", true => (9, 4); "ctrl end")]
fn test_home_end(key: &str, ctrl: bool) -> (i32, usize) {
    let mut grid = grid();
    grid.select(4, 2);
    let mut input = KeyInput::new(key);
    input.ctrl = ctrl;
    grid.press(input);
    grid.active().unwrap()
}

#[test]
fn test_page_down_and_up_move_one_viewport() {
    // 35px header, 350px for ten 35px rows per page
    let mut grid = TestGrid::with_config(
        px_columns(3, 100.0),
        numbered_rows(100, &[]),
        GridConfig::default(),
        (300.0, 385.0),
    );
    grid.select(0, 1);
    grid.key("PageDown");
    assert_eq!(grid.active(), Some((10, 1)));
    grid.key("PageDown");
    assert_eq!(grid.active(), Some((20, 1)));
    // Paging up keeps the current row's bottom edge on the page
    grid.key("PageUp");
    assert_eq!(grid.active(), Some((11, 1)));

    grid.select(95, 1);
    grid.key("PageDown");
    assert_eq!(grid.active(), Some((99, 1)));
    grid.select(3, 1);
    grid.key("PageUp");
    assert_eq!(grid.active(), Some((0, 1)));
}

#[test]
fn test_rtl_swaps_arrows() {
    let config = GridConfig {
        direction: Direction::Rtl,
        ..GridConfig::default()
    };
    let mut grid = TestGrid::with_config(
        px_columns(5, 100.0),
        numbered_rows(3, &[]),
        config,
        (800.0, 600.0),
    );
    grid.select(1, 2);
    grid.key("ArrowLeft");
    assert_eq!(grid.active(), Some((1, 3)));
    grid.key("ArrowRight");
    assert_eq!(grid.active(), Some((1, 2)));
}

#[test]
fn test_summary_rows_in_sequence() {
    let mut grid = grid();
    grid.grid.set_top_summary_rows(vec![row(json!({"c0": "top"}))]);
    grid.grid.set_bottom_summary_rows(vec![row(json!({"c0": "bottom"}))]);

    // header -2, top summary -1, data 0..10, bottom summary 10
    grid.select(0, 0);
    grid.key("ArrowUp");
    assert_eq!(grid.active(), Some((-1, 0)));
    grid.key("ArrowUp");
    assert_eq!(grid.active(), Some((-2, 0)));

    grid.select(9, 0);
    grid.key("ArrowDown");
    assert_eq!(grid.active(), Some((10, 0)));
    grid.key("ArrowDown");
    assert_eq!(grid.active(), Some((10, 0)));
}

#[test]
fn test_out_of_bounds_select_is_ignored() {
    let mut grid = grid();
    grid.select(2, 2);
    grid.grid.select_cell(CellPosition::new(50, 0), false);
    assert_eq!(grid.active(), Some((2, 2)));
    grid.grid.select_cell(CellPosition::new(0, 9), false);
    assert_eq!(grid.active(), Some((2, 2)));
}

#[test]
fn test_keys_without_active_cell_are_ignored() {
    let mut grid = grid();
    // Left to the browser, so Tab can move focus past the grid
    assert!(!grid.key("ArrowDown"));
    assert!(!grid.key("Tab"));
    assert!(!grid.key("Enter"));
    assert_eq!(grid.active(), None);
    assert_eq!(grid.grid.selection_kind(), SelectionKind::None);
}

#[test]
fn test_selected_cell_change_reported_once_per_move() {
    let mut grid = grid();
    grid.select(0, 0);
    grid.key("ArrowRight");
    grid.key("ArrowRight");
    grid.select(0, 2);
    assert_eq!(
        grid.events.borrow().selected_cells,
        vec![
            Some(CellPosition::new(0, 0)),
            Some(CellPosition::new(0, 1)),
            Some(CellPosition::new(0, 2)),
        ]
    );
}

#[test]
fn test_controlled_selected_cell() {
    let mut grid = grid();
    grid.grid.set_selected_cell(Some(CellPosition::new(5, 3)));
    assert_eq!(grid.active(), Some((5, 3)));
    grid.grid.set_selected_cell(Some(CellPosition::new(99, 3)));
    assert_eq!(grid.active(), None);
}
