//! Pointer event tests
//!
//! Click, double-click and context menu, with caller hooks that can take
//! over the grid's default handling.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{numbered_rows, px, TestGrid};
use gridview::{CellPosition, Column, JsonRow, SelectionKind};

fn columns() -> Vec<Column<JsonRow, JsonRow>> {
    vec![px("id", 60.0), px("title", 120.0).editable()]
}

fn grid() -> TestGrid {
    TestGrid::new(columns(), numbered_rows(5, &["title"]))
}

#[test]
fn test_click_selects_without_editing() {
    let mut grid = grid();
    grid.grid.handle_cell_click(CellPosition::new(2, 1));
    assert_eq!(grid.active(), Some((2, 1)));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
}

#[test]
fn test_context_menu_selects() {
    let mut grid = grid();
    grid.grid.handle_cell_context_menu(CellPosition::new(3, 0));
    assert_eq!(grid.active(), Some((3, 0)));
}

#[test]
fn test_click_hook_sees_row_and_column() {
    let mut grid = grid();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    grid.grid.on_cell_click(move |args, _| {
        let id = args.row.get("id").cloned();
        sink.borrow_mut()
            .push((args.row_idx, args.column_key.to_string(), id));
    });

    grid.grid.handle_cell_click(CellPosition::new(4, 1));
    assert_eq!(
        *seen.borrow(),
        vec![(4, "title".to_string(), Some(serde_json::json!(4)))]
    );
}

#[test]
fn test_prevented_click_keeps_selection() {
    let mut grid = grid();
    grid.select(0, 0);
    grid.grid
        .on_cell_click(|_, event| event.prevent_grid_default());
    grid.grid.handle_cell_click(CellPosition::new(3, 1));
    assert_eq!(grid.active(), Some((0, 0)));
}

#[test]
fn test_hook_can_open_editor_on_single_click() {
    let mut grid = grid();
    grid.grid.on_cell_click(|args, event| {
        if args.column_key == "title" {
            event.select_cell(true);
        }
    });
    grid.grid.handle_cell_click(CellPosition::new(1, 1));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);

    grid.grid.handle_cell_click(CellPosition::new(1, 0));
    assert_eq!(grid.active(), Some((1, 0)));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
}

#[test]
fn test_prevented_double_click_does_not_edit() {
    let mut grid = grid();
    grid.grid
        .on_cell_double_click(|_, event| event.prevent_grid_default());
    grid.grid.handle_cell_double_click(CellPosition::new(1, 1));
    assert_eq!(grid.active(), None);
}

#[test]
fn test_header_click_skips_hooks() {
    let mut grid = grid();
    let calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&calls);
    grid.grid.on_cell_click(move |_, _| *sink.borrow_mut() += 1);
    grid.grid.handle_cell_click(CellPosition::new(-1, 1));
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(grid.active(), Some((-1, 1)));
}

#[test]
fn test_clicking_elsewhere_commits_edit() {
    let mut grid = grid();
    grid.grid.handle_cell_double_click(CellPosition::new(2, 1));
    grid.grid.editor_text_input("clicked away");
    grid.grid.handle_cell_click(CellPosition::new(0, 0));
    grid.sync();

    assert_eq!(grid.active(), Some((0, 0)));
    assert_eq!(
        grid.grid.rows()[2].get("title"),
        Some(&serde_json::json!("clicked away"))
    );
}
