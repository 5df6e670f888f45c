//! Row selection tests
//!
//! The selected-rows set is owned by the caller; the grid reports the next
//! set and renders whatever it is handed back.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::HashSet;

use common::{numbered_rows, px, TestGrid};
use gridview::types::{select_column, CellContent, RowFlags, SELECT_COLUMN_KEY};
use gridview::{json_row_key, Column, JsonRow, RowKey};

fn columns() -> Vec<Column<JsonRow, JsonRow>> {
    vec![select_column(), px("title", 120.0).editable()]
}

fn grid() -> TestGrid {
    TestGrid::new(columns(), numbered_rows(8, &["title"]))
}

fn keys(indices: &[usize]) -> HashSet<RowKey> {
    indices.iter().map(|&i| RowKey::from(i)).collect()
}

#[test]
fn test_shift_click_extends_from_last_toggled_row() {
    let mut grid = grid();
    grid.grid.toggle_row_selection(5, true, false);
    grid.sync();
    assert_eq!(*grid.grid.selected_rows(), keys(&[5]));

    grid.grid.toggle_row_selection(2, true, true);
    grid.sync();
    assert_eq!(*grid.grid.selected_rows(), keys(&[2, 3, 4, 5]));
}

#[test]
fn test_shift_uncheck_clears_range() {
    let mut grid = grid();
    grid.grid.toggle_all_rows(true);
    grid.sync();
    grid.grid.toggle_row_selection(1, false, false);
    grid.sync();
    grid.grid.toggle_row_selection(4, false, true);
    grid.sync();
    assert_eq!(*grid.grid.selected_rows(), keys(&[0, 5, 6, 7]));
}

#[test]
fn test_selection_is_controlled() {
    let mut grid = grid();
    grid.grid.toggle_row_selection(3, true, false);
    // Not synced: the caller has not stored the new set yet
    assert!(grid.grid.selected_rows().is_empty());
    assert_eq!(grid.events.borrow().selected_rows, vec![keys(&[3])]);
}

#[test]
fn test_shift_toggle_while_editing_is_ignored() {
    let mut grid = grid();
    grid.select(0, 1);
    grid.key("Enter");
    grid.grid.toggle_row_selection(4, true, true);
    assert!(grid.events.borrow().selected_rows.is_empty());
}

#[test]
fn test_toggle_all_and_header_state() {
    let mut grid = grid();
    grid.grid.toggle_row_selection(0, true, false);
    grid.sync();

    let frame = grid.render();
    let header = frame.header.cell(0).unwrap();
    assert_eq!(header.column_key, SELECT_COLUMN_KEY);
    assert!(matches!(
        header.content,
        CellContent::Checkbox {
            checked: false,
            indeterminate: true,
            ..
        }
    ));

    grid.grid.toggle_all_rows(true);
    grid.sync();
    let frame = grid.render();
    assert!(matches!(
        frame.header.cell(0).unwrap().content,
        CellContent::Checkbox {
            checked: true,
            indeterminate: false,
            ..
        }
    ));

    grid.grid.toggle_all_rows(false);
    grid.sync();
    assert!(grid.grid.selected_rows().is_empty());
}

#[test]
fn test_selected_rows_rendered() {
    let mut grid = grid();
    grid.grid.set_selected_rows(keys(&[1, 2]));
    let frame = grid.render();

    assert!(frame.aria_multiselectable);
    let row = &frame.rows[1];
    assert!(row.flags.contains(RowFlags::SELECTED));
    assert_eq!(row.aria_selected, Some(true));
    assert!(matches!(
        row.cell(0).unwrap().content,
        CellContent::Checkbox { checked: true, .. }
    ));
    assert!(!frame.rows[0].flags.contains(RowFlags::SELECTED));
    assert_eq!(frame.rows[0].aria_selected, Some(false));
}

#[test]
fn test_row_key_getter_drives_selection() {
    let mut grid = grid();
    grid.grid
        .set_row_key_getter(|row, idx| json_row_key(row, "title", idx));
    grid.grid.toggle_row_selection(2, true, false);
    grid.sync();
    assert_eq!(
        *grid.grid.selected_rows(),
        HashSet::from([RowKey::Str("title2".to_string())])
    );

    let frame = grid.render();
    assert_eq!(frame.rows[2].row_key, Some(RowKey::Str("title2".to_string())));
    assert!(frame.rows[2].flags.contains(RowFlags::SELECTED));
}

#[test]
fn test_removed_anchor_does_not_extend() {
    let mut grid = grid();
    grid.grid.toggle_row_selection(7, true, false);
    grid.sync();
    grid.grid.set_rows(numbered_rows(4, &["title"]));
    grid.grid.toggle_row_selection(1, true, true);
    grid.sync();
    assert_eq!(*grid.grid.selected_rows(), keys(&[1, 7]));
}
