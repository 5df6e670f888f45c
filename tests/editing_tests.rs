//! Cell editing tests
//!
//! Opening, committing and cancelling edits, and the row updates they
//! produce.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{numbered_rows, px, TestGrid};
use gridview::selection::KeyInput;
use gridview::types::{CellContent, CellFlags, EditorOptions};
use gridview::{json_row_key, CellPosition, Column, JsonRow, RowKey, SelectionKind};
use serde_json::json;

/// `id` (read-only), `title` and `note` (editable).
fn columns() -> Vec<Column<JsonRow, JsonRow>> {
    vec![
        px("id", 60.0),
        px("title", 120.0).editable(),
        px("note", 120.0).editable(),
    ]
}

fn grid() -> TestGrid {
    TestGrid::new(columns(), numbered_rows(5, &["title", "note"]))
}

#[test]
fn test_enter_type_blur_commits_once() {
    let mut grid = grid();
    grid.select(2, 1);
    grid.key("Enter");
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);

    grid.grid.editor_text_input("Renamed");
    grid.grid.handle_editor_blur();
    grid.sync();

    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert_eq!(grid.active(), Some((2, 1)));

    let events = grid.events.borrow();
    assert_eq!(events.rows_changes.len(), 1);
    let (rows, data) = &events.rows_changes[0];
    assert_eq!(data.indexes, vec![2]);
    assert_eq!(data.column_key.as_deref(), Some("title"));

    // New value merged into the otherwise unmodified row
    let expected = common::row(json!({"id": 2, "title": "Renamed", "note": "note2"}));
    assert_eq!(rows[2], expected);
    assert_eq!(rows[1], numbered_rows(5, &["title", "note"])[1]);

    assert_eq!(events.row_changes.len(), 1);
    assert_eq!(events.row_changes[0].row_key, RowKey::from(2_usize));
}

#[test]
fn test_committed_value_is_rendered_after_sync() {
    let mut grid = grid();
    grid.select(0, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("Done");
    grid.key("Enter");

    // Enter commits and moves down
    assert_eq!(grid.active(), Some((1, 1)));
    let frame = grid.render();
    assert_eq!(
        frame.cell(CellPosition::new(0, 1)).unwrap().content,
        CellContent::text("Done")
    );
}

#[test]
fn test_escape_discards_edit() {
    let mut grid = grid();
    grid.select(1, 2);
    grid.key("Enter");
    grid.grid.editor_text_input("scratch");
    grid.key("Escape");

    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert!(grid.events.borrow().rows_changes.is_empty());
    assert_eq!(grid.grid.rows()[1].get("note"), Some(&json!("note1")));
}

#[test]
fn test_unchanged_edit_skips_row_update() {
    let mut grid = grid();
    grid.select(1, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("title1");
    grid.key("Enter");
    assert!(grid.events.borrow().rows_changes.is_empty());
}

#[test]
fn test_typing_opens_editor_with_typed_text() {
    let mut grid = grid();
    grid.select(3, 1);
    assert!(grid.key("x"));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);

    let frame = grid.render();
    let cell = frame.cell(CellPosition::new(3, 1)).unwrap();
    assert!(cell.flags.contains(CellFlags::EDITING));
    assert_eq!(
        cell.content,
        CellContent::TextEditor {
            value: "x".to_string()
        }
    );
}

#[test]
fn test_read_only_cell_does_not_open_editor() {
    let mut grid = grid();
    grid.select(1, 0);
    grid.key("Enter");
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert!(!grid.key("x"));

    let frame = grid.render();
    assert_eq!(
        frame.cell(CellPosition::new(1, 0)).unwrap().aria_readonly,
        Some(true)
    );
}

#[test]
fn test_tab_while_editing_commits_and_moves() {
    let mut grid = grid();
    grid.select(0, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("tabbed");
    grid.key("Tab");

    assert_eq!(grid.active(), Some((0, 2)));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert_eq!(grid.grid.rows()[0].get("title"), Some(&json!("tabbed")));
}

#[test]
fn test_blur_discards_without_commit_on_outside_click() {
    let columns = vec![
        px("id", 60.0),
        px("title", 120.0)
            .editable()
            .with_editor_options(EditorOptions {
                commit_on_outside_click: false,
            }),
    ];
    let mut grid = TestGrid::new(columns, numbered_rows(3, &["title"]));
    grid.select(0, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("lost");
    grid.grid.handle_editor_blur();

    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert!(grid.events.borrow().rows_changes.is_empty());
}

#[test]
fn test_conditionally_editable_column() {
    let columns = vec![
        px("id", 60.0),
        px("title", 120.0).editable_when(|row: &JsonRow| {
            row.get("id").and_then(serde_json::Value::as_u64) != Some(1)
        }),
    ];
    let mut grid = TestGrid::new(columns, numbered_rows(3, &["title"]));
    grid.select(1, 1);
    grid.key("Enter");
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    grid.select(2, 1);
    grid.key("Enter");
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);
}

#[test]
fn test_double_click_opens_editor() {
    let mut grid = grid();
    grid.grid.handle_cell_double_click(CellPosition::new(4, 2));
    assert_eq!(grid.active(), Some((4, 2)));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);
}

#[test]
fn test_editor_row_change_with_commit() {
    let mut grid = grid();
    grid.select(2, 2);
    grid.key("F2");
    let mut row = grid.grid.selection().mode.editing_row().unwrap().clone();
    row.insert("note".to_string(), json!("from editor"));
    row.insert("title".to_string(), json!("also"));
    grid.grid.editor_row_change(row, true);
    grid.sync();

    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert_eq!(grid.grid.rows()[2].get("note"), Some(&json!("from editor")));
    assert_eq!(grid.grid.rows()[2].get("title"), Some(&json!("also")));
}

#[test]
fn test_typed_text_is_parsed() {
    let mut grid = grid();
    grid.select(0, 2);
    grid.key("Enter");
    grid.grid.editor_text_input("42");
    grid.key("Enter");
    grid.select(1, 2);
    grid.key("Enter");
    grid.grid.editor_text_input("TRUE");
    grid.key("Enter");

    assert_eq!(grid.grid.rows()[0].get("note"), Some(&json!(42.0)));
    assert_eq!(grid.grid.rows()[1].get("note"), Some(&json!(true)));
}

#[test]
fn test_ctrl_keys_do_not_open_editor() {
    let mut grid = grid();
    grid.select(0, 1);
    grid.press(KeyInput::new("c").with_ctrl());
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
}

#[test]
fn test_tab_from_last_cell_commits_and_releases_key() {
    let mut grid = grid();
    grid.select(4, 2);
    grid.key("Enter");
    grid.grid.editor_text_input("last");

    assert!(!grid.key("Tab"));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);
    assert_eq!(grid.active(), Some((4, 2)));

    let events = grid.events.borrow();
    assert_eq!(events.rows_changes.len(), 1);
    assert_eq!(events.rows_changes[0].1.indexes, vec![4]);
}

#[test]
fn test_edit_follows_row_when_rows_are_reordered() {
    let mut grid = TestGrid::new(columns(), numbered_rows(3, &["title", "note"]));
    grid.grid
        .set_row_key_getter(|row, idx| json_row_key(row, "id", idx));
    grid.select(0, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("EDITED");

    let mut reversed = numbered_rows(3, &["title", "note"]);
    reversed.reverse();
    grid.grid.set_rows(reversed.clone());

    // Row id 0 now sits at index 2 and the editor moved with it
    assert_eq!(grid.active(), Some((2, 1)));
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Editing);

    grid.grid.handle_editor_blur();
    grid.sync();

    let events = grid.events.borrow();
    assert_eq!(events.row_changes.len(), 1);
    assert_eq!(events.row_changes[0].row_idx, 2);
    assert_eq!(events.row_changes[0].row_key, RowKey::Int(0));

    let (rows, data) = events.rows_changes.last().unwrap();
    assert_eq!(data.indexes, vec![2]);
    assert_eq!(rows[0], reversed[0]);
    assert_eq!(rows[1], reversed[1]);
    assert_eq!(rows[2], common::row(json!({"id": 0, "title": "EDITED", "note": "note0"})));
}

#[test]
fn test_edit_is_discarded_when_row_is_filtered_out() {
    let mut grid = TestGrid::new(columns(), numbered_rows(3, &["title", "note"]));
    grid.grid
        .set_row_key_getter(|row, idx| json_row_key(row, "id", idx));
    grid.select(1, 1);
    grid.key("Enter");
    grid.grid.editor_text_input("lost");

    let remaining: Vec<JsonRow> = numbered_rows(3, &["title", "note"])
        .into_iter()
        .filter(|row| row.get("id") != Some(&json!(1)))
        .collect();
    grid.grid.set_rows(remaining);
    assert_eq!(grid.grid.selection_kind(), SelectionKind::Selected);

    grid.grid.handle_editor_blur();
    grid.sync();
    assert!(grid.events.borrow().rows_changes.is_empty());
    assert!(grid.events.borrow().row_changes.is_empty());
}
