//! Roving focus tests
//!
//! One tab stop at a time, DOM focus following the active cell, and focus
//! parked on the grid instead of being lost.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{numbered_rows, px, px_columns, TestGrid};
use gridview::focus::FocusCommand;
use gridview::types::ColSpanArgs;
use gridview::{CellPosition, GridConfig};

fn tall_grid() -> TestGrid {
    TestGrid::with_config(
        px_columns(10, 100.0),
        numbered_rows(200, &[]),
        GridConfig::default(),
        (300.0, 385.0),
    )
}

#[test]
fn test_grid_is_tab_stop_without_active_cell() {
    let mut grid = tall_grid();
    let frame = grid.render();
    assert_eq!(frame.grid_tab_index, 0);
    assert_eq!(frame.tab_stop_count(), 1);
    assert_eq!(frame.focus_command, None);
}

#[test]
fn test_selecting_moves_tab_stop_and_focus() {
    let mut grid = tall_grid();
    grid.select(3, 1);

    let frame = grid.render();
    assert_eq!(frame.grid_tab_index, -1);
    assert_eq!(frame.tab_stop_count(), 1);
    assert!(frame.cell(CellPosition::new(3, 1)).unwrap().is_tab_stop());
    assert_eq!(
        frame.focus_command,
        Some(FocusCommand::FocusCell {
            position: CellPosition::new(3, 1)
        })
    );

    // Focus already there: nothing more to do
    grid.grid.handle_cell_focus(CellPosition::new(3, 1), false);
    assert_eq!(grid.render().focus_command, None);
}

#[test]
fn test_single_tab_stop_across_scroll() {
    let mut grid = tall_grid();
    grid.select(2, 0);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(2, 0), false);

    for scroll_top in [0.0, 400.0, 2000.0, 6000.0, 20.0] {
        grid.grid.handle_scroll(scroll_top, 450.0);
        let frame = grid.render();
        assert_eq!(frame.tab_stop_count(), 1, "scroll_top {scroll_top}");
        // The active cell stays mounted however far the grid scrolls
        assert!(frame.is_mounted(CellPosition::new(2, 0)));
        assert_eq!(frame.focus_command, None);
    }
}

#[test]
fn test_navigation_moves_dom_focus() {
    let mut grid = tall_grid();
    grid.select(0, 0);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(0, 0), false);

    grid.key("ArrowRight");
    let frame = grid.render();
    assert_eq!(
        frame.focus_command,
        Some(FocusCommand::FocusCell {
            position: CellPosition::new(0, 1)
        })
    );
    assert!(!frame.cell(CellPosition::new(0, 0)).unwrap().is_tab_stop());
}

#[test]
fn test_removed_active_row_parks_focus_then_restores() {
    let mut grid = tall_grid();
    grid.select(150, 2);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(150, 2), false);

    grid.grid.set_rows(numbered_rows(100, &[]));
    assert_eq!(grid.active(), None);
    let frame = grid.render();
    assert_eq!(frame.focus_command, Some(FocusCommand::FocusSink));
    assert_eq!(frame.grid_tab_index, 0);
    assert!(grid.grid.focus().is_parked());

    grid.select(10, 2);
    let frame = grid.render();
    assert_eq!(
        frame.focus_command,
        Some(FocusCommand::FocusCell {
            position: CellPosition::new(10, 2)
        })
    );
    assert!(!grid.grid.focus().is_parked());
}

#[test]
fn test_editor_owns_focus_while_editing() {
    let columns = vec![px("id", 60.0), px("title", 120.0).editable()];
    let mut grid = TestGrid::new(columns, numbered_rows(5, &["title"]));
    grid.select(1, 1);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(1, 1), false);

    grid.key("Enter");
    assert_eq!(grid.render().focus_command, None);

    grid.key("Escape");
    assert_eq!(
        grid.render().focus_command,
        Some(FocusCommand::FocusCell {
            position: CellPosition::new(1, 1)
        })
    );
}

#[test]
fn test_child_focus_lets_shift_tab_leave_cell() {
    let mut grid = tall_grid();
    grid.select(1, 1);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(1, 1), true);

    let frame = grid.render();
    let cell = frame.cell(CellPosition::new(1, 1)).unwrap();
    assert_eq!(cell.tab_index, -1);
    assert_eq!(cell.child_tab_index, 0);
}

#[test]
fn test_focus_out_forgets_focus() {
    let mut grid = tall_grid();
    grid.select(1, 1);
    grid.render();
    grid.grid.handle_cell_focus(CellPosition::new(1, 1), false);
    grid.grid.handle_focus_out();

    assert!(!grid.grid.focus().has_focus());
    let frame = grid.render();
    assert_eq!(frame.focus_command, None);
    assert_eq!(frame.tab_stop_count(), 1);
}

#[test]
fn test_covered_position_keeps_single_tab_stop() {
    // Column 1 spans three columns on data row 1
    let mut columns = px_columns(5, 100.0);
    let spanning = columns.remove(1).with_col_span(|args| match args {
        ColSpanArgs::Row { row_idx: 1, .. } => Some(3),
        _ => None,
    });
    columns.insert(1, spanning);
    let mut grid = TestGrid::new(columns, numbered_rows(4, &[]));

    grid.select(1, 2);
    assert_eq!(grid.active(), Some((1, 1)));

    let frame = grid.render();
    assert_eq!(frame.tab_stop_count(), 1);
    assert_eq!(frame.grid_tab_index, -1);
    assert!(frame.cell(CellPosition::new(1, 1)).unwrap().is_tab_stop());
    assert_eq!(
        frame.focus_command,
        Some(FocusCommand::FocusCell {
            position: CellPosition::new(1, 1)
        })
    );

    // A controlled position inside the span lands on the anchor too
    grid.grid.set_selected_cell(Some(CellPosition::new(1, 3)));
    assert_eq!(grid.active(), Some((1, 1)));
    assert_eq!(
        grid.events.borrow().selected_cells.last(),
        Some(&Some(CellPosition::new(1, 1)))
    );
    assert_eq!(grid.render().tab_stop_count(), 1);
}
