//! Common test utilities for grid integration tests.
//!
//! `TestGrid` wraps a `DataGrid` over JSON rows and records every callback.
//! `sync()` feeds controlled state (rows, selected rows, sort) back into the
//! grid the way a host would.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use gridview::selection::KeyInput;
use gridview::viewer::{CopyEvent, RowChange, RowsChangeData};
use gridview::{
    CellPosition, Column, ColumnWidth, DataGrid, GridConfig, GridFrame, JsonRow, RowKey,
    SortColumn,
};

/// Everything the grid reported through its callbacks.
#[derive(Default)]
pub struct Events {
    pub rows_changes: Vec<(Vec<JsonRow>, RowsChangeData)>,
    pub row_changes: Vec<RowChange<JsonRow>>,
    pub selected_rows: Vec<HashSet<RowKey>>,
    pub sort_columns: Vec<Vec<SortColumn>>,
    pub selected_cells: Vec<Option<CellPosition>>,
    pub copies: Vec<CopyEvent<JsonRow>>,
}

pub struct TestGrid {
    pub grid: DataGrid<JsonRow, JsonRow>,
    pub events: Rc<RefCell<Events>>,
    synced: (usize, usize, usize),
}

impl TestGrid {
    /// Grid with the default config in an 800x600 container.
    pub fn new(columns: Vec<Column<JsonRow, JsonRow>>, rows: Vec<JsonRow>) -> Self {
        Self::with_config(columns, rows, GridConfig::default(), (800.0, 600.0))
    }

    pub fn with_config(
        columns: Vec<Column<JsonRow, JsonRow>>,
        rows: Vec<JsonRow>,
        config: GridConfig,
        (width, height): (f32, f32),
    ) -> Self {
        let mut grid = DataGrid::new(columns, config).expect("valid columns");
        let events = Rc::new(RefCell::new(Events::default()));

        let sink = Rc::clone(&events);
        grid.on_rows_change(move |rows, data| {
            sink.borrow_mut()
                .rows_changes
                .push((rows.to_vec(), data.clone()));
        });
        let sink = Rc::clone(&events);
        grid.on_row_change(move |change| sink.borrow_mut().row_changes.push(change.clone()));
        let sink = Rc::clone(&events);
        grid.on_selected_rows_change(move |selected| {
            sink.borrow_mut().selected_rows.push(selected.clone());
        });
        let sink = Rc::clone(&events);
        grid.on_sort_columns_change(move |sort| sink.borrow_mut().sort_columns.push(sort.to_vec()));
        let sink = Rc::clone(&events);
        grid.on_selected_cell_change(move |p| sink.borrow_mut().selected_cells.push(p));
        let sink = Rc::clone(&events);
        grid.on_copy(move |event| sink.borrow_mut().copies.push(event.clone()));

        grid.set_rows(rows);
        grid.resize(width, height);
        Self {
            grid,
            events,
            synced: (0, 0, 0),
        }
    }

    /// Hand reported state back to the grid.
    pub fn sync(&mut self) {
        let (rows, selected, sort) = {
            let events = self.events.borrow();
            let rows = events
                .rows_changes
                .get(self.synced.0..)
                .and_then(<[_]>::last)
                .map(|(rows, _)| rows.clone());
            let selected = events
                .selected_rows
                .get(self.synced.1..)
                .and_then(<[_]>::last)
                .cloned();
            let sort = events
                .sort_columns
                .get(self.synced.2..)
                .and_then(<[_]>::last)
                .cloned();
            self.synced = (
                events.rows_changes.len(),
                events.selected_rows.len(),
                events.sort_columns.len(),
            );
            (rows, selected, sort)
        };
        if let Some(rows) = rows {
            self.grid.set_rows(rows);
        }
        if let Some(selected) = selected {
            self.grid.set_selected_rows(selected);
        }
        if let Some(sort) = sort {
            self.grid.set_sort_columns(sort);
        }
    }

    /// Press a key and sync. Returns whether the grid consumed it.
    pub fn key(&mut self, key: &str) -> bool {
        self.press(KeyInput::new(key))
    }

    pub fn press(&mut self, key: KeyInput) -> bool {
        let handled = self.grid.handle_key(&key);
        self.sync();
        handled
    }

    pub fn select(&mut self, row_idx: i32, idx: usize) {
        self.grid.select_cell(CellPosition::new(row_idx, idx), false);
    }

    pub fn active(&self) -> Option<(i32, usize)> {
        self.grid.active_cell().map(|p| (p.row_idx, p.idx))
    }

    pub fn render(&mut self) -> GridFrame {
        self.grid.render()
    }
}

/// JSON object row from a `json!` literal.
pub fn row(value: serde_json::Value) -> JsonRow {
    value.as_object().cloned().expect("row literal must be an object")
}

/// `count` rows with an `id` field and one text field per key.
pub fn numbered_rows(count: usize, keys: &[&str]) -> Vec<JsonRow> {
    (0..count)
        .map(|i| {
            let mut row = JsonRow::new();
            row.insert("id".to_string(), serde_json::json!(i));
            for key in keys {
                row.insert((*key).to_string(), serde_json::json!(format!("{key}{i}")));
            }
            row
        })
        .collect()
}

/// Fixed-width column.
pub fn px(key: &str, width: f32) -> Column<JsonRow, JsonRow> {
    Column::new(key, key.to_uppercase())
        .with_width(ColumnWidth::Px(width))
        .with_min_width(0.0)
}

/// `count` fixed-width columns named `c0..`.
pub fn px_columns(count: usize, width: f32) -> Vec<Column<JsonRow, JsonRow>> {
    (0..count).map(|i| px(&format!("c{i}"), width)).collect()
}
