//! WebAssembly facade over `JsonRow` grids.
//!
//! `GridView` wraps a [`DataGrid`] and runs the controlled-state loop on the
//! host's behalf: row updates, row selection and sort changes are applied to
//! the wrapped grid and then reported to the registered JS callbacks.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const grid = new GridView(columns, { rowHeight: 35 });
//! grid.setRows(rows);
//! grid.onRowsChange((rows, data) => save(rows));
//! grid.resize(800, 600);
//! const frame = grid.render();
//! ```
//!
//! Callbacks run after the triggering call has finished, so they may call
//! back into the grid.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use js_sys::Function;

use crate::config::GridConfig;
use crate::error::GridError;
use crate::selection::{Intent, KeyInput};
use crate::sort::sort_rows;
use crate::types::{json_row_key, CellPosition, ColumnDef, JsonRow, RowKey, SortColumn};
use crate::viewer::{DataGrid, RowsChangeData};

/// Changes reported by the wrapped grid during one call.
#[derive(Default)]
struct Inbox {
    rows: Option<(Vec<JsonRow>, RowsChangeData)>,
    selected_rows: Option<HashSet<RowKey>>,
    sort_columns: Option<Vec<SortColumn>>,
    selected_cell: Option<Option<CellPosition>>,
    copies: Vec<serde_json::Value>,
}

#[derive(Default)]
struct JsHandlers {
    on_rows_change: Option<Function>,
    on_selected_rows_change: Option<Function>,
    on_sort_columns_change: Option<Function>,
    on_selected_cell_change: Option<Function>,
    on_copy: Option<Function>,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| GridError::from(format!("Serialization error: {e}")).into())
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| GridError::from(e.to_string()).into())
}

fn call(handler: Option<&Function>, args: &[JsValue]) {
    let Some(f) = handler else {
        return;
    };
    let result = match args {
        [] => f.call0(&JsValue::NULL),
        [a] => f.call1(&JsValue::NULL, a),
        [a, b, ..] => f.call2(&JsValue::NULL, a, b),
    };
    if let Err(e) = result {
        tracing::warn!(error = ?e, "grid callback threw");
    }
}

fn set_field(target: &js_sys::Object, key: &str, value: &JsValue) {
    if let Err(e) = js_sys::Reflect::set(target, &JsValue::from_str(key), value) {
        tracing::warn!(key, error = ?e, "failed to set field on callback argument");
    }
}

/// A data grid driven from JavaScript.
#[wasm_bindgen]
pub struct GridView {
    grid: DataGrid<JsonRow, JsonRow>,
    inbox: Rc<RefCell<Inbox>>,
    handlers: JsHandlers,
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid from column definitions and an optional configuration.
    ///
    /// # Errors
    /// Returns an error if the columns or the configuration are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(columns: JsValue, config: JsValue) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let defs: Vec<ColumnDef> = from_js(columns)?;
        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            from_js(config)?
        };
        let columns = defs.into_iter().map(ColumnDef::into_column).collect();
        let mut grid = DataGrid::new(columns, config)?;

        let inbox = Rc::new(RefCell::new(Inbox::default()));
        {
            let inbox = Rc::clone(&inbox);
            grid.on_rows_change(move |rows, data| {
                inbox.borrow_mut().rows = Some((rows.to_vec(), data.clone()));
            });
        }
        {
            let inbox = Rc::clone(&inbox);
            grid.on_selected_rows_change(move |selected| {
                inbox.borrow_mut().selected_rows = Some(selected.clone());
            });
        }
        {
            let inbox = Rc::clone(&inbox);
            grid.on_sort_columns_change(move |sort| {
                inbox.borrow_mut().sort_columns = Some(sort.to_vec());
            });
        }
        {
            let inbox = Rc::clone(&inbox);
            grid.on_selected_cell_change(move |position| {
                inbox.borrow_mut().selected_cell = Some(position);
            });
        }
        {
            let inbox = Rc::clone(&inbox);
            grid.on_copy(move |event| {
                inbox.borrow_mut().copies.push(serde_json::json!({
                    "row": event.row,
                    "columnKey": event.column_key,
                    "text": event.text,
                }));
            });
        }

        Ok(GridView {
            grid,
            inbox,
            handlers: JsHandlers::default(),
        })
    }

    // ---- props ----

    /// # Errors
    /// Returns an error if `rows` is not an array of objects.
    #[wasm_bindgen(js_name = setRows)]
    pub fn set_rows(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<JsonRow> = from_js(rows)?;
        self.apply_rows(rows);
        self.flush();
        Ok(())
    }

    /// # Errors
    /// Returns an error if either argument is not an array of objects.
    #[wasm_bindgen(js_name = setSummaryRows)]
    pub fn set_summary_rows(&mut self, top: JsValue, bottom: JsValue) -> Result<(), JsValue> {
        let top: Vec<JsonRow> = if top.is_undefined() { Vec::new() } else { from_js(top)? };
        let bottom: Vec<JsonRow> = if bottom.is_undefined() { Vec::new() } else { from_js(bottom)? };
        self.grid.set_top_summary_rows(top);
        self.grid.set_bottom_summary_rows(bottom);
        self.flush();
        Ok(())
    }

    /// # Errors
    /// Returns an error if the column set is invalid; the previous columns stay.
    #[wasm_bindgen(js_name = setColumns)]
    pub fn set_columns(&mut self, columns: JsValue) -> Result<(), JsValue> {
        let defs: Vec<ColumnDef> = from_js(columns)?;
        let columns = defs.into_iter().map(ColumnDef::into_column).collect();
        self.grid.set_columns(columns)?;
        self.flush();
        Ok(())
    }

    /// # Errors
    /// Returns an error if the configuration is invalid.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: GridConfig = from_js(config)?;
        self.grid.set_config(config)?;
        self.flush();
        Ok(())
    }

    /// Key rows by a field instead of their index.
    #[wasm_bindgen(js_name = setRowKeyField)]
    pub fn set_row_key_field(&mut self, field: String) {
        self.grid
            .set_row_key_getter(move |row, idx| json_row_key(row, &field, idx));
    }

    /// # Errors
    /// Returns an error if `keys` is not an array of strings or integers.
    #[wasm_bindgen(js_name = setSelectedRows)]
    pub fn set_selected_rows(&mut self, keys: JsValue) -> Result<(), JsValue> {
        let keys: Vec<RowKey> = from_js(keys)?;
        self.grid.set_selected_rows(keys.into_iter().collect());
        Ok(())
    }

    /// # Errors
    /// Returns an error if `sort` is not an array of sort columns.
    #[wasm_bindgen(js_name = setSortColumns)]
    pub fn set_sort_columns(&mut self, sort: JsValue) -> Result<(), JsValue> {
        let sort: Vec<SortColumn> = from_js(sort)?;
        self.apply_sort(sort);
        self.flush();
        Ok(())
    }

    /// # Errors
    /// Returns an error if `position` is not a cell position or null.
    #[wasm_bindgen(js_name = setSelectedCell)]
    pub fn set_selected_cell(&mut self, position: JsValue) -> Result<(), JsValue> {
        let position: Option<CellPosition> = from_js(position)?;
        self.grid.set_selected_cell(position);
        self.flush();
        Ok(())
    }

    #[wasm_bindgen(js_name = setMeasuredWidth)]
    pub fn set_measured_width(&mut self, key: &str, width: f32) {
        self.grid.set_measured_width(key, width);
    }

    // ---- callbacks ----

    #[wasm_bindgen(js_name = onRowsChange)]
    pub fn on_rows_change(&mut self, f: Function) {
        self.handlers.on_rows_change = Some(f);
    }

    #[wasm_bindgen(js_name = onSelectedRowsChange)]
    pub fn on_selected_rows_change(&mut self, f: Function) {
        self.handlers.on_selected_rows_change = Some(f);
    }

    #[wasm_bindgen(js_name = onSortColumnsChange)]
    pub fn on_sort_columns_change(&mut self, f: Function) {
        self.handlers.on_sort_columns_change = Some(f);
    }

    #[wasm_bindgen(js_name = onSelectedCellChange)]
    pub fn on_selected_cell_change(&mut self, f: Function) {
        self.handlers.on_selected_cell_change = Some(f);
    }

    #[wasm_bindgen(js_name = onCopy)]
    pub fn on_copy(&mut self, f: Function) {
        self.handlers.on_copy = Some(f);
    }

    // ---- events ----

    pub fn scroll(&mut self, scroll_top: f32, scroll_left: f32) {
        self.grid.handle_scroll(scroll_top, scroll_left);
    }

    pub fn resize(&mut self, client_width: f32, client_height: f32) {
        self.grid.resize(client_width, client_height);
    }

    /// Returns `true` when the key was consumed.
    ///
    /// # Errors
    /// Returns an error if `key` is not a key input object.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: JsValue) -> Result<bool, JsValue> {
        let key: KeyInput = from_js(key)?;
        let handled = self.grid.handle_key(&key);
        self.flush();
        Ok(handled)
    }

    #[wasm_bindgen(js_name = cellClick)]
    pub fn cell_click(&mut self, row_idx: i32, idx: usize) {
        self.grid.handle_cell_click(CellPosition::new(row_idx, idx));
        self.flush();
    }

    #[wasm_bindgen(js_name = cellDoubleClick)]
    pub fn cell_double_click(&mut self, row_idx: i32, idx: usize) {
        self.grid
            .handle_cell_double_click(CellPosition::new(row_idx, idx));
        self.flush();
    }

    #[wasm_bindgen(js_name = cellContextMenu)]
    pub fn cell_context_menu(&mut self, row_idx: i32, idx: usize) {
        self.grid
            .handle_cell_context_menu(CellPosition::new(row_idx, idx));
        self.flush();
    }

    #[wasm_bindgen(js_name = cellFocus)]
    pub fn cell_focus(&mut self, row_idx: i32, idx: usize, is_child: bool) {
        self.grid
            .handle_cell_focus(CellPosition::new(row_idx, idx), is_child);
    }

    #[wasm_bindgen(js_name = focusOut)]
    pub fn focus_out(&mut self) {
        self.grid.handle_focus_out();
    }

    #[wasm_bindgen(js_name = headerSort)]
    pub fn header_sort(&mut self, idx: usize, additive: bool) {
        self.grid.handle_header_sort(idx, additive);
        self.flush();
    }

    #[wasm_bindgen(js_name = columnResize)]
    pub fn column_resize(&mut self, idx: usize, width: f32) {
        self.grid.handle_column_resize(idx, width);
    }

    #[wasm_bindgen(js_name = editorInput)]
    pub fn editor_input(&mut self, text: &str) {
        self.grid.editor_text_input(text);
    }

    #[wasm_bindgen(js_name = editorBlur)]
    pub fn editor_blur(&mut self) {
        self.grid.handle_editor_blur();
        self.flush();
    }

    pub fn commit(&mut self, advance: bool) {
        self.grid.dispatch(Intent::Commit { advance });
        self.flush();
    }

    pub fn cancel(&mut self) {
        self.grid.dispatch(Intent::Cancel);
        self.flush();
    }

    #[wasm_bindgen(js_name = toggleRow)]
    pub fn toggle_row(&mut self, row_idx: usize, checked: bool, shift: bool) {
        self.grid.toggle_row_selection(row_idx, checked, shift);
        self.flush();
    }

    #[wasm_bindgen(js_name = toggleAllRows)]
    pub fn toggle_all_rows(&mut self, checked: bool) {
        self.grid.toggle_all_rows(checked);
        self.flush();
    }

    pub fn copy(&mut self) {
        self.grid.copy();
        self.flush();
    }

    pub fn paste(&mut self) {
        self.grid.paste();
        self.flush();
    }

    #[wasm_bindgen(js_name = dragFillOver)]
    pub fn drag_fill_over(&mut self, row_idx: usize) {
        self.grid.drag_fill_over(row_idx);
    }

    #[wasm_bindgen(js_name = dragFillEnd)]
    pub fn drag_fill_end(&mut self) {
        self.grid.drag_fill_end();
        self.flush();
    }

    #[wasm_bindgen(js_name = copiedText)]
    pub fn copied_text(&self) -> Option<String> {
        self.grid.copied_text()
    }

    // ---- rendering ----

    /// Compose the next frame as a JS object.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be serialized.
    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        let frame = self.grid.render();
        to_js(&frame)
    }

    /// Compose the next frame as a JSON string.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be serialized.
    #[wasm_bindgen(js_name = renderJson)]
    pub fn render_json(&mut self) -> Result<String, JsValue> {
        let frame = self.grid.render();
        serde_json::to_string(&frame)
            .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
    }
}

impl GridView {
    /// Store rows, keeping the active sort order.
    fn apply_rows(&mut self, rows: Vec<JsonRow>) {
        let rows = if self.grid.sort_columns().is_empty() {
            rows
        } else {
            let columns: Vec<_> = self
                .grid
                .columns()
                .columns
                .iter()
                .map(|c| Rc::clone(&c.column))
                .collect();
            sort_rows(&rows, self.grid.sort_columns(), &columns)
        };
        self.grid.set_rows(rows);
    }

    fn apply_sort(&mut self, sort: Vec<SortColumn>) {
        self.grid.set_sort_columns(sort);
        let rows = self.grid.rows().to_vec();
        self.apply_rows(rows);
    }

    /// Apply reported changes to the wrapped grid, then notify JS.
    fn flush(&mut self) {
        let inbox = std::mem::take(&mut *self.inbox.borrow_mut());

        if let Some(sort) = &inbox.sort_columns {
            self.apply_sort(sort.clone());
            call(
                self.handlers.on_sort_columns_change.as_ref(),
                &[to_js(sort).unwrap_or(JsValue::NULL)],
            );
        }
        if let Some(selected) = inbox.selected_rows {
            let keys: Vec<RowKey> = selected.iter().cloned().collect();
            self.grid.set_selected_rows(selected);
            call(
                self.handlers.on_selected_rows_change.as_ref(),
                &[to_js(&keys).unwrap_or(JsValue::NULL)],
            );
        }
        if let Some((rows, data)) = inbox.rows {
            let indexes = to_js(&data.indexes).unwrap_or(JsValue::NULL);
            let js_rows = to_js(&rows).unwrap_or(JsValue::NULL);
            self.grid.set_rows(rows);
            let column = data
                .column_key
                .as_deref()
                .map_or(JsValue::NULL, JsValue::from_str);
            let change = js_sys::Object::new();
            set_field(&change, "indexes", &indexes);
            set_field(&change, "column", &column);
            call(self.handlers.on_rows_change.as_ref(), &[js_rows, change.into()]);
        }
        if let Some(position) = inbox.selected_cell {
            call(
                self.handlers.on_selected_cell_change.as_ref(),
                &[to_js(&position).unwrap_or(JsValue::NULL)],
            );
        }
        for copy in &inbox.copies {
            call(
                self.handlers.on_copy.as_ref(),
                &[to_js(copy).unwrap_or(JsValue::NULL)],
            );
        }

        // Applying changes can itself report changes (e.g. a row removal
        // clearing the active cell)
        let pending = {
            let inbox = self.inbox.borrow();
            inbox.selected_cell.is_some() || inbox.rows.is_some()
        };
        if pending {
            self.flush();
        }
    }
}
