//! `DataGrid` - the controlled, stateful grid engine.
//!
//! The grid owns only what it must: the resolved column layout, the cached
//! row offset table, the selection machine and the roving focus state. Rows,
//! the selected-rows set and the sort specification belong to the caller,
//! which is notified through callbacks and hands new values back through the
//! setters.
//!
//! Input handling is split across submodules:
//! - `events` - key, pointer, editor and focus events
//! - `scroll` - scroll and resize bookkeeping, scroll-to-cell
//! - `clipboard` - copy, paste and drag fill

mod clipboard;
mod events;
mod scroll;

pub use clipboard::escape_cell_value;
pub use events::{CellMouseArgs, CellMouseEvent};

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::config::{GridConfig, RowHeight};
use crate::error::Result;
use crate::focus::RovingFocus;
use crate::layout::{
    compute_viewport, resolve_columns, ColumnLayout, RowOffsets, ScrollMetrics, Viewport,
    ViewportOptions,
};
use crate::render::{compose_frame, GridFrame, RenderContext};
use crate::selection::{Effect, Intent, NavContext, SelectionMachine};
use crate::types::{
    CellPosition, Column, ColumnWidth, GridRow, RowKey, SelectionKind, SelectionState, SortColumn,
};

/// Rows touched by one `on_rows_change` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsChangeData {
    pub indexes: Vec<usize>,
    pub column_key: Option<String>,
}

/// One row update.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChange<R> {
    pub row_idx: usize,
    /// Key of the row before the update
    pub row_key: RowKey,
    pub row: R,
}

/// A copy gesture on a data cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyEvent<R> {
    pub row: R,
    pub column_key: String,
    /// TSV-escaped display text of the copied value
    pub text: String,
}

type RowsChangeFn<R> = Box<dyn FnMut(&[R], &RowsChangeData)>;
type RowChangeFn<R> = Box<dyn FnMut(&RowChange<R>)>;
type SelectedRowsFn = Box<dyn FnMut(&HashSet<RowKey>)>;
type SortColumnsFn = Box<dyn FnMut(&[SortColumn])>;
type SelectedCellFn = Box<dyn FnMut(Option<CellPosition>)>;
type CopyFn<R> = Box<dyn FnMut(&CopyEvent<R>)>;
type ColumnResizeFn = Box<dyn FnMut(usize, f32)>;
type CellMouseFn<R> = Box<dyn FnMut(&CellMouseArgs<'_, R>, &mut CellMouseEvent)>;

/// Caller hooks. Every hook is optional.
pub(crate) struct GridCallbacks<R> {
    on_rows_change: Option<RowsChangeFn<R>>,
    on_row_change: Option<RowChangeFn<R>>,
    on_selected_rows_change: Option<SelectedRowsFn>,
    on_sort_columns_change: Option<SortColumnsFn>,
    on_selected_cell_change: Option<SelectedCellFn>,
    on_copy: Option<CopyFn<R>>,
    on_column_resize: Option<ColumnResizeFn>,
    on_cell_click: Option<CellMouseFn<R>>,
    on_cell_double_click: Option<CellMouseFn<R>>,
    on_cell_context_menu: Option<CellMouseFn<R>>,
}

impl<R> Default for GridCallbacks<R> {
    fn default() -> Self {
        Self {
            on_rows_change: None,
            on_row_change: None,
            on_selected_rows_change: None,
            on_sort_columns_change: None,
            on_selected_cell_change: None,
            on_copy: None,
            on_column_resize: None,
            on_cell_click: None,
            on_cell_double_click: None,
            on_cell_context_menu: None,
        }
    }
}

/// A virtualized data grid over caller-owned rows.
pub struct DataGrid<R, SR = ()> {
    config: GridConfig,
    columns: Vec<Rc<Column<R, SR>>>,
    layout: ColumnLayout<R, SR>,
    measured_widths: HashMap<String, f32>,
    resized_widths: HashMap<String, f32>,
    rows: Vec<R>,
    top_summary_rows: Vec<SR>,
    bottom_summary_rows: Vec<SR>,
    row_height: Option<RowHeight<R>>,
    offsets: RowOffsets,
    row_key: Rc<dyn Fn(&R, usize) -> RowKey>,
    selected_rows: HashSet<RowKey>,
    sort_columns: Vec<SortColumn>,
    machine: SelectionMachine<R>,
    focus: RovingFocus,
    /// Scroll container metrics; `client_height` includes the sticky rows
    metrics: ScrollMetrics,
    callbacks: GridCallbacks<R>,
}

impl<R: GridRow + 'static, SR: 'static> DataGrid<R, SR> {
    /// Create a grid with no rows.
    ///
    /// # Errors
    /// Returns an error if the column set is invalid.
    pub fn new(columns: Vec<Column<R, SR>>, config: GridConfig) -> Result<Self> {
        let columns: Vec<_> = columns.into_iter().map(Rc::new).collect();
        let layout = resolve_columns(
            &columns,
            0.0,
            &config.default_column_options,
            &HashMap::new(),
        )?;
        Ok(Self {
            offsets: RowOffsets::uniform(config.row_height, 0),
            config,
            columns,
            layout,
            measured_widths: HashMap::new(),
            resized_widths: HashMap::new(),
            rows: Vec::new(),
            top_summary_rows: Vec::new(),
            bottom_summary_rows: Vec::new(),
            row_height: None,
            row_key: Rc::new(|_: &R, idx: usize| RowKey::from(idx)),
            selected_rows: HashSet::new(),
            sort_columns: Vec::new(),
            machine: SelectionMachine::new(),
            focus: RovingFocus::new(),
            metrics: ScrollMetrics::default(),
            callbacks: GridCallbacks::default(),
        })
    }

    // ---- props ----

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &ColumnLayout<R, SR> {
        &self.layout
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn selected_rows(&self) -> &HashSet<RowKey> {
        &self.selected_rows
    }

    pub fn sort_columns(&self) -> &[SortColumn] {
        &self.sort_columns
    }

    pub fn selection(&self) -> &SelectionState<R> {
        self.machine.state()
    }

    pub fn selection_kind(&self) -> SelectionKind {
        self.machine.kind()
    }

    pub fn active_cell(&self) -> Option<CellPosition> {
        self.machine.active()
    }

    pub fn focus(&self) -> &RovingFocus {
        &self.focus
    }

    /// Replace the column set.
    ///
    /// An invalid set is rejected and the previous layout stays in effect.
    ///
    /// # Errors
    /// Returns the configuration error that caused the rejection.
    pub fn set_columns(&mut self, columns: Vec<Column<R, SR>>) -> Result<()> {
        let columns: Vec<_> = columns.into_iter().map(Rc::new).collect();
        match self.resolve(&columns) {
            Ok(layout) => {
                self.columns = columns;
                self.layout = layout;
                self.reconcile();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "column set rejected, keeping previous layout");
                Err(e)
            }
        }
    }

    /// Replace the rows. Row offsets are recomputed only if a height changed.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        let height = self.effective_row_height();
        self.offsets.update(&self.rows, &height);
        self.reconcile();
    }

    pub fn set_top_summary_rows(&mut self, rows: Vec<SR>) {
        self.top_summary_rows = rows;
        self.reconcile();
    }

    pub fn set_bottom_summary_rows(&mut self, rows: Vec<SR>) {
        self.bottom_summary_rows = rows;
        self.reconcile();
    }

    pub fn set_selected_rows(&mut self, selected: HashSet<RowKey>) {
        self.selected_rows = selected;
    }

    pub fn set_sort_columns(&mut self, sort_columns: Vec<SortColumn>) {
        self.sort_columns = sort_columns;
    }

    /// Use a row-derived key instead of the row index. The getter also
    /// receives the row index, for keys that fall back to it.
    pub fn set_row_key_getter(&mut self, getter: impl Fn(&R, usize) -> RowKey + 'static) {
        self.row_key = Rc::new(getter);
    }

    /// Install a per-row height accessor, or `None` for `config.row_height`.
    pub fn set_row_height(&mut self, row_height: Option<RowHeight<R>>) {
        self.row_height = row_height;
        let height = self.effective_row_height();
        self.offsets.update(&self.rows, &height);
    }

    /// Replace the configuration. Columns are re-resolved against the new
    /// default column options.
    ///
    /// # Errors
    /// Returns an error if the current columns are invalid under the new
    /// defaults; the previous configuration stays in effect.
    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        let previous = std::mem::replace(&mut self.config, config);
        match self.resolve(&self.columns) {
            Ok(layout) => self.layout = layout,
            Err(e) => {
                tracing::warn!(error = %e, "configuration rejected");
                self.config = previous;
                return Err(e);
            }
        }
        let height = self.effective_row_height();
        self.offsets.update(&self.rows, &height);
        self.reconcile();
        Ok(())
    }

    /// Controlled override of the active cell. Out-of-bounds positions clear it
    /// and a position covered by a span moves to the span's anchor.
    pub fn set_selected_cell(&mut self, position: Option<CellPosition>) {
        self.machine.set_active(position);
        self.reconcile();
    }

    /// Width measured by the host for a content-sized column.
    pub fn set_measured_width(&mut self, key: &str, width: f32) {
        let is_content_sized = self
            .layout
            .by_key(key)
            .is_some_and(|c| c.column.width == ColumnWidth::MaxContent);
        if !is_content_sized || !width.is_finite() {
            return;
        }
        if self
            .measured_widths
            .get(key)
            .is_some_and(|w| w.to_bits() == width.to_bits())
        {
            return;
        }
        self.measured_widths.insert(key.to_string(), width);
        self.relayout();
    }

    // ---- callbacks ----

    pub fn on_rows_change(&mut self, f: impl FnMut(&[R], &RowsChangeData) + 'static) {
        self.callbacks.on_rows_change = Some(Box::new(f));
    }

    pub fn on_row_change(&mut self, f: impl FnMut(&RowChange<R>) + 'static) {
        self.callbacks.on_row_change = Some(Box::new(f));
    }

    pub fn on_selected_rows_change(&mut self, f: impl FnMut(&HashSet<RowKey>) + 'static) {
        self.callbacks.on_selected_rows_change = Some(Box::new(f));
    }

    pub fn on_sort_columns_change(&mut self, f: impl FnMut(&[SortColumn]) + 'static) {
        self.callbacks.on_sort_columns_change = Some(Box::new(f));
    }

    pub fn on_selected_cell_change(&mut self, f: impl FnMut(Option<CellPosition>) + 'static) {
        self.callbacks.on_selected_cell_change = Some(Box::new(f));
    }

    pub fn on_copy(&mut self, f: impl FnMut(&CopyEvent<R>) + 'static) {
        self.callbacks.on_copy = Some(Box::new(f));
    }

    pub fn on_column_resize(&mut self, f: impl FnMut(usize, f32) + 'static) {
        self.callbacks.on_column_resize = Some(Box::new(f));
    }

    pub fn on_cell_click(
        &mut self,
        f: impl FnMut(&CellMouseArgs<'_, R>, &mut CellMouseEvent) + 'static,
    ) {
        self.callbacks.on_cell_click = Some(Box::new(f));
    }

    pub fn on_cell_double_click(
        &mut self,
        f: impl FnMut(&CellMouseArgs<'_, R>, &mut CellMouseEvent) + 'static,
    ) {
        self.callbacks.on_cell_double_click = Some(Box::new(f));
    }

    pub fn on_cell_context_menu(
        &mut self,
        f: impl FnMut(&CellMouseArgs<'_, R>, &mut CellMouseEvent) + 'static,
    ) {
        self.callbacks.on_cell_context_menu = Some(Box::new(f));
    }

    // ---- intents ----

    /// Feed one intent to the selection machine and apply its effects.
    ///
    /// Returns `false` when the transition released focus to the browser.
    pub fn dispatch(&mut self, intent: Intent<R>) -> bool {
        let column_key = self
            .machine
            .active()
            .and_then(|a| self.layout.get(a.idx))
            .map(|c| c.key().to_string());
        let effects = self.with_machine(|machine, nav| machine.apply(intent, nav));
        let released = effects.contains(&Effect::ReleaseFocus);
        self.apply_effects(effects, column_key);
        !released
    }

    /// Select a cell, optionally opening its editor.
    pub fn select_cell(&mut self, position: CellPosition, open_editor: bool) {
        self.dispatch(Intent::SelectCell {
            position,
            open_editor,
        });
    }

    // ---- rendering ----

    /// Materialized ranges for the current scroll position.
    pub fn viewport(&self) -> Viewport {
        compute_viewport(
            &self.data_area_metrics(),
            &self.offsets,
            &self.layout,
            ViewportOptions {
                overscan_row_count: self.config.overscan_row_count,
                overscan_column_count: self.config.overscan_column_count,
                enable_virtualization: self.config.enable_virtualization,
            },
        )
    }

    /// Compose the next frame and reconcile DOM focus against it.
    pub fn render(&mut self) -> GridFrame {
        let viewport = self.viewport();
        let mut frame = {
            let nav = self.nav_context();
            compose_frame(&RenderContext {
                nav: &nav,
                selection: self.machine.state(),
                focus: &self.focus,
                viewport: &viewport,
                scroll: self.metrics,
                sort_columns: &self.sort_columns,
                config: &self.config,
            })
        };
        let command = self.focus.reconcile(
            self.machine.active(),
            self.machine.is_editing(),
            |position| frame.is_mounted(position),
        );
        frame.focus_command = command;
        frame
    }

    // ---- internals ----

    fn effective_row_height(&self) -> RowHeight<R> {
        self.row_height
            .clone()
            .unwrap_or(RowHeight::Fixed(self.config.row_height))
    }

    fn resolve(&self, columns: &[Rc<Column<R, SR>>]) -> Result<ColumnLayout<R, SR>> {
        // Widths set by a resize gesture override the declared width
        let columns: Vec<_> = columns
            .iter()
            .map(|column| match self.resized_widths.get(&column.key) {
                Some(&width) => Rc::new(Column::clone(column).with_width(ColumnWidth::Px(width))),
                None => Rc::clone(column),
            })
            .collect();
        resolve_columns(
            &columns,
            self.metrics.client_width,
            &self.config.default_column_options,
            &self.measured_widths,
        )
    }

    /// Re-resolve the current columns after a width input changed.
    fn relayout(&mut self) {
        match self.resolve(&self.columns) {
            Ok(layout) => self.layout = layout,
            Err(e) => tracing::warn!(error = %e, "column relayout failed, keeping previous layout"),
        }
    }

    fn nav_context(&self) -> NavContext<'_, R, SR> {
        NavContext {
            columns: &self.layout,
            rows: &self.rows,
            top_summary_rows: &self.top_summary_rows,
            bottom_summary_rows: &self.bottom_summary_rows,
            offsets: &self.offsets,
            page_height: self.data_area_height(),
            row_key: &*self.row_key,
            selected_rows: &self.selected_rows,
        }
    }

    fn with_machine<T>(
        &mut self,
        f: impl FnOnce(&mut SelectionMachine<R>, &NavContext<'_, R, SR>) -> T,
    ) -> T {
        let mut machine = std::mem::take(&mut self.machine);
        let result = {
            let nav = self.nav_context();
            f(&mut machine, &nav)
        };
        self.machine = machine;
        result
    }

    /// Re-validate engine state after a prop changed.
    fn reconcile(&mut self) {
        let effects = self.with_machine(|machine, nav| machine.reconcile(nav));
        self.apply_effects(effects, None);
    }

    fn apply_effects(&mut self, effects: Vec<Effect<R>>, column_key: Option<String>) {
        let mut changes = Vec::new();

        for effect in effects {
            match effect {
                Effect::SelectedCellChange(position) => {
                    if let Some(f) = self.callbacks.on_selected_cell_change.as_mut() {
                        f(position);
                    }
                }
                Effect::RowChange {
                    row_idx,
                    row_key,
                    row,
                } => changes.push(RowChange {
                    row_idx,
                    row_key,
                    row,
                }),
                Effect::SelectedRowsChange(selected) => {
                    if let Some(f) = self.callbacks.on_selected_rows_change.as_mut() {
                        f(&selected);
                    }
                }
                Effect::RequestFocus(position) => self.focus.request_focus(position),
                Effect::ReleaseFocus => self.focus.release(),
                Effect::Copy { row, column_key } => {
                    let text = row
                        .cell_value(&column_key)
                        .map(|v| escape_cell_value(&v.display()))
                        .unwrap_or_default();
                    if let Some(f) = self.callbacks.on_copy.as_mut() {
                        f(&CopyEvent {
                            row,
                            column_key,
                            text,
                        });
                    }
                }
                Effect::ScrollIntoView(position) => {
                    self.scroll_to_cell(position);
                }
            }
        }

        if changes.is_empty() {
            return;
        }
        tracing::debug!(rows = changes.len(), "row updates");

        if let Some(f) = self.callbacks.on_row_change.as_mut() {
            for change in &changes {
                f(change);
            }
        }
        if let Some(f) = self.callbacks.on_rows_change.as_mut() {
            let mut rows = self.rows.clone();
            let mut indexes = Vec::with_capacity(changes.len());
            for change in changes {
                if let Some(slot) = rows.get_mut(change.row_idx) {
                    *slot = change.row;
                    indexes.push(change.row_idx);
                }
            }
            f(&rows, &RowsChangeData {
                indexes,
                column_key,
            });
        }
    }
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
    use crate::types::{JsonRow, SortDirection};
    use serde_json::json;
    use std::cell::RefCell;

    fn columns() -> Vec<Column<JsonRow>> {
        vec![
            Column::new("id", "ID").with_width(ColumnWidth::Px(80.0)),
            Column::new("title", "Title")
                .with_width(ColumnWidth::Px(100.0))
                .editable(),
        ]
    }

    fn rows(n: usize) -> Vec<JsonRow> {
        (0..n)
            .map(|i| {
                json!({"id": i, "title": format!("t{i}")})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_invalid_columns_keep_previous_layout() {
        let mut grid = DataGrid::new(columns(), GridConfig::default()).unwrap();
        let result = grid.set_columns(vec![Column::new("a", "A"), Column::new("a", "B")]);
        assert!(result.is_err());
        assert_eq!(grid.columns().len(), 2);
        assert_eq!(grid.columns().get(1).unwrap().key(), "title");
    }

    #[test]
    fn test_rows_change_merges_updates() {
        let mut grid = DataGrid::new(columns(), GridConfig::default()).unwrap();
        grid.set_rows(rows(3));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        grid.on_rows_change(move |rows, data| {
            sink.borrow_mut().push((rows.to_vec(), data.clone()));
        });

        grid.select_cell(CellPosition::new(1, 1), true);
        grid.editor_text_input("changed");
        grid.dispatch(Intent::Commit { advance: false });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let (rows, data) = &seen[0];
        assert_eq!(data.indexes, vec![1]);
        assert_eq!(data.column_key.as_deref(), Some("title"));
        assert_eq!(rows[1].get("title"), Some(&json!("changed")));
        assert_eq!(rows[0].get("title"), Some(&json!("t0")));
    }

    #[test]
    fn test_removed_row_clears_active_cell() {
        let mut grid = DataGrid::new(columns(), GridConfig::default()).unwrap();
        grid.set_rows(rows(5));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        grid.on_selected_cell_change(move |p| sink.borrow_mut().push(p));

        grid.select_cell(CellPosition::new(4, 0), false);
        grid.set_rows(rows(2));
        assert_eq!(grid.active_cell(), None);
        assert_eq!(
            *changes.borrow(),
            vec![Some(CellPosition::new(4, 0)), None]
        );
    }

    #[test]
    fn test_sort_columns_are_controlled() {
        let mut grid: DataGrid<JsonRow> = DataGrid::new(
            vec![Column::new("id", "ID").sortable()],
            GridConfig::default(),
        )
        .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        grid.on_sort_columns_change(move |s| sink.borrow_mut().push(s.to_vec()));

        grid.handle_header_sort(0, false);
        assert!(grid.sort_columns().is_empty());
        assert_eq!(
            seen.borrow()[0],
            vec![SortColumn::new("id", SortDirection::Asc)]
        );
    }
}
