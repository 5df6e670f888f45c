//! Key, pointer, editor and focus event handlers for `DataGrid`.
//!
//! Handlers translate host events into intents; the selection machine does
//! the rest.

use super::DataGrid;
use crate::editor::apply_text_edit;
use crate::selection::{key_intent, Intent, KeyInput};
use crate::sort::next_sort_columns;
use crate::types::{CellPosition, GridRow, RowRegion, SelectionKind};

/// Data cell a pointer event landed on.
pub struct CellMouseArgs<'a, R> {
    pub position: CellPosition,
    pub row: &'a R,
    pub row_idx: usize,
    pub column_key: &'a str,
}

/// Lets a pointer hook override the grid's default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellMouseEvent {
    default_prevented: bool,
    select_request: Option<bool>,
}

impl CellMouseEvent {
    /// Skip the grid's own selection for this event.
    pub fn prevent_grid_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_grid_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Select the cell, optionally opening its editor, regardless of the
    /// default handling.
    pub fn select_cell(&mut self, open_editor: bool) {
        self.select_request = Some(open_editor);
    }
}

#[derive(Clone, Copy)]
enum MouseKind {
    Click,
    DoubleClick,
    ContextMenu,
}

impl<R: GridRow + 'static, SR: 'static> DataGrid<R, SR> {
    /// Handle a key press on the grid. Returns `true` when the grid consumed
    /// it and the host should prevent the browser default.
    ///
    /// With no active cell, or when Tab moves past the first or last cell,
    /// the key is left to the browser so focus can leave the grid.
    pub fn handle_key(&mut self, key: &KeyInput) -> bool {
        let kind = self.machine.kind();
        let active = self.machine.active();
        if kind == SelectionKind::None {
            return false;
        }

        if kind == SelectionKind::Selected {
            if let Some(position) = active {
                if self.is_header_row(position.row_idx)
                    && matches!(key.key.as_str(), "Enter" | " ")
                    && self.layout.get(position.idx).is_some_and(|c| c.sortable)
                {
                    self.handle_header_sort(position.idx, key.is_ctrl_or_meta());
                    return true;
                }

                // Typing on an editable cell opens the editor with the typed text
                if is_printable(key) && self.nav_context().is_editable(position) {
                    self.dispatch(Intent::OpenEditor);
                    self.editor_text_input(&key.key);
                    return true;
                }
            }
        }

        match key_intent(key, kind, self.config.direction) {
            Some(intent) => self.dispatch(intent),
            None => false,
        }
    }

    pub fn handle_cell_click(&mut self, position: CellPosition) {
        self.handle_mouse(position, MouseKind::Click);
    }

    pub fn handle_cell_double_click(&mut self, position: CellPosition) {
        self.handle_mouse(position, MouseKind::DoubleClick);
    }

    pub fn handle_cell_context_menu(&mut self, position: CellPosition) {
        self.handle_mouse(position, MouseKind::ContextMenu);
    }

    fn handle_mouse(&mut self, position: CellPosition, kind: MouseKind) {
        let mut event = CellMouseEvent::default();

        let data_row = usize::try_from(position.row_idx)
            .ok()
            .filter(|&r| r < self.rows.len());
        if let (Some(row_idx), Some(column)) = (data_row, self.layout.get(position.idx)) {
            let hook = match kind {
                MouseKind::Click => self.callbacks.on_cell_click.as_mut(),
                MouseKind::DoubleClick => self.callbacks.on_cell_double_click.as_mut(),
                MouseKind::ContextMenu => self.callbacks.on_cell_context_menu.as_mut(),
            };
            if let (Some(hook), Some(row)) = (hook, self.rows.get(row_idx)) {
                hook(
                    &CellMouseArgs {
                        position,
                        row,
                        row_idx,
                        column_key: column.key(),
                    },
                    &mut event,
                );
            }
        }

        let open_editor = match (event.select_request, event.default_prevented) {
            (Some(open_editor), _) => open_editor,
            (None, true) => return,
            (None, false) => matches!(kind, MouseKind::DoubleClick),
        };
        self.select_cell(position, open_editor);
    }

    /// Header click or Enter/Space on a header cell of a sortable column.
    ///
    /// The next sort specification goes to the sort callback; the grid keeps
    /// rendering the current one until the caller sets it.
    pub fn handle_header_sort(&mut self, idx: usize, additive: bool) {
        let Some(column) = self.layout.get(idx).filter(|c| c.sortable) else {
            return;
        };
        let next = next_sort_columns(
            &self.sort_columns,
            column.key(),
            additive,
            column.column.sort_descending_first,
        );
        tracing::debug!(column = column.key(), additive, sort_columns = next.len(), "sort");
        if let Some(f) = self.callbacks.on_sort_columns_change.as_mut() {
            f(&next);
        }
    }

    /// Drag of a column's resize handle.
    pub fn handle_column_resize(&mut self, idx: usize, width: f32) {
        let Some(column) = self.layout.get(idx).filter(|c| c.resizable) else {
            return;
        };
        if !width.is_finite() {
            return;
        }
        let mut width = width.max(column.min_width);
        if let Some(max) = column.max_width {
            width = width.min(max);
        }
        self.resized_widths.insert(column.key().to_string(), width);
        self.relayout();
        if let Some(f) = self.callbacks.on_column_resize.as_mut() {
            f(idx, width);
        }
    }

    // ---- editor ----

    /// The editor replaced the in-progress row.
    pub fn editor_row_change(&mut self, row: R, commit: bool) {
        self.dispatch(Intent::EditRow { row, commit });
    }

    /// Text typed into the default text editor.
    pub fn editor_text_input(&mut self, text: &str) {
        let Some(position) = self.machine.active() else {
            return;
        };
        let (Some(row), Some(column)) = (
            self.machine.state().mode.editing_row(),
            self.layout.get(position.idx),
        ) else {
            return;
        };
        let row = apply_text_edit(row, column.key(), text);
        self.editor_row_change(row, false);
    }

    /// Focus left the editor.
    pub fn handle_editor_blur(&mut self) {
        self.dispatch(Intent::Blur);
    }

    // ---- row selection ----

    /// Row checkbox change. `shift` extends from the last toggled row.
    pub fn toggle_row_selection(&mut self, row_idx: usize, checked: bool, shift: bool) {
        self.dispatch(Intent::ToggleRowSelection {
            row_idx,
            checked,
            shift,
        });
    }

    /// Header select-all checkbox change.
    pub fn toggle_all_rows(&mut self, checked: bool) {
        self.dispatch(Intent::ToggleAllRows(checked));
    }

    // ---- focus ----

    /// A cell element, or focusable content inside it, received DOM focus.
    pub fn handle_cell_focus(&mut self, position: CellPosition, is_child: bool) {
        self.focus.on_cell_focus(position, is_child);
    }

    /// DOM focus left the grid.
    pub fn handle_focus_out(&mut self) {
        self.focus.on_focus_out();
    }

    fn is_header_row(&self, row_idx: i32) -> bool {
        matches!(
            self.nav_context().bounds().region(row_idx),
            Some(RowRegion::Header)
        )
    }
}

/// A single printable character without command modifiers.
fn is_printable(key: &KeyInput) -> bool {
    let mut chars = key.key.chars();
    let single = matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_control());
    single && !key.ctrl && !key.meta && !key.alt
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
    use test_case::test_case;

    #[test_case("a", false => true; "letter")]
    #[test_case(" ", false => true; "space")]
    #[test_case("a", true => false; "ctrl letter")]
    #[test_case("Enter", false => false; "named key")]
    #[test_case("ArrowDown", false => false; "arrow")]
    fn test_is_printable(key: &str, ctrl: bool) -> bool {
        let mut input = KeyInput::new(key);
        input.ctrl = ctrl;
        is_printable(&input)
    }
}
