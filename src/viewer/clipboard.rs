//! Copy, paste and drag fill for `DataGrid`.
//!
//! Copy only records a marker and reports the copied value; writing to the
//! system clipboard is left to the host.

use super::DataGrid;
use crate::selection::Intent;
use crate::types::GridRow;

/// Escape a value for TSV clipboard text.
///
/// Values containing tabs, line breaks or quotes are wrapped in quotes with
/// inner quotes doubled.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl<R: GridRow + 'static, SR: 'static> DataGrid<R, SR> {
    /// Ctrl/Cmd+C on the active cell.
    pub fn copy(&mut self) {
        self.dispatch(Intent::Copy);
    }

    /// Ctrl/Cmd+V on the active cell.
    pub fn paste(&mut self) {
        self.dispatch(Intent::Paste);
    }

    /// The drag-fill handle moved over a data row.
    pub fn drag_fill_over(&mut self, row_idx: usize) {
        self.dispatch(Intent::DragOver(row_idx));
    }

    /// The drag-fill handle was released.
    pub fn drag_fill_end(&mut self) {
        self.dispatch(Intent::DragEnd);
    }

    /// Clipboard text for the copied cell, if any.
    pub fn copied_text(&self) -> Option<String> {
        let copied = self.machine.state().copied.as_ref()?;
        let value = copied.row.cell_value(&copied.column_key)?;
        Some(escape_cell_value(&value.display()))
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
    use test_case::test_case;

    #[test_case("plain" => "plain"; "plain")]
    #[test_case("a\tb" => "\"a\tb\""; "tab")]
    #[test_case("two\nlines" => "\"two\nlines\""; "newline")]
    #[test_case("say \"hi\"" => "\"say \"\"hi\"\"\""; "quotes")]
    fn test_escape_cell_value(value: &str) -> String {
        escape_cell_value(value)
    }
}
