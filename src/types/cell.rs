use bitflags::bitflags;
use serde::{Serialize, Serializer};

use super::SortDirection;

/// Content produced by a cell, header or editor renderer.
///
/// The engine composes it into the cell container without inspecting it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellContent {
    #[default]
    Empty,
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Checkbox {
        checked: bool,
        indeterminate: bool,
        disabled: bool,
        tab_index: i32,
    },
    #[serde(rename_all = "camelCase")]
    SortableHeader {
        name: String,
        direction: Option<SortDirection>,
        priority: Option<usize>,
        tab_index: i32,
    },
    TextEditor {
        value: String,
    },
    Custom {
        value: serde_json::Value,
    },
}

impl CellContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

bitflags! {
    /// Structural and state classifications of a rendered cell.
    ///
    /// A presentation layer maps these to styles; the engine never encodes
    /// visual values itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u16 {
        const SELECTED = 1 << 0;
        const EDITING = 1 << 1;
        const FROZEN = 1 << 2;
        const FROZEN_LAST = 1 << 3;
        const SPANNED = 1 << 4;
        const COPIED = 1 << 5;
        const DRAGGED_OVER = 1 << 6;
        const EDITABLE = 1 << 7;
        const SORTABLE = 1 << 8;
        const DRAG_HANDLE = 1 << 9;
    }
}

impl CellFlags {
    /// Class names for the set flags, in declaration order.
    pub fn class_names(self) -> Vec<&'static str> {
        const NAMES: [(CellFlags, &str); 10] = [
            (CellFlags::SELECTED, "gv-cell-selected"),
            (CellFlags::EDITING, "gv-cell-editing"),
            (CellFlags::FROZEN, "gv-cell-frozen"),
            (CellFlags::FROZEN_LAST, "gv-cell-frozen-last"),
            (CellFlags::SPANNED, "gv-cell-spanned"),
            (CellFlags::COPIED, "gv-cell-copied"),
            (CellFlags::DRAGGED_OVER, "gv-cell-dragged-over"),
            (CellFlags::EDITABLE, "gv-cell-editable"),
            (CellFlags::SORTABLE, "gv-cell-sortable"),
            (CellFlags::DRAG_HANDLE, "gv-cell-drag-handle"),
        ];
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Serialize for CellFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.class_names())
    }
}

bitflags! {
    /// Classifications of a rendered row.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RowFlags: u8 {
        const EVEN = 1 << 0;
        const ODD = 1 << 1;
        /// The row's key is in the selected-rows set
        const SELECTED = 1 << 2;
        /// The row holds the active cell
        const ACTIVE = 1 << 3;
        const SUMMARY = 1 << 4;
        const TOP_SUMMARY = 1 << 5;
        const BOTTOM_SUMMARY = 1 << 6;
        const SUMMARY_BORDER = 1 << 7;
    }
}

impl RowFlags {
    pub fn class_names(self) -> Vec<&'static str> {
        const NAMES: [(RowFlags, &str); 8] = [
            (RowFlags::EVEN, "gv-row-even"),
            (RowFlags::ODD, "gv-row-odd"),
            (RowFlags::SELECTED, "gv-row-selected"),
            (RowFlags::ACTIVE, "gv-row-active"),
            (RowFlags::SUMMARY, "gv-summary-row"),
            (RowFlags::TOP_SUMMARY, "gv-top-summary-row"),
            (RowFlags::BOTTOM_SUMMARY, "gv-bottom-summary-row"),
            (RowFlags::SUMMARY_BORDER, "gv-summary-row-border"),
        ];
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Serialize for RowFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.class_names())
    }
}

/// Props handed to a column's cell renderer.
pub struct CellRenderProps<'a, R> {
    pub column_key: &'a str,
    pub row: &'a R,
    pub row_idx: usize,
    pub is_cell_editable: bool,
    pub is_row_selected: bool,
    /// Tab index for focusable content inside the cell
    pub tab_index: i32,
}

/// Props handed to a column's edit renderer.
pub struct EditCellProps<'a, R> {
    pub column_key: &'a str,
    /// The in-progress row, including uncommitted changes
    pub row: &'a R,
    pub row_idx: usize,
}

/// Props handed to a column's summary renderer.
pub struct SummaryCellProps<'a, SR> {
    pub column_key: &'a str,
    pub row: &'a SR,
    pub tab_index: i32,
}

/// Props handed to a column's header renderer.
pub struct HeaderCellProps<'a> {
    pub column_key: &'a str,
    pub name: &'a str,
    pub sortable: bool,
    pub sort_direction: Option<SortDirection>,
    /// 1-based position in a multi-column sort, `None` for single sorts
    pub priority: Option<usize>,
    pub tab_index: i32,
    pub all_rows_selected: bool,
    pub some_rows_selected: bool,
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

    #[test]
    fn test_cell_flag_class_names() {
        let flags = CellFlags::SELECTED | CellFlags::FROZEN | CellFlags::COPIED;
        assert_eq!(
            flags.class_names(),
            vec!["gv-cell-selected", "gv-cell-frozen", "gv-cell-copied"]
        );
        assert!(CellFlags::empty().class_names().is_empty());
    }

    #[test]
    fn test_flags_serialize_as_class_list() {
        let json = serde_json::to_value(RowFlags::ODD | RowFlags::SELECTED).unwrap();
        assert_eq!(json, serde_json::json!(["gv-row-odd", "gv-row-selected"]));
    }

    #[test]
    fn test_content_serialization_is_tagged() {
        let json = serde_json::to_value(CellContent::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hi"}));
        let json = serde_json::to_value(CellContent::Empty).unwrap();
        assert_eq!(json, serde_json::json!({"type": "empty"}));
    }
}
