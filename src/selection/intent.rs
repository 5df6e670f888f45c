//! Input intents and the keyboard mapping that produces them.

use serde::{Deserialize, Serialize};

use crate::config::Direction;
use crate::types::{CellPosition, SelectionKind};

/// Direction of a navigation intent.
///
/// `Left` and `Right` are logical (previous/next column); right-to-left
/// grids swap the arrow keys before producing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    /// First column of the row
    RowStart,
    /// Last column of the row
    RowEnd,
    /// First column of the first row
    GridStart,
    /// Last column of the last row
    GridEnd,
}

/// A discrete user action consumed by the selection machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent<R> {
    SelectCell {
        position: CellPosition,
        open_editor: bool,
    },
    Navigate(NavDirection),
    Tab {
        shift: bool,
    },
    /// Enter/F2 on the active cell
    OpenEditor,
    /// The editor changed the in-progress row
    EditRow {
        row: R,
        commit: bool,
    },
    /// Commit the in-progress row; `advance` moves to the next row
    Commit {
        advance: bool,
    },
    /// Escape: discard the edit, or clear the copied marker
    Cancel,
    /// Focus left the editor
    Blur,
    Copy,
    Paste,
    /// The drag-fill handle is over a data row
    DragOver(usize),
    DragEnd,
    ToggleRowSelection {
        row_idx: usize,
        checked: bool,
        shift: bool,
    },
    ToggleAllRows(bool),
}

impl<R> Intent<R> {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectCell { .. } => "select_cell",
            Self::Navigate(_) => "navigate",
            Self::Tab { .. } => "tab",
            Self::OpenEditor => "open_editor",
            Self::EditRow { .. } => "edit_row",
            Self::Commit { .. } => "commit",
            Self::Cancel => "cancel",
            Self::Blur => "blur",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::DragOver(_) => "drag_over",
            Self::DragEnd => "drag_end",
            Self::ToggleRowSelection { .. } => "toggle_row_selection",
            Self::ToggleAllRows(_) => "toggle_all_rows",
        }
    }
}

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyInput {
    /// `KeyboardEvent.key` value, e.g. `ArrowDown`, `Enter`, `c`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_ctrl_or_meta(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Map a key press on a cell to an intent.
///
/// While editing, the editor owns every key except Escape, Enter and Tab.
pub fn key_intent<R>(key: &KeyInput, kind: SelectionKind, direction: Direction) -> Option<Intent<R>> {
    if kind == SelectionKind::Editing {
        return match key.key.as_str() {
            "Escape" => Some(Intent::Cancel),
            "Enter" => Some(Intent::Commit { advance: true }),
            "Tab" => Some(Intent::Tab { shift: key.shift }),
            _ => None,
        };
    }

    let rtl = direction == Direction::Rtl;
    let intent = match key.key.as_str() {
        "ArrowUp" => Intent::Navigate(NavDirection::Up),
        "ArrowDown" => Intent::Navigate(NavDirection::Down),
        "ArrowLeft" if rtl => Intent::Navigate(NavDirection::Right),
        "ArrowLeft" => Intent::Navigate(NavDirection::Left),
        "ArrowRight" if rtl => Intent::Navigate(NavDirection::Left),
        "ArrowRight" => Intent::Navigate(NavDirection::Right),
        "Home" if key.is_ctrl_or_meta() => Intent::Navigate(NavDirection::GridStart),
        "Home" => Intent::Navigate(NavDirection::RowStart),
        "End" if key.is_ctrl_or_meta() => Intent::Navigate(NavDirection::GridEnd),
        "End" => Intent::Navigate(NavDirection::RowEnd),
        "PageUp" => Intent::Navigate(NavDirection::PageUp),
        "PageDown" => Intent::Navigate(NavDirection::PageDown),
        "Tab" => Intent::Tab { shift: key.shift },
        "Enter" | "F2" => Intent::OpenEditor,
        "Escape" => Intent::Cancel,
        "c" | "C" if key.is_ctrl_or_meta() => Intent::Copy,
        "v" | "V" if key.is_ctrl_or_meta() => Intent::Paste,
        _ => return None,
    };
    Some(intent)
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

    fn map(key: KeyInput, kind: SelectionKind, direction: Direction) -> Option<Intent<()>> {
        key_intent(&key, kind, direction)
    }

    #[test_case(KeyInput::new("ArrowDown") => Some(Intent::Navigate(NavDirection::Down)); "arrow down")]
    #[test_case(KeyInput::new("ArrowLeft") => Some(Intent::Navigate(NavDirection::Left)); "arrow left")]
    #[test_case(KeyInput::new("Home").with_ctrl() => Some(Intent::Navigate(NavDirection::GridStart)); "ctrl home")]
    #[test_case(KeyInput::new("End") => Some(Intent::Navigate(NavDirection::RowEnd)); "end")]
    #[test_case(KeyInput::new("Tab").with_shift() => Some(Intent::Tab { shift: true }); "shift tab")]
    #[test_case(KeyInput::new("F2") => Some(Intent::OpenEditor); "f2")]
    #[test_case(KeyInput::new("c").with_ctrl() => Some(Intent::Copy); "ctrl c")]
    #[test_case(KeyInput::new("c") => None; "plain c")]
    fn test_selected_key_map(key: KeyInput) -> Option<Intent<()>> {
        map(key, SelectionKind::Selected, Direction::Ltr)
    }

    #[test]
    fn test_rtl_swaps_horizontal_arrows() {
        assert_eq!(
            map(KeyInput::new("ArrowLeft"), SelectionKind::Selected, Direction::Rtl),
            Some(Intent::Navigate(NavDirection::Right))
        );
        assert_eq!(
            map(KeyInput::new("ArrowRight"), SelectionKind::Selected, Direction::Rtl),
            Some(Intent::Navigate(NavDirection::Left))
        );
    }

    #[test]
    fn test_editor_owns_keys_while_editing() {
        assert_eq!(
            map(KeyInput::new("ArrowDown"), SelectionKind::Editing, Direction::Ltr),
            None
        );
        assert_eq!(
            map(KeyInput::new("Enter"), SelectionKind::Editing, Direction::Ltr),
            Some(Intent::Commit { advance: true })
        );
        assert_eq!(
            map(KeyInput::new("Escape"), SelectionKind::Editing, Direction::Ltr),
            Some(Intent::Cancel)
        );
    }
}
