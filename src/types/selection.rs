use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::{CellPosition, RowKey};

/// Coarse state of the selection machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionKind {
    /// No active cell
    #[default]
    None,
    /// A cell is active, not editing
    Selected,
    /// The active cell is in edit mode
    Editing,
}

/// Active cell and edit mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellMode<R> {
    #[default]
    None,
    Selected(CellPosition),
    Editing {
        position: CellPosition,
        /// Key of the edited row, so the session follows it when rows move
        row_key: RowKey,
        /// In-progress row, including uncommitted changes
        row: R,
        /// Row as it was when the editor opened
        original: R,
    },
}

impl<R> CellMode<R> {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Self::None => SelectionKind::None,
            Self::Selected(_) => SelectionKind::Selected,
            Self::Editing { .. } => SelectionKind::Editing,
        }
    }

    pub fn position(&self) -> Option<CellPosition> {
        match self {
            Self::None => None,
            Self::Selected(position) | Self::Editing { position, .. } => Some(*position),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    /// The in-progress row while editing.
    pub fn editing_row(&self) -> Option<&R> {
        match self {
            Self::Editing { row, .. } => Some(row),
            _ => None,
        }
    }
}

/// Cell marked by a copy gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedCell<R> {
    pub position: CellPosition,
    pub column_key: String,
    /// Snapshot of the source row at copy time
    pub row: R,
}

/// Engine-owned selection state.
///
/// Row selection lives with the caller; only the anchor of the last toggle
/// is kept here so shift-click can extend from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState<R> {
    pub mode: CellMode<R>,
    pub copied: Option<CopiedCell<R>>,
    /// Data rows covered by an in-progress drag fill (source row excluded)
    pub dragged_over: Option<Range<usize>>,
    /// Data row of the last row-selection toggle
    pub last_toggled_row: Option<usize>,
}

impl<R> Default for SelectionState<R> {
    fn default() -> Self {
        Self {
            mode: CellMode::None,
            copied: None,
            dragged_over: None,
            last_toggled_row: None,
        }
    }
}

impl<R> SelectionState<R> {
    pub fn active(&self) -> Option<CellPosition> {
        self.mode.position()
    }

    pub fn is_copied(&self, position: CellPosition) -> bool {
        self.copied.as_ref().is_some_and(|c| c.position == position)
    }

    pub fn is_dragged_over(&self, position: CellPosition) -> bool {
        let Some(range) = &self.dragged_over else {
            return false;
        };
        let Some(active) = self.active() else {
            return false;
        };
        active.idx == position.idx
            && usize::try_from(position.row_idx).is_ok_and(|r| range.contains(&r))
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

    #[test]
    fn test_mode_kind() {
        let mode: CellMode<()> = CellMode::None;
        assert_eq!(mode.kind(), SelectionKind::None);
        assert_eq!(mode.position(), None);

        let mode: CellMode<()> = CellMode::Selected(CellPosition::new(1, 2));
        assert_eq!(mode.kind(), SelectionKind::Selected);
        assert_eq!(mode.position(), Some(CellPosition::new(1, 2)));

        let mode = CellMode::Editing {
            position: CellPosition::new(0, 0),
            row_key: RowKey::from(0usize),
            row: 1,
            original: 0,
        };
        assert!(mode.is_editing());
        assert_eq!(mode.editing_row(), Some(&1));
    }

    #[test]
    fn test_dragged_over_matches_active_column() {
        let state: SelectionState<()> = SelectionState {
            mode: CellMode::Selected(CellPosition::new(2, 1)),
            dragged_over: Some(3..6),
            ..SelectionState::default()
        };
        assert!(state.is_dragged_over(CellPosition::new(3, 1)));
        assert!(state.is_dragged_over(CellPosition::new(5, 1)));
        assert!(!state.is_dragged_over(CellPosition::new(6, 1)));
        assert!(!state.is_dragged_over(CellPosition::new(4, 0)));
        assert!(!state.is_dragged_over(CellPosition::new(-1, 1)));
    }
}
