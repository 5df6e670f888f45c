//! Roving tab index and focus restoration.
//!
//! Only the active cell carries `tabIndex = 0`; every other cell gets `-1`.
//! With no active cell the grid container is the single tab stop. Each
//! cell derives its own tab index by comparing its position against the
//! active position, so cells never reference each other.
//!
//! DOM focus can be lost when virtualization unmounts the focused cell. The
//! manager parks focus on the grid container (the focus sink) instead of
//! letting it fall to the document, and moves it back once a cell at the
//! active position is mounted again.

use serde::Serialize;

use crate::types::CellPosition;

/// Tab indices for a cell and for focusable content inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellTabIndex {
    pub tab_index: i32,
    pub child_tab_index: i32,
}

impl CellTabIndex {
    pub const INACTIVE: Self = Self {
        tab_index: -1,
        child_tab_index: -1,
    };

    pub fn is_tab_stop(&self) -> bool {
        self.tab_index == 0
    }
}

/// DOM focus operation the host should perform after a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FocusCommand {
    /// Focus the cell element at this position
    FocusCell { position: CellPosition },
    /// Park focus on the grid container
    FocusSink,
}

/// Roving focus state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RovingFocus {
    /// Cell whose element (or content) holds DOM focus
    focused: Option<CellPosition>,
    /// Focus is on content inside `focused`, not the cell element
    child_focused: bool,
    /// Focus must move to this cell as soon as it is mounted
    pending: Option<CellPosition>,
    /// Focus currently sits on the sink, waiting for a cell to remount
    parked: bool,
}

impl RovingFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab index of the grid container.
    pub fn grid_tab_index(&self, active: Option<CellPosition>) -> i32 {
        if active.is_some() {
            -1
        } else {
            0
        }
    }

    /// Tab indices for the cell at `position`.
    ///
    /// A cell whose content holds focus reports `-1` so Shift+Tab can leave it.
    pub fn cell_tab_index(
        &self,
        position: CellPosition,
        active: Option<CellPosition>,
    ) -> CellTabIndex {
        if active != Some(position) {
            return CellTabIndex::INACTIVE;
        }
        let child_has_focus = self.child_focused && self.focused == Some(position);
        CellTabIndex {
            tab_index: if child_has_focus { -1 } else { 0 },
            child_tab_index: 0,
        }
    }

    pub fn focused(&self) -> Option<CellPosition> {
        self.focused
    }

    pub fn has_focus(&self) -> bool {
        self.focused.is_some() || self.parked
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }

    /// Ask for DOM focus to follow the active cell on the next pass.
    pub fn request_focus(&mut self, position: CellPosition) {
        self.pending = Some(position);
    }

    /// A cell element, or content inside it, received focus.
    pub fn on_cell_focus(&mut self, position: CellPosition, is_child: bool) {
        self.focused = Some(position);
        self.child_focused = is_child;
        self.parked = false;
        if self.pending == Some(position) {
            self.pending = None;
        }
    }

    /// Focus left the grid entirely.
    pub fn on_focus_out(&mut self) {
        *self = Self::default();
    }

    /// Let focus leave the grid (Tab at the first or last cell).
    pub fn release(&mut self) {
        tracing::debug!(focused = ?self.focused, "focus released");
        self.on_focus_out();
    }

    /// Reconcile DOM focus with the active cell after a render pass.
    ///
    /// `is_mounted` reports whether a cell element exists at a position.
    /// While editing, the editor owns focus and no command is issued.
    pub fn reconcile(
        &mut self,
        active: Option<CellPosition>,
        editing: bool,
        is_mounted: impl Fn(CellPosition) -> bool,
    ) -> Option<FocusCommand> {
        let Some(active) = active else {
            self.pending = None;
            if self.focused.take().is_some() {
                self.child_focused = false;
                self.parked = true;
                tracing::debug!("active cell cleared, focus parked on grid");
                return Some(FocusCommand::FocusSink);
            }
            return None;
        };

        if editing {
            self.pending = None;
            return None;
        }

        // Focus inside the grid follows the active cell
        if self.pending.is_some_and(|p| p != active) || (self.parked && self.pending.is_none()) {
            self.pending = Some(active);
        }

        if self.pending == Some(active) {
            if is_mounted(active) {
                self.pending = None;
                self.parked = false;
                self.focused = Some(active);
                self.child_focused = false;
                tracing::debug!(row_idx = active.row_idx, idx = active.idx, "focus cell");
                return Some(FocusCommand::FocusCell { position: active });
            }
            if self.focused.take().is_some() {
                self.child_focused = false;
                self.parked = true;
                tracing::debug!("focus target not mounted, focus parked on grid");
                return Some(FocusCommand::FocusSink);
            }
            return None;
        }

        if let Some(focused) = self.focused.filter(|&f| !is_mounted(f)) {
            // Focused cell unmounted by virtualization
            self.focused = None;
            self.child_focused = false;
            self.parked = true;
            if focused == active {
                self.pending = Some(active);
            }
            tracing::debug!(row_idx = focused.row_idx, idx = focused.idx, "focused cell unmounted, focus parked on grid");
            return Some(FocusCommand::FocusSink);
        }

        None
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

    fn pos(row_idx: i32, idx: usize) -> CellPosition {
        CellPosition::new(row_idx, idx)
    }

    #[test]
    fn test_single_tab_stop() {
        let focus = RovingFocus::new();
        let active = Some(pos(2, 1));
        let stops = (0..5)
            .flat_map(|r| (0..3).map(move |c| pos(r, c)))
            .filter(|&p| focus.cell_tab_index(p, active).is_tab_stop())
            .count();
        assert_eq!(stops, 1);
        assert_eq!(focus.grid_tab_index(active), -1);
    }

    #[test]
    fn test_grid_is_tab_stop_without_active_cell() {
        let focus = RovingFocus::new();
        assert_eq!(focus.grid_tab_index(None), 0);
        assert_eq!(focus.cell_tab_index(pos(0, 0), None), CellTabIndex::INACTIVE);
    }

    #[test]
    fn test_child_focus_gives_up_cell_tab_stop() {
        let mut focus = RovingFocus::new();
        let active = pos(0, 0);
        focus.on_cell_focus(active, true);
        let tab = focus.cell_tab_index(active, Some(active));
        assert_eq!(tab.tab_index, -1);
        assert_eq!(tab.child_tab_index, 0);
    }

    #[test]
    fn test_requested_focus_follows_active_cell() {
        let mut focus = RovingFocus::new();
        focus.request_focus(pos(1, 1));
        let cmd = focus.reconcile(Some(pos(1, 1)), false, |_| true);
        assert_eq!(cmd, Some(FocusCommand::FocusCell { position: pos(1, 1) }));
        assert_eq!(focus.focused(), Some(pos(1, 1)));
        // Nothing more to do on the next pass
        assert_eq!(focus.reconcile(Some(pos(1, 1)), false, |_| true), None);
    }

    #[test]
    fn test_unmount_parks_then_restores() {
        let mut focus = RovingFocus::new();
        let active = pos(40, 0);
        focus.on_cell_focus(active, false);

        // Row scrolled out of the materialized window
        let cmd = focus.reconcile(Some(active), false, |_| false);
        assert_eq!(cmd, Some(FocusCommand::FocusSink));
        assert!(focus.is_parked());
        assert!(focus.has_focus());

        // Still unmounted: stay parked without more commands
        assert_eq!(focus.reconcile(Some(active), false, |_| false), None);

        // Remounted at the same logical position
        let cmd = focus.reconcile(Some(active), false, |_| true);
        assert_eq!(cmd, Some(FocusCommand::FocusCell { position: active }));
        assert!(!focus.is_parked());
    }

    #[test]
    fn test_clearing_active_cell_parks_focus() {
        let mut focus = RovingFocus::new();
        focus.on_cell_focus(pos(3, 0), false);
        assert_eq!(focus.reconcile(None, false, |_| true), Some(FocusCommand::FocusSink));
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn test_editing_suppresses_commands() {
        let mut focus = RovingFocus::new();
        focus.request_focus(pos(0, 0));
        assert_eq!(focus.reconcile(Some(pos(0, 0)), true, |_| true), None);
    }

    #[test]
    fn test_focus_out_forgets_everything() {
        let mut focus = RovingFocus::new();
        focus.on_cell_focus(pos(0, 0), false);
        focus.on_focus_out();
        assert!(!focus.has_focus());
        assert_eq!(focus.reconcile(Some(pos(0, 0)), false, |_| false), None);
    }
}
