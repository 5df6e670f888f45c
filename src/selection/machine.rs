//! The selection and navigation state machine.
//!
//! `NONE → SELECTED ⇄ EDITING`. Every transition is a pure function of the
//! current state and one intent; outward changes (row updates, row selection,
//! focus) are returned as [`Effect`]s for the caller to apply.

use std::collections::HashSet;

use super::intent::{Intent, NavDirection};
use super::rows::{select_all_rows, toggle_row_selection};
use crate::layout::{CalculatedColumn, ColumnLayout, RowOffsets};
use crate::span::covering_segment;
use crate::types::{
    CellMode, CellPosition, ColSpanArgs, CopiedCell, GridRow, RowBounds, RowKey, RowRegion,
    SelectionKind, SelectionState,
};

/// Row key accessor: `(row, row_idx) -> key`.
pub type RowKeyFn<'a, R> = &'a dyn Fn(&R, usize) -> RowKey;

/// Read-only view of the grid the machine navigates over.
pub struct NavContext<'a, R, SR = ()> {
    pub columns: &'a ColumnLayout<R, SR>,
    pub rows: &'a [R],
    pub top_summary_rows: &'a [SR],
    pub bottom_summary_rows: &'a [SR],
    pub offsets: &'a RowOffsets,
    /// Height available to data rows, used by PageUp/PageDown
    pub page_height: f32,
    pub row_key: RowKeyFn<'a, R>,
    pub selected_rows: &'a HashSet<RowKey>,
}

impl<'a, R, SR> NavContext<'a, R, SR> {
    pub fn bounds(&self) -> RowBounds {
        RowBounds::new(
            self.top_summary_rows.len(),
            self.rows.len(),
            self.bottom_summary_rows.len(),
        )
    }

    /// Span context for any row index.
    pub fn span_args(&self, row_idx: i32) -> Option<ColSpanArgs<'a, R, SR>> {
        match self.bounds().region(row_idx)? {
            RowRegion::Header => Some(ColSpanArgs::Header),
            RowRegion::TopSummary(i) => self
                .top_summary_rows
                .get(i)
                .map(|row| ColSpanArgs::Summary { row }),
            RowRegion::Row(i) => self
                .rows
                .get(i)
                .map(|row| ColSpanArgs::Row { row, row_idx: i }),
            RowRegion::BottomSummary(i) => self
                .bottom_summary_rows
                .get(i)
                .map(|row| ColSpanArgs::Summary { row }),
        }
    }

    /// Data row at a row index, with its index into `rows`.
    pub fn data_row(&self, row_idx: i32) -> Option<(usize, &'a R)> {
        let idx = usize::try_from(row_idx).ok()?;
        self.rows.get(idx).map(|row| (idx, row))
    }

    pub fn column(&self, idx: usize) -> Option<&'a CalculatedColumn<R, SR>> {
        self.columns.get(idx)
    }

    pub fn is_within_bounds(&self, position: CellPosition) -> bool {
        self.bounds().contains(position.row_idx) && position.idx < self.columns.len()
    }

    /// Only data rows can be edited.
    pub fn is_editable(&self, position: CellPosition) -> bool {
        match (self.data_row(position.row_idx), self.column(position.idx)) {
            (Some((_, row)), Some(column)) => column.is_editable(row),
            _ => false,
        }
    }

    fn row_key_of(&self, row: &R, row_idx: usize) -> RowKey {
        (self.row_key)(row, row_idx)
    }

    /// Current index of the data row with `key`.
    pub fn index_of_key(&self, key: &RowKey) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .position(|(idx, row)| self.row_key_of(row, idx) == *key)
    }

    /// The cell that owns `position`: itself, or the anchor of the span
    /// covering it.
    pub fn anchor(&self, position: CellPosition) -> CellPosition {
        self.span_args(position.row_idx)
            .and_then(|args| covering_segment(self.columns, position.idx, &args))
            .map_or(position, |segment| CellPosition::new(position.row_idx, segment.idx))
    }
}

/// Outward change produced by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<R> {
    /// The active cell moved (or was cleared)
    SelectedCellChange(Option<CellPosition>),
    /// Row update callback: fire and forget
    RowChange {
        row_idx: usize,
        row_key: RowKey,
        row: R,
    },
    /// New selected-rows set for the caller to store
    SelectedRowsChange(HashSet<RowKey>),
    /// DOM focus should follow this cell
    RequestFocus(CellPosition),
    /// Let focus leave the grid (browser default tabbing)
    ReleaseFocus,
    /// A cell was copied; the host may write it to a clipboard
    Copy { row: R, column_key: String },
    ScrollIntoView(CellPosition),
}

/// Owns the active cell, edit mode and copy/drag markers.
#[derive(Debug, Clone)]
pub struct SelectionMachine<R> {
    state: SelectionState<R>,
}

impl<R> Default for SelectionMachine<R> {
    fn default() -> Self {
        Self {
            state: SelectionState::default(),
        }
    }
}

impl<R: GridRow> SelectionMachine<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState<R> {
        &self.state
    }

    pub fn kind(&self) -> SelectionKind {
        self.state.mode.kind()
    }

    pub fn active(&self) -> Option<CellPosition> {
        self.state.active()
    }

    pub fn is_editing(&self) -> bool {
        self.state.mode.is_editing()
    }

    /// Caller override of the active cell (controlled state).
    ///
    /// An edit in progress at another position is dropped without a commit.
    pub fn set_active(&mut self, position: Option<CellPosition>) {
        if self.state.active() == position {
            return;
        }
        self.state.mode = position.map_or(CellMode::None, CellMode::Selected);
        self.state.dragged_over = None;
    }

    /// Apply one intent. Undefined combinations are no-ops.
    pub fn apply<SR>(&mut self, intent: Intent<R>, ctx: &NavContext<'_, R, SR>) -> Vec<Effect<R>> {
        let from = self.kind();
        let name = intent.name();
        let mut effects = Vec::new();

        match intent {
            Intent::SelectCell {
                position,
                open_editor,
            } => self.select_cell(position, open_editor, ctx, &mut effects),
            Intent::Navigate(direction) => self.navigate(direction, ctx, &mut effects),
            Intent::Tab { shift } => self.tab(shift, ctx, &mut effects),
            Intent::OpenEditor => self.open_editor(ctx),
            Intent::EditRow { row, commit } => {
                if let CellMode::Editing { row: editing, .. } = &mut self.state.mode {
                    *editing = row;
                    if commit {
                        self.commit(false, true, ctx, &mut effects);
                    }
                }
            }
            Intent::Commit { advance } => self.commit(advance, true, ctx, &mut effects),
            Intent::Cancel => self.cancel(&mut effects),
            Intent::Blur => self.finish_edit_outside(ctx, &mut effects),
            Intent::Copy => self.copy(ctx, &mut effects),
            Intent::Paste => self.paste(ctx, &mut effects),
            Intent::DragOver(row) => self.drag_over(row, ctx),
            Intent::DragEnd => self.drag_end(ctx, &mut effects),
            Intent::ToggleRowSelection {
                row_idx,
                checked,
                shift,
            } => self.toggle_row(row_idx, checked, shift, ctx, &mut effects),
            Intent::ToggleAllRows(checked) => {
                self.state.last_toggled_row = None;
                let next = select_all_rows(ctx.rows, |row, idx| ctx.row_key_of(row, idx), checked);
                effects.push(Effect::SelectedRowsChange(next));
            }
        }

        tracing::trace!(
            intent = name,
            ?from,
            to = ?self.kind(),
            active = ?self.active(),
            effects = effects.len(),
            "selection transition"
        );
        effects
    }

    /// Re-validate internal state against the current rows and columns.
    ///
    /// An active cell whose row or column disappeared is cleared rather than
    /// left dangling.
    pub fn reconcile<SR>(&mut self, ctx: &NavContext<'_, R, SR>) -> Vec<Effect<R>> {
        let mut effects = Vec::new();

        let before = self.state.active();
        self.follow_edited_row(ctx);

        if let Some(active) = self.state.active() {
            if !ctx.is_within_bounds(active) {
                tracing::debug!(row_idx = active.row_idx, idx = active.idx, "active cell out of bounds, cleared");
                self.state.mode = CellMode::None;
            } else if self.state.mode.is_editing() && !ctx.is_editable(active) {
                self.state.mode = CellMode::Selected(active);
            }
        }
        if let Some(active) = self.state.active() {
            let anchor = ctx.anchor(active);
            if anchor != active {
                tracing::debug!(idx = active.idx, anchor = anchor.idx, "active cell covered by a span, moved to its anchor");
                self.state.mode = match std::mem::replace(&mut self.state.mode, CellMode::None) {
                    CellMode::Selected(_) => CellMode::Selected(anchor),
                    CellMode::Editing { row_key, row, original, .. } => CellMode::Editing {
                        position: anchor,
                        row_key,
                        row,
                        original,
                    },
                    CellMode::None => CellMode::None,
                };
            }
        }
        let after = self.state.active();
        if after != before {
            effects.push(Effect::SelectedCellChange(after));
        }

        let row_count = ctx.rows.len();
        if let Some(range) = self.state.dragged_over.take() {
            let clamped = range.start..range.end.min(row_count);
            if !clamped.is_empty() && self.state.active().is_some() {
                self.state.dragged_over = Some(clamped);
            }
        }
        if self.state.last_toggled_row.is_some_and(|r| r >= row_count) {
            self.state.last_toggled_row = None;
        }
        if self
            .state
            .copied
            .as_ref()
            .is_some_and(|c| !ctx.is_within_bounds(c.position))
        {
            self.state.copied = None;
        }

        effects
    }

    /// Keep an edit session on its row when the caller reorders or filters
    /// rows. A session whose row is gone is dropped without a commit.
    fn follow_edited_row<SR>(&mut self, ctx: &NavContext<'_, R, SR>) {
        let CellMode::Editing { position, row_key, .. } = &mut self.state.mode else {
            return;
        };
        match ctx.index_of_key(row_key) {
            Some(idx) => position.row_idx = crate::types::to_i32(idx),
            None => {
                tracing::debug!(%row_key, "edited row removed, edit discarded");
                let position = *position;
                self.state.mode = CellMode::Selected(position);
            }
        }
    }

    fn select_cell<SR>(
        &mut self,
        position: CellPosition,
        open_editor: bool,
        ctx: &NavContext<'_, R, SR>,
        effects: &mut Vec<Effect<R>>,
    ) {
        if !ctx.is_within_bounds(position) {
            return;
        }
        let position = ctx.anchor(position);
        if let CellMode::Editing {
            position: editing_at,
            ..
        } = &self.state.mode
        {
            if *editing_at == position {
                return;
            }
            self.finish_edit_outside(ctx, effects);
        }

        let previous = self.state.active();
        let editor_row = if open_editor && ctx.is_editable(position) {
            ctx.data_row(position.row_idx)
        } else {
            None
        };
        match editor_row {
            Some((row_idx, row)) => {
                self.state.mode = CellMode::Editing {
                    position,
                    row_key: ctx.row_key_of(row, row_idx),
                    row: row.clone(),
                    original: row.clone(),
                };
            }
            None => {
                self.state.mode = CellMode::Selected(position);
                effects.push(Effect::RequestFocus(position));
            }
        }

        if previous != Some(position) {
            effects.push(Effect::SelectedCellChange(Some(position)));
        }
        effects.push(Effect::ScrollIntoView(position));
    }

    fn navigate<SR>(
        &mut self,
        direction: NavDirection,
        ctx: &NavContext<'_, R, SR>,
        effects: &mut Vec<Effect<R>>,
    ) {
        let CellMode::Selected(current) = self.state.mode else {
            return;
        };
        let Some(next) = next_position(current, direction, ctx) else {
            return;
        };
        if next == current {
            return;
        }
        self.move_to(next, effects);
    }

    fn move_to(&mut self, next: CellPosition, effects: &mut Vec<Effect<R>>) {
        self.state.mode = CellMode::Selected(next);
        effects.push(Effect::SelectedCellChange(Some(next)));
        effects.push(Effect::RequestFocus(next));
        effects.push(Effect::ScrollIntoView(next));
    }

    fn tab<SR>(&mut self, shift: bool, ctx: &NavContext<'_, R, SR>, effects: &mut Vec<Effect<R>>) {
        if self.state.mode.is_editing() {
            self.commit(false, false, ctx, effects);
        }
        let Some(current) = self.state.active() else {
            return;
        };
        match tab_target(current, shift, ctx) {
            Some(next) => self.move_to(next, effects),
            None => effects.push(Effect::ReleaseFocus),
        }
    }

    fn open_editor<SR>(&mut self, ctx: &NavContext<'_, R, SR>) {
        let CellMode::Selected(position) = self.state.mode else {
            return;
        };
        if !ctx.is_editable(position) {
            return;
        }
        if let Some((row_idx, row)) = ctx.data_row(position.row_idx) {
            self.state.mode = CellMode::Editing {
                position,
                row_key: ctx.row_key_of(row, row_idx),
                row: row.clone(),
                original: row.clone(),
            };
        }
    }

    fn commit<SR>(
        &mut self,
        advance: bool,
        request_focus: bool,
        ctx: &NavContext<'_, R, SR>,
        effects: &mut Vec<Effect<R>>,
    ) {
        if !self.state.mode.is_editing() {
            return;
        }
        let CellMode::Editing {
            position,
            row_key,
            row,
            original,
        } = std::mem::replace(&mut self.state.mode, CellMode::None)
        else {
            return;
        };

        self.state.mode = CellMode::Selected(position);
        if row != original {
            // The edited row is addressed by key, never by a stale index
            if let Some(row_idx) = ctx.index_of_key(&row_key) {
                effects.push(Effect::RowChange { row_idx, row_key, row });
            }
        }

        if advance {
            if let Some(next) = next_position(position, NavDirection::Down, ctx).filter(|&n| n != position) {
                self.move_to(next, effects);
                return;
            }
        }
        if request_focus {
            effects.push(Effect::RequestFocus(position));
        }
    }

    fn cancel(&mut self, effects: &mut Vec<Effect<R>>) {
        match &self.state.mode {
            CellMode::Editing { position, .. } => {
                let position = *position;
                self.state.mode = CellMode::Selected(position);
                effects.push(Effect::RequestFocus(position));
            }
            CellMode::Selected(_) => {
                self.state.copied = None;
            }
            CellMode::None => {}
        }
    }

    /// Focus left the editor: commit or discard per the column's options.
    fn finish_edit_outside<SR>(&mut self, ctx: &NavContext<'_, R, SR>, effects: &mut Vec<Effect<R>>) {
        let Some(position) = self.state.mode.is_editing().then(|| self.state.active()).flatten() else {
            return;
        };
        let commit = ctx
            .column(position.idx)
            .map_or(true, |c| c.column.editor_options.commit_on_outside_click);
        if commit {
            self.commit(false, false, ctx, effects);
        } else {
            self.state.mode = CellMode::Selected(position);
        }
    }

    fn copy<SR>(&mut self, ctx: &NavContext<'_, R, SR>, effects: &mut Vec<Effect<R>>) {
        let CellMode::Selected(position) = self.state.mode else {
            return;
        };
        let (Some((_, row)), Some(column)) = (ctx.data_row(position.row_idx), ctx.column(position.idx))
        else {
            return;
        };
        self.state.copied = Some(CopiedCell {
            position,
            column_key: column.key().to_string(),
            row: row.clone(),
        });
        effects.push(Effect::Copy {
            row: row.clone(),
            column_key: column.key().to_string(),
        });
    }

    fn paste<SR>(&mut self, ctx: &NavContext<'_, R, SR>, effects: &mut Vec<Effect<R>>) {
        let CellMode::Selected(target) = self.state.mode else {
            return;
        };
        let Some(copied) = &self.state.copied else {
            return;
        };
        if !ctx.is_editable(target) {
            return;
        }
        let (Some((row_idx, row)), Some(column)) = (ctx.data_row(target.row_idx), ctx.column(target.idx))
        else {
            return;
        };
        let value = copied.row.cell_value(&copied.column_key).unwrap_or_default();
        let updated = row.with_cell_value(column.key(), value);
        if updated != *row {
            effects.push(Effect::RowChange {
                row_idx,
                row_key: ctx.row_key_of(row, row_idx),
                row: updated,
            });
        }
    }

    fn drag_over<SR>(&mut self, row: usize, ctx: &NavContext<'_, R, SR>) {
        let CellMode::Selected(active) = self.state.mode else {
            return;
        };
        let Some((source, _)) = ctx.data_row(active.row_idx) else {
            return;
        };
        if row >= ctx.rows.len() {
            return;
        }
        self.state.dragged_over = if row > source {
            Some(source + 1..row + 1)
        } else if row < source {
            Some(row..source)
        } else {
            None
        };
    }

    /// Apply the fill source to every editable row of the dragged range.
    ///
    /// Each row is updated independently.
    fn drag_end<SR>(&mut self, ctx: &NavContext<'_, R, SR>, effects: &mut Vec<Effect<R>>) {
        let Some(range) = self.state.dragged_over.take() else {
            return;
        };
        let CellMode::Selected(active) = self.state.mode else {
            return;
        };
        let Some(column) = ctx.column(active.idx) else {
            return;
        };

        let value = match &self.state.copied {
            Some(copied) => copied.row.cell_value(&copied.column_key),
            None => ctx
                .data_row(active.row_idx)
                .and_then(|(_, row)| row.cell_value(column.key())),
        }
        .unwrap_or_default();

        for row_idx in range {
            let Some(row) = ctx.rows.get(row_idx) else {
                continue;
            };
            if !column.is_editable(row) {
                continue;
            }
            let updated = row.with_cell_value(column.key(), value.clone());
            if updated != *row {
                effects.push(Effect::RowChange {
                    row_idx,
                    row_key: ctx.row_key_of(row, row_idx),
                    row: updated,
                });
            }
        }
    }

    fn toggle_row<SR>(
        &mut self,
        row_idx: usize,
        checked: bool,
        shift: bool,
        ctx: &NavContext<'_, R, SR>,
        effects: &mut Vec<Effect<R>>,
    ) {
        if row_idx >= ctx.rows.len() || (shift && self.state.mode.is_editing()) {
            return;
        }
        let extend_from = if shift {
            self.state.last_toggled_row
        } else {
            None
        };
        let next = toggle_row_selection(
            ctx.selected_rows,
            ctx.rows,
            |row, idx| ctx.row_key_of(row, idx),
            row_idx,
            checked,
            extend_from,
        );
        self.state.last_toggled_row = Some(row_idx);
        effects.push(Effect::SelectedRowsChange(next));
    }
}

/// Snap a candidate to the cell covering it.
///
/// Moving forward into the middle of a span jumps past the span; any other
/// move lands on the span's anchor.
fn snap_to_span<R, SR>(
    candidate: CellPosition,
    current: CellPosition,
    move_next: bool,
    ctx: &NavContext<'_, R, SR>,
) -> CellPosition {
    let Some(args) = ctx.span_args(candidate.row_idx) else {
        return candidate;
    };
    let Some(segment) = covering_segment(ctx.columns, candidate.idx, &args) else {
        return candidate;
    };
    if segment.idx == candidate.idx {
        return candidate;
    }
    if move_next {
        let past = segment.end();
        if past < ctx.columns.len() {
            return CellPosition::new(candidate.row_idx, past);
        }
        return current;
    }
    CellPosition::new(candidate.row_idx, segment.idx)
}

fn page_target<R, SR>(row: usize, down: bool, ctx: &NavContext<'_, R, SR>) -> usize {
    let offsets = ctx.offsets;
    if down {
        let y = offsets.row_top(row) + ctx.page_height;
        if y >= offsets.total_height() {
            return ctx.rows.len().saturating_sub(1);
        }
        offsets.row_at(y).unwrap_or(row)
    } else {
        let y = offsets.row_top(row) + offsets.row_height(row) - ctx.page_height;
        if y < 0.0 {
            return 0;
        }
        offsets.row_at(y).unwrap_or(row)
    }
}

/// Position after an arrow/Home/End/Page key, clamped to the grid (no wraparound).
fn next_position<R, SR>(
    current: CellPosition,
    direction: NavDirection,
    ctx: &NavContext<'_, R, SR>,
) -> Option<CellPosition> {
    let bounds = ctx.bounds();
    let max_idx = ctx.columns.len().checked_sub(1)?;
    let row_idx = current.row_idx;
    let idx = current.idx;

    let (row_idx, idx, move_next) = match direction {
        NavDirection::Up => (row_idx - 1, idx, false),
        NavDirection::Down => (row_idx + 1, idx, false),
        NavDirection::Left => (row_idx, idx.saturating_sub(1), false),
        NavDirection::Right => (row_idx, idx.saturating_add(1).min(max_idx), true),
        NavDirection::RowStart => (row_idx, 0, false),
        NavDirection::RowEnd => (row_idx, max_idx, false),
        NavDirection::GridStart => (bounds.min_row_idx(), 0, false),
        NavDirection::GridEnd => (bounds.max_row_idx(), max_idx, false),
        NavDirection::PageUp | NavDirection::PageDown => {
            // Paging only moves within the data rows
            let (row, _) = ctx.data_row(row_idx)?;
            let target = page_target(row, direction == NavDirection::PageDown, ctx);
            (crate::types::to_i32(target), idx, false)
        }
    };

    let candidate = CellPosition::new(bounds.clamp(row_idx), idx.min(max_idx));
    Some(snap_to_span(candidate, current, move_next, ctx))
}

/// Tab target, wrapping between rows. `None` at the first/last cell.
fn tab_target<R, SR>(
    current: CellPosition,
    shift: bool,
    ctx: &NavContext<'_, R, SR>,
) -> Option<CellPosition> {
    let bounds = ctx.bounds();
    let max_idx = ctx.columns.len().checked_sub(1)?;

    if shift {
        let candidate = if current.idx == 0 {
            if current.row_idx <= bounds.min_row_idx() {
                return None;
            }
            CellPosition::new(current.row_idx - 1, max_idx)
        } else {
            CellPosition::new(current.row_idx, current.idx - 1)
        };
        return Some(snap_to_span(candidate, current, false, ctx));
    }

    // Skip the rest of a span the active cell covers
    let next_idx = ctx
        .span_args(current.row_idx)
        .and_then(|args| covering_segment(ctx.columns, current.idx, &args))
        .map_or(current.idx + 1, |segment| segment.end());

    if next_idx > max_idx {
        if current.row_idx >= bounds.max_row_idx() {
            return None;
        }
        return Some(CellPosition::new(current.row_idx + 1, 0));
    }
    Some(CellPosition::new(current.row_idx, next_idx))
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
    use crate::config::DefaultColumnOptions;
    use crate::layout::resolve_columns;
    use crate::types::{CellValue, Column, ColumnWidth, JsonRow};
    use serde_json::json;
    use std::collections::HashMap;
    use std::rc::Rc;

    struct Fixture {
        columns: ColumnLayout<JsonRow>,
        rows: Vec<JsonRow>,
        offsets: RowOffsets,
        selected: HashSet<RowKey>,
    }

    fn key(_: &JsonRow, idx: usize) -> RowKey {
        RowKey::from(idx)
    }

    impl Fixture {
        fn new(row_count: usize) -> Self {
            let columns: Vec<_> = vec![
                Column::new("id", "ID"),
                Column::new("title", "Title").editable(),
                Column::new("note", "Note").editable(),
            ]
            .into_iter()
            .map(|c| Rc::new(c.with_width(ColumnWidth::Px(100.0))))
            .collect();
            let rows = (0..row_count)
                .map(|i| json!({"id": i, "title": format!("t{i}"), "note": ""}).as_object().cloned().unwrap())
                .collect();
            Self {
                columns: resolve_columns(&columns, 300.0, &DefaultColumnOptions::default(), &HashMap::new())
                    .unwrap(),
                rows,
                offsets: RowOffsets::uniform(35.0, row_count),
                selected: HashSet::new(),
            }
        }

        fn ctx(&self) -> NavContext<'_, JsonRow> {
            NavContext {
                columns: &self.columns,
                rows: &self.rows,
                top_summary_rows: &[],
                bottom_summary_rows: &[],
                offsets: &self.offsets,
                page_height: 350.0,
                row_key: &key,
                selected_rows: &self.selected,
            }
        }
    }

    fn select(machine: &mut SelectionMachine<JsonRow>, fx: &Fixture, row_idx: i32, idx: usize) {
        machine.apply(
            Intent::SelectCell {
                position: CellPosition::new(row_idx, idx),
                open_editor: false,
            },
            &fx.ctx(),
        );
    }

    #[test]
    fn test_select_cell_out_of_bounds_is_ignored() {
        let fx = Fixture::new(5);
        let mut machine = SelectionMachine::new();
        let effects = machine.apply(
            Intent::SelectCell {
                position: CellPosition::new(9, 0),
                open_editor: false,
            },
            &fx.ctx(),
        );
        assert!(effects.is_empty());
        assert_eq!(machine.kind(), SelectionKind::None);
    }

    #[test]
    fn test_select_cell_with_editor_on_read_only_column_only_selects() {
        let fx = Fixture::new(5);
        let mut machine = SelectionMachine::new();
        machine.apply(
            Intent::SelectCell {
                position: CellPosition::new(1, 0),
                open_editor: true,
            },
            &fx.ctx(),
        );
        assert_eq!(machine.kind(), SelectionKind::Selected);
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let fx = Fixture::new(5);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 0);

        let effects = machine.apply(Intent::Navigate(NavDirection::Left), &fx.ctx());
        assert!(effects.is_empty());
        assert_eq!(machine.active(), Some(CellPosition::new(0, 0)));

        // Up from row 0 lands on the header row
        machine.apply(Intent::Navigate(NavDirection::Up), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(-1, 0)));
        let effects = machine.apply(Intent::Navigate(NavDirection::Up), &fx.ctx());
        assert!(effects.is_empty());

        machine.apply(Intent::Navigate(NavDirection::GridEnd), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(4, 2)));
        machine.apply(Intent::Navigate(NavDirection::Right), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(4, 2)));
    }

    #[test]
    fn test_tab_wraps_and_releases_at_edges() {
        let fx = Fixture::new(2);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 2);

        machine.apply(Intent::Tab { shift: false }, &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(1, 0)));

        select(&mut machine, &fx, 1, 2);
        let effects = machine.apply(Intent::Tab { shift: false }, &fx.ctx());
        assert_eq!(effects, vec![Effect::ReleaseFocus]);
        assert_eq!(machine.active(), Some(CellPosition::new(1, 2)));

        select(&mut machine, &fx, -1, 0);
        let effects = machine.apply(Intent::Tab { shift: true }, &fx.ctx());
        assert_eq!(effects, vec![Effect::ReleaseFocus]);
    }

    #[test]
    fn test_edit_commit_emits_single_row_change() {
        let fx = Fixture::new(3);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 2, 1);
        machine.apply(Intent::OpenEditor, &fx.ctx());
        assert!(machine.is_editing());

        let edited = fx.rows[2].with_cell_value("title", CellValue::Text("new".into()));
        machine.apply(
            Intent::EditRow {
                row: edited.clone(),
                commit: false,
            },
            &fx.ctx(),
        );
        let effects = machine.apply(Intent::Blur, &fx.ctx());

        let changes: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, Effect::RowChange { .. }))
            .collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0],
            &Effect::RowChange {
                row_idx: 2,
                row_key: RowKey::Int(2),
                row: edited,
            }
        );
        assert_eq!(machine.kind(), SelectionKind::Selected);
        assert_eq!(machine.active(), Some(CellPosition::new(2, 1)));
    }

    #[test]
    fn test_unchanged_commit_skips_row_update() {
        let fx = Fixture::new(3);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 1);
        machine.apply(Intent::OpenEditor, &fx.ctx());
        let effects = machine.apply(Intent::Commit { advance: false }, &fx.ctx());
        assert!(!effects.iter().any(|e| matches!(e, Effect::RowChange { .. })));
    }

    #[test]
    fn test_escape_discards_edit() {
        let fx = Fixture::new(3);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 1);
        machine.apply(Intent::OpenEditor, &fx.ctx());
        machine.apply(
            Intent::EditRow {
                row: fx.rows[0].with_cell_value("title", CellValue::Null),
                commit: false,
            },
            &fx.ctx(),
        );
        let effects = machine.apply(Intent::Cancel, &fx.ctx());
        assert_eq!(effects, vec![Effect::RequestFocus(CellPosition::new(0, 1))]);
        assert_eq!(machine.kind(), SelectionKind::Selected);
    }

    #[test]
    fn test_enter_while_editing_commits_and_advances() {
        let fx = Fixture::new(3);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 1);
        machine.apply(Intent::OpenEditor, &fx.ctx());
        machine.apply(Intent::Commit { advance: true }, &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(1, 1)));
    }

    #[test]
    fn test_copy_paste() {
        let fx = Fixture::new(3);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 1);
        let effects = machine.apply(Intent::Copy, &fx.ctx());
        assert!(matches!(effects[0], Effect::Copy { ref column_key, .. } if column_key == "title"));
        assert!(machine.state().is_copied(CellPosition::new(0, 1)));

        select(&mut machine, &fx, 2, 2);
        let effects = machine.apply(Intent::Paste, &fx.ctx());
        let Effect::RowChange { row_idx, row, .. } = &effects[0] else {
            panic!("expected row change");
        };
        assert_eq!(*row_idx, 2);
        assert_eq!(row.cell_value("note"), Some(CellValue::Text("t0".into())));

        // Escape clears the copied marker
        machine.apply(Intent::Cancel, &fx.ctx());
        assert!(machine.state().copied.is_none());
    }

    #[test]
    fn test_drag_fill_updates_each_row() {
        let fx = Fixture::new(6);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 1, 1);
        machine.apply(Intent::DragOver(4), &fx.ctx());
        assert_eq!(machine.state().dragged_over, Some(2..5));

        let effects = machine.apply(Intent::DragEnd, &fx.ctx());
        let rows: Vec<usize> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::RowChange { row_idx, row, .. } => {
                    assert_eq!(row.cell_value("title"), Some(CellValue::Text("t1".into())));
                    Some(*row_idx)
                }
                _ => None,
            })
            .collect();
        assert_eq!(rows, vec![2, 3, 4]);
        assert_eq!(machine.state().dragged_over, None);
    }

    #[test]
    fn test_row_toggle_is_orthogonal() {
        let fx = Fixture::new(8);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 3, 0);
        let effects = machine.apply(
            Intent::ToggleRowSelection {
                row_idx: 5,
                checked: true,
                shift: false,
            },
            &fx.ctx(),
        );
        assert_eq!(effects.len(), 1);
        assert_eq!(machine.active(), Some(CellPosition::new(3, 0)));
        assert_eq!(machine.state().last_toggled_row, Some(5));
    }

    #[test]
    fn test_shift_toggle_while_editing_is_noop() {
        let fx = Fixture::new(8);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 3, 1);
        machine.apply(Intent::OpenEditor, &fx.ctx());
        let effects = machine.apply(
            Intent::ToggleRowSelection {
                row_idx: 5,
                checked: true,
                shift: true,
            },
            &fx.ctx(),
        );
        assert!(effects.is_empty());
        assert!(machine.is_editing());
    }

    #[test]
    fn test_reconcile_clears_removed_row() {
        let fx = Fixture::new(8);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 7, 0);

        let smaller = Fixture::new(4);
        let effects = machine.reconcile(&smaller.ctx());
        assert_eq!(effects, vec![Effect::SelectedCellChange(None)]);
        assert_eq!(machine.kind(), SelectionKind::None);
    }

    #[test]
    fn test_page_down_and_up() {
        let fx = Fixture::new(100);
        let mut machine = SelectionMachine::new();
        select(&mut machine, &fx, 0, 0);
        machine.apply(Intent::Navigate(NavDirection::PageDown), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(10, 0)));
        machine.apply(Intent::Navigate(NavDirection::PageUp), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(1, 0)));
        machine.apply(Intent::Navigate(NavDirection::PageUp), &fx.ctx());
        assert_eq!(machine.active(), Some(CellPosition::new(0, 0)));
    }
}
