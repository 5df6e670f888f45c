//! Cell views: one rendered cell with its flags, tab index and content.

use serde::Serialize;

use super::RenderContext;
use crate::editor::text_editor;
use crate::focus::CellTabIndex;
use crate::layout::CalculatedColumn;
use crate::span::SpanSegment;
use crate::types::{
    CellContent, CellFlags, CellMode, CellPosition, CellRenderProps, EditCellProps, GridRow,
    SummaryCellProps,
};

/// A materialized cell.
///
/// `left` is in content coordinates; frozen cells (see [`CellFlags::FROZEN`])
/// stay pinned at that offset while the grid scrolls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub idx: usize,
    pub column_key: String,
    /// 1-based
    pub aria_col_index: usize,
    pub aria_col_span: Option<usize>,
    pub aria_selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_sort: Option<&'static str>,
    pub left: f32,
    /// Width of every column the cell covers
    pub width: f32,
    pub tab_index: i32,
    pub child_tab_index: i32,
    pub flags: CellFlags,
    pub class_name: Option<String>,
    pub content: CellContent,
}

impl CellView {
    pub fn position(&self, row_idx: i32) -> CellPosition {
        CellPosition::new(row_idx, self.idx)
    }

    pub fn col_span(&self) -> usize {
        self.aria_col_span.unwrap_or(1)
    }

    pub fn is_tab_stop(&self) -> bool {
        self.tab_index == 0
    }
}

/// Geometry, structural flags and tab index shared by every cell kind.
pub(crate) fn base_cell<'c, R, SR>(
    ctx: &RenderContext<'c, R, SR>,
    row_idx: i32,
    segment: SpanSegment,
) -> Option<(CellView, &'c CalculatedColumn<R, SR>)> {
    let columns = ctx.nav.columns;
    let column = columns.get(segment.idx)?;
    let position = CellPosition::new(row_idx, segment.idx);
    let active = ctx.selection.active();

    let left = column.left;
    let right = columns
        .col_positions
        .get(segment.end())
        .copied()
        .unwrap_or_else(|| column.right());

    let mut flags = CellFlags::empty();
    if active == Some(position) {
        flags |= CellFlags::SELECTED;
    }
    if column.frozen {
        flags |= CellFlags::FROZEN;
    }
    if columns
        .last_frozen_column_index
        .is_some_and(|last| segment.covers(last))
    {
        flags |= CellFlags::FROZEN_LAST;
    }
    if segment.span > 1 {
        flags |= CellFlags::SPANNED;
    }

    let CellTabIndex {
        tab_index,
        child_tab_index,
    } = ctx.focus.cell_tab_index(position, active);

    let view = CellView {
        idx: segment.idx,
        column_key: column.key().to_string(),
        aria_col_index: segment.idx + 1,
        aria_col_span: (segment.span > 1).then_some(segment.span),
        aria_selected: flags.contains(CellFlags::SELECTED),
        aria_readonly: None,
        aria_sort: None,
        left,
        width: right - left,
        tab_index,
        child_tab_index,
        flags,
        class_name: None,
        content: CellContent::Empty,
    };
    Some((view, column))
}

/// A data cell. While the cell is being edited the column's edit renderer
/// (or the default text editor) replaces the display content.
pub(crate) fn data_cell<R: GridRow, SR>(
    ctx: &RenderContext<'_, R, SR>,
    row: &R,
    row_idx: usize,
    is_row_selected: bool,
    segment: SpanSegment,
) -> Option<CellView> {
    let row_idx_i32 = crate::types::to_i32(row_idx);
    let (mut view, column) = base_cell(ctx, row_idx_i32, segment)?;
    let position = view.position(row_idx_i32);
    let key = column.key();

    let is_editable = column.is_editable(row);
    let is_editing = matches!(
        &ctx.selection.mode,
        CellMode::Editing { position: p, .. } if *p == position
    );

    if is_editable {
        view.flags |= CellFlags::EDITABLE;
    } else {
        view.aria_readonly = Some(true);
    }
    if is_editing {
        view.flags |= CellFlags::EDITING;
    }
    if ctx.selection.is_copied(position) {
        view.flags |= CellFlags::COPIED;
    }
    if ctx.selection.is_dragged_over(position) {
        view.flags |= CellFlags::DRAGGED_OVER;
    }
    if is_editable && matches!(ctx.selection.mode, CellMode::Selected(p) if p == position) {
        view.flags |= CellFlags::DRAG_HANDLE;
    }

    view.class_name = column.column.cell_class.as_ref().and_then(|f| f(row));

    view.content = if is_editing {
        let props = EditCellProps {
            column_key: key,
            row,
            row_idx,
        };
        match &column.column.render_edit_cell {
            Some(render) => render(&props),
            None => text_editor(&props),
        }
    } else if let Some(render) = &column.column.render {
        render(row.cell_value(key).as_ref(), row, row_idx)
    } else if let Some(render) = &column.column.render_cell {
        render(&CellRenderProps {
            column_key: key,
            row,
            row_idx,
            is_cell_editable: is_editable,
            is_row_selected,
            tab_index: view.child_tab_index,
        })
    } else {
        row.cell_value(key)
            .map_or(CellContent::Empty, |value| CellContent::text(value.display()))
    };

    Some(view)
}

/// A summary cell. Columns without a summary renderer render empty.
pub(crate) fn summary_cell<R, SR>(
    ctx: &RenderContext<'_, R, SR>,
    row: &SR,
    row_idx: i32,
    segment: SpanSegment,
) -> Option<CellView> {
    let (mut view, column) = base_cell(ctx, row_idx, segment)?;
    view.class_name = column
        .column
        .summary_cell_class
        .as_ref()
        .and_then(|f| f(row));
    if let Some(render) = &column.column.render_summary_cell {
        view.content = render(&SummaryCellProps {
            column_key: column.key(),
            row,
            tab_index: view.child_tab_index,
        });
    }
    Some(view)
}
