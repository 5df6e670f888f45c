//! Header row cells: sort indicators and the select-all checkbox.

use super::cell::{base_cell, CellView};
use super::RenderContext;
use crate::sort::sort_state;
use crate::span::SpanSegment;
use crate::types::{CellContent, CellFlags, HeaderCellProps};

/// Select-all checkbox state, `(all, some)`.
pub(crate) type HeaderSelection = (bool, bool);

pub(crate) fn header_cell<R, SR>(
    ctx: &RenderContext<'_, R, SR>,
    row_idx: i32,
    segment: SpanSegment,
    (all_rows_selected, some_rows_selected): HeaderSelection,
) -> Option<CellView> {
    let (mut view, column) = base_cell(ctx, row_idx, segment)?;
    let (sort_direction, priority) = sort_state(ctx.sort_columns, column.key());

    if column.sortable {
        view.flags |= CellFlags::SORTABLE;
    }
    // Multi-column sorts are announced through the indicator, not aria-sort
    if priority.is_none() {
        view.aria_sort = sort_direction.map(|d| d.aria_sort());
    }
    view.class_name = column.column.header_cell_class.clone();

    view.content = if let Some(render) = &column.column.render_header_cell {
        render(&HeaderCellProps {
            column_key: column.key(),
            name: column.name(),
            sortable: column.sortable,
            sort_direction,
            priority,
            tab_index: view.child_tab_index,
            all_rows_selected,
            some_rows_selected,
        })
    } else if column.sortable {
        CellContent::SortableHeader {
            name: column.name().to_string(),
            direction: sort_direction,
            priority,
            tab_index: view.child_tab_index,
        }
    } else {
        CellContent::text(column.name())
    };

    Some(view)
}
