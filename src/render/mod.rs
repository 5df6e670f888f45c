//! Frame composition.
//!
//! A frame is the fully owned description of everything the host must mount
//! for one render pass:
//! - the header row, sticky summary rows and the materialized data rows
//! - per-cell selection, editing, frozen and span classifications
//! - tab indices derived from the single active position
//! - measuring cells for content-sized columns
//!
//! Content is produced by the columns' renderers and composed without
//! inspection.

mod cell;
mod header;
mod row;

pub use cell::CellView;
pub use row::{column_ranges, materialized_rows, RowKind, RowView};

use serde::Serialize;

use crate::config::{Direction, GridConfig};
use crate::focus::{FocusCommand, RovingFocus};
use crate::layout::{ScrollMetrics, Viewport};
use crate::selection::rows::header_selection_state;
use crate::selection::NavContext;
use crate::types::{
    CellPosition, ColumnWidth, GridRow, RowRegion, SelectionKind, SelectionState, SortColumn,
    SELECT_COLUMN_KEY,
};

/// Everything a render pass reads.
pub struct RenderContext<'a, R, SR = ()> {
    pub nav: &'a NavContext<'a, R, SR>,
    pub selection: &'a SelectionState<R>,
    pub focus: &'a RovingFocus,
    pub viewport: &'a Viewport,
    pub scroll: ScrollMetrics,
    pub sort_columns: &'a [SortColumn],
    pub config: &'a GridConfig,
}

/// A column the host should measure for content-driven sizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuringCell {
    pub key: String,
    pub idx: usize,
    pub min_width: f32,
    pub max_width: Option<f32>,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFrame {
    pub viewport: Viewport,
    /// Scroll position the frame was composed for
    pub scroll: ScrollMetrics,
    pub total_width: f32,
    /// Header, summary and data rows together
    pub total_height: f32,
    pub header_row_height: f32,
    pub summary_row_height: f32,
    pub column_widths: Vec<f32>,
    pub total_frozen_width: f32,
    pub grid_tab_index: i32,
    pub aria_row_count: usize,
    pub aria_col_count: usize,
    pub aria_multiselectable: bool,
    pub direction: Direction,
    pub header: RowView,
    pub top_summary_rows: Vec<RowView>,
    pub rows: Vec<RowView>,
    pub bottom_summary_rows: Vec<RowView>,
    pub measuring_cells: Vec<MeasuringCell>,
    pub selection: SelectionKind,
    pub active: Option<CellPosition>,
    /// DOM focus operation to perform once the frame is mounted
    pub focus_command: Option<FocusCommand>,
}

impl GridFrame {
    /// Every materialized row, top to bottom.
    pub fn all_rows(&self) -> impl Iterator<Item = &RowView> {
        std::iter::once(&self.header)
            .chain(self.top_summary_rows.iter())
            .chain(self.rows.iter())
            .chain(self.bottom_summary_rows.iter())
    }

    pub fn row(&self, row_idx: i32) -> Option<&RowView> {
        self.all_rows().find(|r| r.row_idx == row_idx)
    }

    pub fn cell(&self, position: CellPosition) -> Option<&CellView> {
        self.row(position.row_idx)?.cell(position.idx)
    }

    /// Whether a cell element exists at `position` in this frame.
    pub fn is_mounted(&self, position: CellPosition) -> bool {
        self.cell(position).is_some()
    }

    /// Elements carrying `tabIndex = 0`, the grid container included.
    pub fn tab_stop_count(&self) -> usize {
        let cells = self
            .all_rows()
            .flat_map(|r| r.cells.iter())
            .filter(|c| c.is_tab_stop())
            .count();
        cells + usize::from(self.grid_tab_index == 0)
    }
}

fn to_f32(n: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let value = n as f32;
    value
}

/// Compose a frame. `focus_command` is left empty; the caller reconciles
/// focus against the composed frame.
pub fn compose_frame<R: GridRow, SR>(ctx: &RenderContext<'_, R, SR>) -> GridFrame {
    let nav = ctx.nav;
    let columns = nav.columns;
    let bounds = nav.bounds();
    let active = ctx.selection.active();

    let _span = tracing::debug_span!(
        "compose_frame",
        rows = ?ctx.viewport.rows,
        cols = ?ctx.viewport.cols,
    )
    .entered();

    let ranges = column_ranges(ctx.viewport, active.map(|a| a.idx));

    let header_height = ctx.config.header_row_height();
    let summary_height = ctx.config.summary_row_height();
    let content_top = header_height + to_f32(bounds.top_summary_rows) * summary_height;

    let selection = header_selection_state(nav.selected_rows, nav.rows, |row, idx| {
        (nav.row_key)(row, idx)
    });
    let header = row::header_row(ctx, &ranges, selection);

    let top_summary_rows = (0..bounds.top_summary_rows)
        .filter_map(|i| row::summary_row(ctx, RowRegion::TopSummary(i), &ranges))
        .collect();
    let bottom_summary_rows = (0..bounds.bottom_summary_rows)
        .filter_map(|j| row::summary_row(ctx, RowRegion::BottomSummary(j), &ranges))
        .collect();

    let active_row = active.and_then(|a| usize::try_from(a.row_idx).ok());
    let rows: Vec<RowView> = materialized_rows(ctx.viewport, active_row)
        .into_iter()
        .filter_map(|row_idx| row::data_row(ctx, row_idx, &ranges, content_top))
        .collect();

    let measuring_cells = ranges
        .iter()
        .flat_map(|r| r.clone())
        .filter_map(|idx| columns.get(idx))
        .filter(|c| c.column.width == ColumnWidth::MaxContent)
        .map(|c| MeasuringCell {
            key: c.key().to_string(),
            idx: c.idx,
            min_width: c.min_width,
            max_width: c.max_width,
        })
        .collect();

    let total_height = content_top
        + nav.offsets.total_height()
        + to_f32(bounds.bottom_summary_rows) * summary_height;

    tracing::trace!(
        rows = rows.len(),
        cells = rows.iter().map(|r| r.cells.len()).sum::<usize>(),
        "frame composed"
    );

    GridFrame {
        viewport: ctx.viewport.clone(),
        scroll: ctx.scroll,
        total_width: columns.total_width,
        total_height,
        header_row_height: header_height,
        summary_row_height: summary_height,
        column_widths: columns.columns.iter().map(|c| c.width).collect(),
        total_frozen_width: columns.total_frozen_width,
        grid_tab_index: ctx.focus.grid_tab_index(active),
        aria_row_count: 1 + bounds.top_summary_rows + bounds.rows + bounds.bottom_summary_rows,
        aria_col_count: columns.len(),
        aria_multiselectable: columns.by_key(SELECT_COLUMN_KEY).is_some(),
        direction: ctx.config.direction,
        header,
        top_summary_rows,
        rows,
        bottom_summary_rows,
        measuring_cells,
        selection: ctx.selection.mode.kind(),
        active,
        focus_command: None,
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
    use crate::config::DefaultColumnOptions;
    use crate::layout::{resolve_columns, ColumnLayout, RowOffsets};
    use crate::types::{
        CellContent, CellFlags, CellMode, Column, JsonRow, RowFlags, RowKey, SortDirection,
    };
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    struct Fixture {
        columns: ColumnLayout<JsonRow, JsonRow>,
        rows: Vec<JsonRow>,
        top: Vec<JsonRow>,
        bottom: Vec<JsonRow>,
        offsets: RowOffsets,
        selected: HashSet<RowKey>,
        config: GridConfig,
    }

    fn key(_: &JsonRow, idx: usize) -> RowKey {
        RowKey::from(idx)
    }

    impl Fixture {
        fn new() -> Self {
            let columns: Vec<Rc<Column<JsonRow, JsonRow>>> = vec![
                Rc::new(Column::new("id", "ID").with_width(ColumnWidth::Px(60.0)).frozen()),
                Rc::new(
                    Column::new("title", "Title")
                        .with_width(ColumnWidth::Px(120.0))
                        .editable()
                        .sortable()
                        .with_col_span(|args| match args {
                            crate::types::ColSpanArgs::Row { row_idx: 1, .. } => Some(2),
                            _ => None,
                        }),
                ),
                Rc::new(Column::new("note", "Note").with_width(ColumnWidth::Px(120.0))),
                Rc::new(
                    Column::new("total", "Total")
                        .with_width(ColumnWidth::Px(80.0))
                        .with_render_summary_cell(|props: &crate::types::SummaryCellProps<'_, JsonRow>| {
                            CellContent::text(
                                props
                                    .row
                                    .get("total")
                                    .map(ToString::to_string)
                                    .unwrap_or_default(),
                            )
                        }),
                ),
            ];
            let columns = resolve_columns(
                &columns,
                600.0,
                &DefaultColumnOptions::default(),
                &HashMap::new(),
            )
            .unwrap();
            let rows: Vec<JsonRow> = (0..5)
                .map(|i| {
                    json!({"id": i, "title": format!("t{i}"), "note": "n"})
                        .as_object()
                        .cloned()
                        .unwrap()
                })
                .collect();
            let summary = json!({"total": 5}).as_object().cloned().unwrap();
            Self {
                columns,
                offsets: RowOffsets::uniform(35.0, rows.len()),
                rows,
                top: vec![summary.clone()],
                bottom: vec![summary],
                selected: [RowKey::Int(3)].into_iter().collect(),
                config: GridConfig {
                    show_summary_border: true,
                    ..GridConfig::default()
                },
            }
        }

        fn nav(&self) -> NavContext<'_, JsonRow, JsonRow> {
            NavContext {
                columns: &self.columns,
                rows: &self.rows,
                top_summary_rows: &self.top,
                bottom_summary_rows: &self.bottom,
                offsets: &self.offsets,
                page_height: 175.0,
                row_key: &key,
                selected_rows: &self.selected,
            }
        }
    }

    fn compose(fx: &Fixture, selection: &SelectionState<JsonRow>, sort: &[SortColumn]) -> GridFrame {
        let nav = fx.nav();
        let viewport = Viewport {
            rows: 0..5,
            cols: 1..4,
            frozen_count: 1,
            visible_rows: 0..5,
            visible_cols: 1..4,
        };
        let focus = RovingFocus::new();
        compose_frame(&RenderContext {
            nav: &nav,
            selection,
            focus: &focus,
            viewport: &viewport,
            scroll: ScrollMetrics::default(),
            sort_columns: sort,
            config: &fx.config,
        })
    }

    #[test]
    fn test_frame_regions_and_row_indices() {
        let fx = Fixture::new();
        let frame = compose(&fx, &SelectionState::default(), &[]);
        assert_eq!(frame.header.row_idx, -2);
        assert_eq!(frame.header.aria_row_index, 1);
        assert_eq!(frame.top_summary_rows[0].row_idx, -1);
        assert_eq!(frame.top_summary_rows[0].top, Some(35.0));
        assert_eq!(frame.bottom_summary_rows[0].row_idx, 5);
        assert_eq!(frame.bottom_summary_rows[0].bottom, Some(0.0));
        assert_eq!(frame.rows.len(), 5);
        assert_eq!(frame.rows[0].top, Some(70.0));
        assert_eq!(frame.aria_row_count, 8);
        assert_eq!(frame.total_height, 35.0 * 8.0);
        assert_eq!(frame.grid_tab_index, 0);
        assert_eq!(frame.tab_stop_count(), 1);
    }

    #[test]
    fn test_summary_border_and_content() {
        let fx = Fixture::new();
        let frame = compose(&fx, &SelectionState::default(), &[]);
        let top = &frame.top_summary_rows[0];
        assert!(top.flags.contains(RowFlags::SUMMARY | RowFlags::TOP_SUMMARY));
        assert!(top.flags.contains(RowFlags::SUMMARY_BORDER));
        assert_eq!(top.cell(3).unwrap().content, CellContent::text("5"));
        assert_eq!(top.cell(0).unwrap().content, CellContent::Empty);
    }

    #[test]
    fn test_spanned_row_skips_covered_column() {
        let fx = Fixture::new();
        let frame = compose(&fx, &SelectionState::default(), &[]);
        assert_eq!(frame.rows[1].cell_indices(), vec![0, 1, 3]);
        let spanned = frame.rows[1].cell(1).unwrap();
        assert_eq!(spanned.aria_col_span, Some(2));
        assert_eq!(spanned.width, 240.0);
        assert!(spanned.flags.contains(CellFlags::SPANNED));
        assert_eq!(frame.rows[0].cell_indices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_active_cell_is_the_only_tab_stop() {
        let fx = Fixture::new();
        let selection = SelectionState {
            mode: CellMode::Selected(CellPosition::new(2, 1)),
            ..SelectionState::default()
        };
        let frame = compose(&fx, &selection, &[]);
        assert_eq!(frame.grid_tab_index, -1);
        assert_eq!(frame.tab_stop_count(), 1);
        let cell = frame.cell(CellPosition::new(2, 1)).unwrap();
        assert!(cell.is_tab_stop());
        assert!(cell.flags.contains(CellFlags::SELECTED | CellFlags::DRAG_HANDLE));
        assert!(frame.rows[2].flags.contains(RowFlags::ACTIVE));
    }

    #[test]
    fn test_editing_cell_renders_editor_with_in_progress_row() {
        let fx = Fixture::new();
        let mut row = fx.rows[2].clone();
        row.insert("title".into(), json!("typed"));
        let selection = SelectionState {
            mode: CellMode::Editing {
                position: CellPosition::new(2, 1),
                row_key: RowKey::from(2usize),
                row,
                original: fx.rows[2].clone(),
            },
            ..SelectionState::default()
        };
        let frame = compose(&fx, &selection, &[]);
        let cell = frame.cell(CellPosition::new(2, 1)).unwrap();
        assert!(cell.flags.contains(CellFlags::EDITING));
        assert_eq!(
            cell.content,
            CellContent::TextEditor {
                value: "typed".into()
            }
        );
    }

    #[test]
    fn test_read_only_and_selected_rows() {
        let fx = Fixture::new();
        let frame = compose(&fx, &SelectionState::default(), &[]);
        assert_eq!(frame.rows[0].cell(2).unwrap().aria_readonly, Some(true));
        assert_eq!(frame.rows[0].cell(1).unwrap().aria_readonly, None);
        assert_eq!(frame.rows[3].aria_selected, Some(true));
        assert!(frame.rows[3].flags.contains(RowFlags::SELECTED | RowFlags::ODD));
        assert!(frame.rows[0].flags.contains(RowFlags::EVEN));
    }

    #[test]
    fn test_header_sort_indicator() {
        let fx = Fixture::new();
        let sort = [SortColumn::new("title", SortDirection::Desc)];
        let frame = compose(&fx, &SelectionState::default(), &sort);
        let cell = frame.header.cell(1).unwrap();
        assert_eq!(cell.aria_sort, Some("descending"));
        assert!(cell.flags.contains(CellFlags::SORTABLE));
        assert!(matches!(
            cell.content,
            CellContent::SortableHeader {
                direction: Some(SortDirection::Desc),
                priority: None,
                ..
            }
        ));
        assert_eq!(frame.header.cell(0).unwrap().content, CellContent::text("ID"));
    }

    #[test]
    fn test_multi_sort_reports_priority_without_aria_sort() {
        let fx = Fixture::new();
        let sort = [
            SortColumn::new("note", SortDirection::Asc),
            SortColumn::new("title", SortDirection::Asc),
        ];
        let frame = compose(&fx, &SelectionState::default(), &sort);
        let cell = frame.header.cell(1).unwrap();
        assert_eq!(cell.aria_sort, None);
        assert!(matches!(
            cell.content,
            CellContent::SortableHeader {
                priority: Some(2),
                ..
            }
        ));
    }
}
