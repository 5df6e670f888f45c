//! Frame composition tests
//!
//! Row regions, aria attributes, renderer capabilities and the serialized
//! frame a host consumes.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{numbered_rows, px, row, TestGrid};
use gridview::render::RowKind;
use gridview::types::{CellContent, CellFlags, RowFlags};
use gridview::{CellPosition, Column, ColumnWidth, GridConfig, JsonRow};
use serde_json::json;

fn summary_grid() -> TestGrid {
    let columns = vec![
        px("id", 60.0).frozen(),
        px("amount", 100.0).with_render_summary_cell(|props| {
            CellContent::text(format!(
                "total {}",
                props.row.get("amount").cloned().unwrap_or_default()
            ))
        }),
    ];
    let config = GridConfig {
        summary_row_height: Some(30.0),
        show_summary_border: true,
        ..GridConfig::default()
    };
    let mut grid = TestGrid::with_config(columns, numbered_rows(4, &["amount"]), config, (400.0, 400.0));
    grid.grid.set_top_summary_rows(vec![
        row(json!({"amount": 1})),
        row(json!({"amount": 2})),
    ]);
    grid.grid.set_bottom_summary_rows(vec![row(json!({"amount": 3}))]);
    grid
}

#[test]
fn test_row_regions_and_aria_indices() {
    let mut grid = summary_grid();
    let frame = grid.render();

    assert_eq!(frame.aria_row_count, 1 + 2 + 4 + 1);
    assert_eq!(frame.aria_col_count, 2);
    assert_eq!(frame.header.row_idx, -3);
    assert_eq!(frame.header.aria_row_index, 1);
    assert_eq!(frame.top_summary_rows[0].row_idx, -2);
    assert_eq!(frame.top_summary_rows[1].aria_row_index, 3);
    assert_eq!(frame.rows[0].aria_row_index, 4);
    assert_eq!(frame.bottom_summary_rows[0].row_idx, 4);
    assert_eq!(frame.bottom_summary_rows[0].aria_row_index, 8);

    let kinds: Vec<RowKind> = frame.all_rows().map(|r| r.kind).collect();
    assert_eq!(kinds[0], RowKind::Header);
    assert_eq!(kinds[1], RowKind::TopSummary);
    assert_eq!(kinds[3], RowKind::Row);
    assert_eq!(kinds[7], RowKind::BottomSummary);
}

#[test]
fn test_sticky_summary_geometry() {
    let mut grid = summary_grid();
    let frame = grid.render();

    assert_eq!(frame.top_summary_rows[0].top, Some(35.0));
    assert_eq!(frame.top_summary_rows[1].top, Some(65.0));
    assert_eq!(frame.bottom_summary_rows[0].bottom, Some(0.0));
    // Data rows start below the header and both top summary rows
    assert_eq!(frame.rows[0].top, Some(95.0));
    assert_eq!(frame.total_height, 95.0 + 4.0 * 35.0 + 30.0);

    assert!(frame.top_summary_rows[1].flags.contains(RowFlags::SUMMARY_BORDER));
    assert!(!frame.top_summary_rows[0].flags.contains(RowFlags::SUMMARY_BORDER));
    assert!(frame.bottom_summary_rows[0].flags.contains(RowFlags::SUMMARY_BORDER));
    assert!(frame.bottom_summary_rows[0]
        .flags
        .contains(RowFlags::SUMMARY | RowFlags::BOTTOM_SUMMARY));
}

#[test]
fn test_summary_renderer() {
    let mut grid = summary_grid();
    let frame = grid.render();
    assert_eq!(
        frame.bottom_summary_rows[0].cell(1).unwrap().content,
        CellContent::text("total 3")
    );
    // No renderer: empty
    assert_eq!(
        frame.bottom_summary_rows[0].cell(0).unwrap().content,
        CellContent::Empty
    );
}

#[test]
fn test_row_parity_and_active_flags() {
    let mut grid = TestGrid::new(vec![px("a", 100.0)], numbered_rows(4, &[]));
    grid.select(1, 0);
    let frame = grid.render();

    assert!(frame.rows[0].flags.contains(RowFlags::EVEN));
    assert!(frame.rows[1].flags.contains(RowFlags::ODD | RowFlags::ACTIVE));
    assert!(!frame.rows[2].flags.contains(RowFlags::ACTIVE));

    let cell = frame.cell(CellPosition::new(1, 0)).unwrap();
    assert!(cell.flags.contains(CellFlags::SELECTED));
    assert!(cell.aria_selected);
    assert_eq!(cell.aria_col_index, 1);
}

#[test]
fn test_renderer_precedence() {
    let columns: Vec<Column<JsonRow, JsonRow>> = vec![
        px("plain", 80.0),
        px("value", 80.0).with_render(|value, _, row_idx| {
            CellContent::text(format!("{row_idx}:{}", value.map(|v| v.display()).unwrap_or_default()))
        }),
        px("props", 80.0).with_render_cell(|props| CellContent::Custom {
            value: json!({"row": props.row_idx, "selected": props.is_row_selected}),
        }),
        px("missing", 80.0),
    ];
    let rows = vec![row(json!({"plain": "p", "value": 5, "props": true}))];
    let mut grid = TestGrid::new(columns, rows);
    let frame = grid.render();
    let row = &frame.rows[0];

    assert_eq!(row.cell(0).unwrap().content, CellContent::text("p"));
    assert_eq!(row.cell(1).unwrap().content, CellContent::text("0:5"));
    assert_eq!(
        row.cell(2).unwrap().content,
        CellContent::Custom {
            value: json!({"row": 0, "selected": false})
        }
    );
    assert_eq!(row.cell(3).unwrap().content, CellContent::Empty);
}

#[test]
fn test_cell_and_header_classes() {
    let columns: Vec<Column<JsonRow, JsonRow>> = vec![px("status", 100.0)
        .with_cell_class(|row: &JsonRow| {
            (row.get("status") == Some(&json!("late"))).then(|| "late".to_string())
        })
        .with_header_cell_class("status-header")];
    let rows = vec![row(json!({"status": "ok"})), row(json!({"status": "late"}))];
    let mut grid = TestGrid::new(columns, rows);
    let frame = grid.render();

    assert_eq!(frame.header.cell(0).unwrap().class_name.as_deref(), Some("status-header"));
    assert_eq!(frame.rows[0].cell(0).unwrap().class_name, None);
    assert_eq!(frame.rows[1].cell(0).unwrap().class_name.as_deref(), Some("late"));
}

#[test]
fn test_measuring_cells_and_measured_width() {
    let columns: Vec<Column<JsonRow, JsonRow>> = vec![
        px("id", 60.0),
        Column::new("desc", "Description")
            .with_width(ColumnWidth::MaxContent)
            .with_min_width(40.0),
    ];
    let mut grid = TestGrid::new(columns, numbered_rows(2, &["desc"]));
    let frame = grid.render();
    assert_eq!(frame.measuring_cells.len(), 1);
    assert_eq!(frame.measuring_cells[0].key, "desc");
    assert_eq!(frame.measuring_cells[0].min_width, 40.0);

    grid.grid.set_measured_width("desc", 230.0);
    let frame = grid.render();
    assert_eq!(frame.column_widths, vec![60.0, 230.0]);
    assert_eq!(frame.total_width, 290.0);

    // Only content-sized columns take measurements
    grid.grid.set_measured_width("id", 500.0);
    assert_eq!(grid.render().column_widths[0], 60.0);
}

#[test]
fn test_flexible_columns_follow_container_width() {
    let columns: Vec<Column<JsonRow, JsonRow>> = vec![
        px("id", 100.0),
        Column::new("a", "A").with_width(ColumnWidth::Percent(25.0)),
        Column::new("b", "B").with_width(ColumnWidth::Auto),
    ];
    let mut grid = TestGrid::new(columns, numbered_rows(1, &[]));
    assert_eq!(grid.render().column_widths, vec![100.0, 200.0, 500.0]);

    grid.grid.resize(400.0, 600.0);
    assert_eq!(grid.render().column_widths, vec![100.0, 100.0, 200.0]);
}

#[test]
fn test_column_resize_is_clamped_and_reported() {
    let columns: Vec<Column<JsonRow, JsonRow>> = vec![
        px("id", 100.0)
            .resizable()
            .with_min_width(50.0)
            .with_max_width(300.0),
        px("b", 100.0),
    ];
    let mut grid = TestGrid::new(columns, numbered_rows(1, &[]));
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&seen);
    grid.grid.on_column_resize(move |idx, width| sink.borrow_mut().push((idx, width)));

    grid.grid.handle_column_resize(0, 1000.0);
    assert_eq!(grid.render().column_widths[0], 300.0);
    grid.grid.handle_column_resize(0, 10.0);
    assert_eq!(grid.render().column_widths[0], 50.0);
    assert_eq!(*seen.borrow(), vec![(0, 300.0), (0, 50.0)]);

    // Columns that are not resizable ignore the gesture
    grid.grid.handle_column_resize(1, 250.0);
    assert_eq!(grid.render().column_widths[1], 100.0);
}

#[test]
fn test_frame_serializes_for_hosts() {
    let mut grid = summary_grid();
    grid.select(0, 1);
    let value = serde_json::to_value(grid.render()).unwrap();

    assert_eq!(value["gridTabIndex"], json!(-1));
    assert_eq!(value["selection"], json!("SELECTED"));
    assert_eq!(value["active"], json!({"rowIdx": 0, "idx": 1}));
    assert_eq!(value["focusCommand"]["type"], json!("focusCell"));

    let cell = &value["rows"][0]["cells"][1];
    assert_eq!(cell["columnKey"], json!("amount"));
    assert_eq!(cell["tabIndex"], json!(0));
    assert_eq!(cell["flags"], json!(["gv-cell-selected"]));
    assert_eq!(value["rows"][0]["flags"], json!(["gv-row-even", "gv-row-active"]));
}
