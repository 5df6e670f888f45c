//! CLI tool for gridview - renders a grid scene and outputs the frame as JSON
//!
//! Usage:
//!   gridview_cli <scene.json>              # Output JSON to stdout
//!   gridview_cli <scene.json> -o out.json  # Output JSON to file
//!
//! A scene holds the grid inputs and the events to replay before rendering:
//!
//! ```json
//! {
//!   "columns": [{"key": "id", "name": "ID", "frozen": true}],
//!   "rows": [{"id": 1}],
//!   "config": {"rowHeight": 35},
//!   "rowKeyField": "id",
//!   "scroll": {"scrollTop": 0, "scrollLeft": 0, "clientWidth": 800, "clientHeight": 600},
//!   "selectedCell": {"rowIdx": 0, "idx": 0},
//!   "keys": [{"key": "ArrowDown"}]
//! }
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use gridview::layout::ScrollMetrics;
use gridview::selection::KeyInput;
use gridview::{json_row_key, CellPosition, ColumnDef, DataGrid, GridConfig, JsonRow};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scene {
    columns: Vec<ColumnDef>,
    #[serde(default)]
    rows: Vec<JsonRow>,
    #[serde(default)]
    top_summary_rows: Vec<JsonRow>,
    #[serde(default)]
    bottom_summary_rows: Vec<JsonRow>,
    #[serde(default)]
    config: GridConfig,
    #[serde(default)]
    row_key_field: Option<String>,
    #[serde(default)]
    scroll: ScrollMetrics,
    #[serde(default)]
    selected_cell: Option<CellPosition>,
    #[serde(default)]
    keys: Vec<KeyInput>,
}

fn run(input_path: &str) -> Result<String, String> {
    let text = fs::read_to_string(input_path)
        .map_err(|e| format!("Error reading {input_path}: {e}"))?;
    let scene: Scene =
        serde_json::from_str(&text).map_err(|e| format!("Error parsing scene: {e}"))?;

    let columns = scene.columns.into_iter().map(ColumnDef::into_column).collect();
    let mut grid: DataGrid<JsonRow, JsonRow> =
        DataGrid::new(columns, scene.config).map_err(|e| format!("Invalid grid: {e}"))?;
    if let Some(field) = scene.row_key_field {
        grid.set_row_key_getter(move |row, idx| json_row_key(row, &field, idx));
    }
    grid.set_rows(scene.rows);
    grid.set_top_summary_rows(scene.top_summary_rows);
    grid.set_bottom_summary_rows(scene.bottom_summary_rows);
    grid.resize(scene.scroll.client_width, scene.scroll.client_height);
    grid.handle_scroll(scene.scroll.scroll_top, scene.scroll.scroll_left);
    if let Some(position) = scene.selected_cell {
        grid.select_cell(position, false);
    }
    for key in &scene.keys {
        grid.handle_key(key);
    }

    let frame = grid.render();
    serde_json::to_string_pretty(&frame).map_err(|e| format!("Error serializing JSON: {e}"))
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let Some(input_path) = args.get(1) else {
        eprintln!("Usage: gridview_cli <scene.json> [-o output.json]");
        return ExitCode::FAILURE;
    };
    let output_path = match (args.get(2), args.get(3)) {
        (Some(flag), Some(path)) if flag == "-o" => Some(path),
        _ => None,
    };

    let json = match run(input_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {path}: {e}");
                return ExitCode::FAILURE;
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{json}") {
                eprintln!("Error writing output: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
