//! gridview - headless virtualized data grid
//!
//! Computes everything a data grid view needs except the pixels:
//! - Row and column virtualization with frozen columns and overscan
//! - Column and row spans
//! - Keyboard and pointer cell navigation, cell editing, copy/paste, drag fill
//! - Row selection with shift-range extension
//! - A single roving tab stop and focus restoration
//!
//! Rows, selected rows and sort order are owned by the caller. The grid
//! reports changes through callbacks and renders a [`GridFrame`] describing
//! the rows and cells to mount.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const grid = new GridView(columns, config);
//! grid.setRows(rows);
//! grid.resize(800, 600);
//! const frame = grid.render();
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod focus;
pub mod layout;
pub mod render;
pub mod selection;
pub mod sort;
pub mod span;
pub mod types;
pub mod viewer;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use error::{GridError, Result};
pub use render::GridFrame;
pub use viewer::DataGrid;
pub use wasm::GridView;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
