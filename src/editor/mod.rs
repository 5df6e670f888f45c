//! Cell editors.
//!
//! The engine only needs an editor to produce an in-progress row and to say
//! when it is done. The default text editor shows the cell's current text and
//! turns typed text back into a value with [`parse_input`].

mod mutation;

pub use mutation::{apply_text_edit, parse_input};

use crate::types::{CellContent, EditCellProps, GridRow};

/// Default edit renderer: a text box seeded with the cell's current text.
pub fn text_editor<R: GridRow>(props: &EditCellProps<'_, R>) -> CellContent {
    let value = props
        .row
        .cell_value(props.column_key)
        .map(|v| v.display())
        .unwrap_or_default();
    CellContent::TextEditor { value }
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
    use crate::types::JsonRow;
    use serde_json::json;

    #[test]
    fn test_text_editor_shows_in_progress_value() {
        let row: JsonRow = json!({"n": 3.5}).as_object().cloned().unwrap();
        let content = text_editor(&EditCellProps {
            column_key: "n",
            row: &row,
            row_idx: 0,
        });
        assert_eq!(
            content,
            CellContent::TextEditor {
                value: "3.5".into()
            }
        );
    }
}
