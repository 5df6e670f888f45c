use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::{
    CellContent, CellRenderProps, CellValue, EditCellProps, HeaderCellProps, SummaryCellProps,
};

/// How a column's width is specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ColumnWidth {
    /// Fixed width in pixels
    Px(f32),
    /// Percentage of the container width
    Percent(f32),
    /// Share of the remaining space, weighted
    Flex(f32),
    /// Share of the remaining space with weight 1
    #[default]
    Auto,
    /// Width of the widest content, as measured by the host
    MaxContent,
}

/// Which context a span is requested for.
pub enum ColSpanArgs<'a, R, SR> {
    Header,
    Row { row: &'a R, row_idx: usize },
    Summary { row: &'a SR },
}

/// Whether cells of a column can be edited.
pub enum Editable<R> {
    No,
    Yes,
    When(Rc<dyn Fn(&R) -> bool>),
}

impl<R> Clone for Editable<R> {
    fn clone(&self) -> Self {
        match self {
            Self::No => Self::No,
            Self::Yes => Self::Yes,
            Self::When(f) => Self::When(Rc::clone(f)),
        }
    }
}

impl<R> Editable<R> {
    pub fn allows(&self, row: &R) -> bool {
        match self {
            Self::No => false,
            Self::Yes => true,
            Self::When(f) => f(row),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Self::No)
    }
}

/// Editor behavior for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Losing focus commits the edit instead of discarding it
    pub commit_on_outside_click: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            commit_on_outside_click: true,
        }
    }
}

pub type ValueRenderer<R> = Rc<dyn Fn(Option<&CellValue>, &R, usize) -> CellContent>;
pub type CellRenderer<R> = Rc<dyn Fn(&CellRenderProps<'_, R>) -> CellContent>;
pub type EditCellRenderer<R> = Rc<dyn Fn(&EditCellProps<'_, R>) -> CellContent>;
pub type SummaryCellRenderer<SR> = Rc<dyn Fn(&SummaryCellProps<'_, SR>) -> CellContent>;
pub type HeaderCellRenderer = Rc<dyn Fn(&HeaderCellProps<'_>) -> CellContent>;
pub type ColSpanFn<R, SR> = Rc<dyn Fn(&ColSpanArgs<'_, R, SR>) -> Option<i32>>;
pub type SortComparator<R> = Rc<dyn Fn(&R, &R) -> Ordering>;
pub type ClassFn<T> = Rc<dyn Fn(&T) -> Option<String>>;

/// A caller-supplied column definition.
///
/// Optional capabilities (renderers, span, comparator) are checked for
/// presence at composition time; a column without them gets the defaults.
pub struct Column<R, SR = ()> {
    pub key: String,
    pub name: String,
    pub width: ColumnWidth,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub frozen: bool,
    pub sortable: Option<bool>,
    pub sort_descending_first: bool,
    pub resizable: Option<bool>,
    pub editable: Editable<R>,
    pub editor_options: EditorOptions,
    pub render: Option<ValueRenderer<R>>,
    pub render_cell: Option<CellRenderer<R>>,
    pub render_edit_cell: Option<EditCellRenderer<R>>,
    pub render_summary_cell: Option<SummaryCellRenderer<SR>>,
    pub render_header_cell: Option<HeaderCellRenderer>,
    pub col_span: Option<ColSpanFn<R, SR>>,
    pub sort_comparator: Option<SortComparator<R>>,
    pub cell_class: Option<ClassFn<R>>,
    pub summary_cell_class: Option<ClassFn<SR>>,
    pub header_cell_class: Option<String>,
}

impl<R, SR> Clone for Column<R, SR> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            name: self.name.clone(),
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            frozen: self.frozen,
            sortable: self.sortable,
            sort_descending_first: self.sort_descending_first,
            resizable: self.resizable,
            editable: self.editable.clone(),
            editor_options: self.editor_options,
            render: self.render.clone(),
            render_cell: self.render_cell.clone(),
            render_edit_cell: self.render_edit_cell.clone(),
            render_summary_cell: self.render_summary_cell.clone(),
            render_header_cell: self.render_header_cell.clone(),
            col_span: self.col_span.clone(),
            sort_comparator: self.sort_comparator.clone(),
            cell_class: self.cell_class.clone(),
            summary_cell_class: self.summary_cell_class.clone(),
            header_cell_class: self.header_cell_class.clone(),
        }
    }
}

impl<R, SR> fmt::Debug for Column<R, SR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("frozen", &self.frozen)
            .field("editable", &!self.editable.is_never())
            .field("has_col_span", &self.col_span.is_some())
            .finish_non_exhaustive()
    }
}

impl<R, SR> Column<R, SR> {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            width: ColumnWidth::Auto,
            min_width: None,
            max_width: None,
            frozen: false,
            sortable: None,
            sort_descending_first: false,
            resizable: None,
            editable: Editable::No,
            editor_options: EditorOptions::default(),
            render: None,
            render_cell: None,
            render_edit_cell: None,
            render_summary_cell: None,
            render_header_cell: None,
            col_span: None,
            sort_comparator: None,
            cell_class: None,
            summary_cell_class: None,
            header_cell_class: None,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    #[must_use]
    pub fn with_max_width(mut self, max_width: f32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = Some(true);
        self
    }

    #[must_use]
    pub fn resizable(mut self) -> Self {
        self.resizable = Some(true);
        self
    }

    #[must_use]
    pub fn with_sort_descending_first(mut self, descending_first: bool) -> Self {
        self.sort_descending_first = descending_first;
        self
    }

    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = Editable::Yes;
        self
    }

    #[must_use]
    pub fn editable_when(mut self, f: impl Fn(&R) -> bool + 'static) -> Self {
        self.editable = Editable::When(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_editor_options(mut self, options: EditorOptions) -> Self {
        self.editor_options = options;
        self
    }

    #[must_use]
    pub fn with_render(
        mut self,
        f: impl Fn(Option<&CellValue>, &R, usize) -> CellContent + 'static,
    ) -> Self {
        self.render = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_render_cell(
        mut self,
        f: impl Fn(&CellRenderProps<'_, R>) -> CellContent + 'static,
    ) -> Self {
        self.render_cell = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_render_edit_cell(
        mut self,
        f: impl Fn(&EditCellProps<'_, R>) -> CellContent + 'static,
    ) -> Self {
        self.render_edit_cell = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_render_summary_cell(
        mut self,
        f: impl Fn(&SummaryCellProps<'_, SR>) -> CellContent + 'static,
    ) -> Self {
        self.render_summary_cell = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_render_header_cell(
        mut self,
        f: impl Fn(&HeaderCellProps<'_>) -> CellContent + 'static,
    ) -> Self {
        self.render_header_cell = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_col_span(
        mut self,
        f: impl Fn(&ColSpanArgs<'_, R, SR>) -> Option<i32> + 'static,
    ) -> Self {
        self.col_span = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_sort_comparator(mut self, f: impl Fn(&R, &R) -> Ordering + 'static) -> Self {
        self.sort_comparator = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_cell_class(mut self, f: impl Fn(&R) -> Option<String> + 'static) -> Self {
        self.cell_class = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_summary_cell_class(mut self, f: impl Fn(&SR) -> Option<String> + 'static) -> Self {
        self.summary_cell_class = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn with_header_cell_class(mut self, class: impl Into<String>) -> Self {
        self.header_cell_class = Some(class.into());
        self
    }
}

/// Key of the built-in row selection column.
pub const SELECT_COLUMN_KEY: &str = "select-row";

/// A frozen checkbox column bound to the row-selection set.
///
/// The header checkbox reflects whether all or some rows are selected.
pub fn select_column<R: 'static, SR: 'static>() -> Column<R, SR> {
    Column::new(SELECT_COLUMN_KEY, "")
        .with_width(ColumnWidth::Px(35.0))
        .with_min_width(35.0)
        .with_max_width(35.0)
        .frozen()
        .with_render_cell(|props| CellContent::Checkbox {
            checked: props.is_row_selected,
            indeterminate: false,
            disabled: false,
            tab_index: props.tab_index,
        })
        .with_render_header_cell(|props| CellContent::Checkbox {
            checked: props.all_rows_selected,
            indeterminate: props.some_rows_selected && !props.all_rows_selected,
            disabled: false,
            tab_index: props.tab_index,
        })
}

/// Data-only column description, as accepted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: ColumnWidth,
    #[serde(default)]
    pub min_width: Option<f32>,
    #[serde(default)]
    pub max_width: Option<f32>,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub sortable: Option<bool>,
    #[serde(default)]
    pub sort_descending_first: bool,
    #[serde(default)]
    pub resizable: Option<bool>,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub editor_options: EditorOptions,
    #[serde(default)]
    pub cell_class: Option<String>,
    #[serde(default)]
    pub header_cell_class: Option<String>,
}

impl ColumnDef {
    pub fn into_column<R: 'static, SR>(self) -> Column<R, SR> {
        let mut column = Column::new(self.key, self.name).with_width(self.width);
        column.min_width = self.min_width;
        column.max_width = self.max_width;
        column.frozen = self.frozen;
        column.sortable = self.sortable;
        column.sort_descending_first = self.sort_descending_first;
        column.resizable = self.resizable;
        column.editor_options = self.editor_options;
        column.header_cell_class = self.header_cell_class;
        if self.editable {
            column.editable = Editable::Yes;
        }
        if let Some(class) = self.cell_class {
            column.cell_class = Some(Rc::new(move |_: &R| Some(class.clone())));
        }
        column
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
    fn test_column_def_from_json() {
        let def: ColumnDef = serde_json::from_str(
            r#"{"key": "title", "name": "Task", "width": {"px": 120}, "frozen": true, "editable": true}"#,
        )
        .unwrap();
        assert_eq!(def.width, ColumnWidth::Px(120.0));
        let column: Column<(), ()> = def.into_column();
        assert_eq!(column.key, "title");
        assert!(column.frozen);
        assert!(column.editable.allows(&()));
        assert!(column.editor_options.commit_on_outside_click);
    }

    #[test]
    fn test_column_width_json_forms() {
        let w: ColumnWidth = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(w, ColumnWidth::Auto);
        let w: ColumnWidth = serde_json::from_str("\"maxContent\"").unwrap();
        assert_eq!(w, ColumnWidth::MaxContent);
        let w: ColumnWidth = serde_json::from_str(r#"{"percent": 25}"#).unwrap();
        assert_eq!(w, ColumnWidth::Percent(25.0));
    }

    #[test]
    fn test_editable_when() {
        let column: Column<i32> = Column::new("n", "N").editable_when(|n| *n > 0);
        assert!(column.editable.allows(&1));
        assert!(!column.editable.allows(&-1));
    }

    #[test]
    fn test_select_column_is_frozen_checkbox() {
        let column: Column<i32> = select_column();
        assert!(column.frozen);
        let render = column.render_cell.unwrap();
        let content = render(&CellRenderProps {
            column_key: SELECT_COLUMN_KEY,
            row: &1,
            row_idx: 0,
            is_cell_editable: false,
            is_row_selected: true,
            tab_index: -1,
        });
        assert!(matches!(content, CellContent::Checkbox { checked: true, .. }));
    }
}
