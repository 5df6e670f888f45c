//! Scroll and resize bookkeeping for `DataGrid`.
//!
//! The host reports the scroll container's metrics. Sticky header and summary
//! rows cover part of the container, so viewport and scroll-to-cell math run
//! on the data-row area below them.

use super::DataGrid;
use crate::layout::{scroll_into_view, ScrollMetrics};
use crate::types::{CellPosition, GridRow};

fn to_f32(n: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let value = n as f32;
    value
}

impl<R: GridRow + 'static, SR: 'static> DataGrid<R, SR> {
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    /// Height covered by the header and summary rows.
    pub fn sticky_height(&self) -> f32 {
        let summaries = self.top_summary_rows.len() + self.bottom_summary_rows.len();
        self.config.header_row_height() + to_f32(summaries) * self.config.summary_row_height()
    }

    /// Height available to data rows.
    pub fn data_area_height(&self) -> f32 {
        (self.metrics.client_height - self.sticky_height()).max(0.0)
    }

    pub(crate) fn data_area_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            client_height: self.data_area_height(),
            ..self.metrics
        }
    }

    /// Largest valid `(scroll_top, scroll_left)`.
    pub fn max_scroll(&self) -> (f32, f32) {
        let max_top = (self.offsets.total_height() - self.data_area_height()).max(0.0);
        let max_left = (self.layout.total_width - self.metrics.client_width).max(0.0);
        (max_top, max_left)
    }

    /// Scroll event from the host. Offsets are clamped to the content.
    pub fn handle_scroll(&mut self, scroll_top: f32, scroll_left: f32) {
        let (max_top, max_left) = self.max_scroll();
        self.metrics.scroll_top = finite_or_zero(scroll_top).clamp(0.0, max_top);
        self.metrics.scroll_left = finite_or_zero(scroll_left).clamp(0.0, max_left);
    }

    /// The container was resized. Columns are re-resolved when the width
    /// changed, since percentage and flexible widths depend on it.
    pub fn resize(&mut self, client_width: f32, client_height: f32) {
        let client_width = finite_or_zero(client_width).max(0.0);
        let client_height = finite_or_zero(client_height).max(0.0);
        let width_changed = client_width.to_bits() != self.metrics.client_width.to_bits();

        self.metrics.client_width = client_width;
        self.metrics.client_height = client_height;
        if width_changed {
            tracing::debug!(client_width, "container width changed, re-resolving columns");
            self.relayout();
        }
        let (scroll_top, scroll_left) = (self.metrics.scroll_top, self.metrics.scroll_left);
        self.handle_scroll(scroll_top, scroll_left);
    }

    /// Scroll by the minimal amount that brings a cell into view.
    ///
    /// Header and summary rows are always visible, so only the column can
    /// move for them. Returns the new metrics.
    pub fn scroll_to_cell(&mut self, position: CellPosition) -> ScrollMetrics {
        let row = usize::try_from(position.row_idx)
            .ok()
            .filter(|&r| r < self.rows.len());
        let next = scroll_into_view(
            &self.data_area_metrics(),
            &self.offsets,
            &self.layout,
            row,
            Some(position.idx),
        );
        self.metrics.scroll_top = next.scroll_top;
        self.metrics.scroll_left = next.scroll_left;
        self.metrics
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
