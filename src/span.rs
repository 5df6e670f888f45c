//! Column span resolution.
//!
//! A column may ask for its cell to cover the next few columns. Spans are
//! normalized here: anything below 2 means "no span", and a span is cut at
//! the frozen boundary and at the last column.

use std::ops::Range;

use crate::layout::{CalculatedColumn, ColumnLayout};
use crate::types::ColSpanArgs;

/// A rendered cell covering `span` columns starting at `idx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanSegment {
    pub idx: usize,
    pub span: usize,
}

impl SpanSegment {
    pub fn end(&self) -> usize {
        self.idx + self.span
    }

    pub fn covers(&self, idx: usize) -> bool {
        idx >= self.idx && idx < self.end()
    }
}

/// Span of `column` in the given context, or `None` when it covers one column.
pub fn get_col_span<R, SR>(
    column: &CalculatedColumn<R, SR>,
    last_frozen_column_index: Option<usize>,
    column_count: usize,
    args: &ColSpanArgs<'_, R, SR>,
) -> Option<usize> {
    let col_span = column.column.col_span.as_ref()?;
    let requested = usize::try_from(col_span(args)?).ok()?;
    if requested <= 1 {
        return None;
    }

    let limit = match last_frozen_column_index {
        Some(last) if column.idx <= last => last + 1 - column.idx,
        _ => column_count.saturating_sub(column.idx),
    };
    let span = requested.min(limit);
    if span < requested {
        tracing::trace!(
            key = column.key(),
            requested,
            span,
            "column span clamped"
        );
    }
    (span > 1).then_some(span)
}

fn span_at<R, SR>(columns: &ColumnLayout<R, SR>, idx: usize, args: &ColSpanArgs<'_, R, SR>) -> usize {
    columns
        .get(idx)
        .and_then(|column| {
            get_col_span(column, columns.last_frozen_column_index, columns.len(), args)
        })
        .unwrap_or(1)
}

/// Leftmost column whose cell reaches into `start`.
///
/// Used when a scrollable range begins in the middle of a span so the span
/// is rendered from its anchor instead of being dropped.
pub fn span_anchor<R, SR>(
    columns: &ColumnLayout<R, SR>,
    start: usize,
    args: &ColSpanArgs<'_, R, SR>,
) -> usize {
    covering_segment(columns, start, args).map_or(start, |segment| segment.idx)
}

/// The cell (anchor and span) that covers column `idx` in this row.
pub fn covering_segment<R, SR>(
    columns: &ColumnLayout<R, SR>,
    idx: usize,
    args: &ColSpanArgs<'_, R, SR>,
) -> Option<SpanSegment> {
    if idx >= columns.len() {
        return None;
    }
    // Spans never cross the frozen boundary, so walk only the region of idx
    let mut cursor = if columns.is_frozen(idx) {
        0
    } else {
        columns.frozen_count()
    };
    while cursor <= idx {
        let span = span_at(columns, cursor, args);
        let segment = SpanSegment { idx: cursor, span };
        if segment.covers(idx) {
            return Some(segment);
        }
        cursor += span;
    }
    None
}

/// Cells to emit for a row, given sorted column ranges to materialize.
///
/// Covered columns are skipped entirely. A range starting inside a span
/// emits the span from its anchor.
pub fn row_segments<R, SR>(
    columns: &ColumnLayout<R, SR>,
    ranges: &[Range<usize>],
    args: &ColSpanArgs<'_, R, SR>,
) -> Vec<SpanSegment> {
    let mut segments = Vec::new();
    let mut next_free = 0;

    for range in ranges {
        let end = range.end.min(columns.len());
        let mut idx = span_anchor(columns, range.start, args).max(next_free);
        while idx < end {
            let span = span_at(columns, idx, args);
            segments.push(SpanSegment { idx, span });
            idx += span;
        }
        next_free = next_free.max(idx);
    }

    segments
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
    use crate::types::{Column, ColumnWidth};
    use std::collections::HashMap;
    use std::rc::Rc;

    fn layout(columns: Vec<Column<usize>>) -> ColumnLayout<usize> {
        let columns: Vec<_> = columns.into_iter().map(Rc::new).collect();
        resolve_columns(&columns, 0.0, &DefaultColumnOptions::default(), &HashMap::new()).unwrap()
    }

    fn plain(key: &str) -> Column<usize> {
        Column::new(key, key).with_width(ColumnWidth::Px(100.0))
    }

    fn row_args(row: &usize) -> ColSpanArgs<'_, usize, ()> {
        ColSpanArgs::Row {
            row,
            row_idx: *row,
        }
    }

    #[test]
    fn test_span_on_one_row() {
        let columns = layout(vec![
            plain("a"),
            plain("b").with_col_span(|args| match args {
                ColSpanArgs::Row { row_idx: 5, .. } => Some(3),
                _ => None,
            }),
            plain("c"),
            plain("d"),
            plain("e"),
        ]);

        let segments = row_segments(&columns, &[0..5], &row_args(&5));
        assert_eq!(
            segments,
            vec![
                SpanSegment { idx: 0, span: 1 },
                SpanSegment { idx: 1, span: 3 },
                SpanSegment { idx: 4, span: 1 },
            ]
        );

        let segments = row_segments(&columns, &[0..5], &row_args(&4));
        assert_eq!(segments.len(), 5);
    }

    #[test]
    fn test_invalid_spans_are_ignored() {
        let columns = layout(vec![
            plain("a").with_col_span(|_| Some(0)),
            plain("b").with_col_span(|_| Some(-3)),
            plain("c").with_col_span(|_| Some(1)),
        ]);
        for idx in 0..3 {
            assert_eq!(
                get_col_span(&columns.columns[idx], None, 3, &ColSpanArgs::Header),
                None
            );
        }
    }

    #[test]
    fn test_span_clamped_to_remaining_columns() {
        let columns = layout(vec![plain("a"), plain("b").with_col_span(|_| Some(10)), plain("c")]);
        assert_eq!(
            get_col_span(&columns.columns[1], None, 3, &ColSpanArgs::Header),
            Some(2)
        );
    }

    #[test]
    fn test_span_clamped_at_frozen_boundary() {
        let columns = layout(vec![
            plain("f0").frozen().with_col_span(|_| Some(4)),
            plain("f1").frozen(),
            plain("a"),
            plain("b"),
        ]);
        assert_eq!(columns.last_frozen_column_index, Some(1));
        assert_eq!(
            get_col_span(&columns.columns[0], Some(1), 4, &ColSpanArgs::Header),
            Some(2)
        );
    }

    #[test]
    fn test_last_frozen_column_cannot_span() {
        let columns = layout(vec![
            plain("f0").frozen().with_col_span(|_| Some(3)),
            plain("a"),
            plain("b"),
        ]);
        assert_eq!(
            get_col_span(&columns.columns[0], Some(0), 3, &ColSpanArgs::Header),
            None
        );
    }

    #[test]
    fn test_range_starting_inside_span_renders_anchor() {
        let columns = layout(vec![
            plain("f").frozen(),
            plain("a").with_col_span(|_| Some(3)),
            plain("b"),
            plain("c"),
            plain("d"),
        ]);
        let args = ColSpanArgs::Header;
        assert_eq!(span_anchor(&columns, 3, &args), 1);
        assert_eq!(span_anchor(&columns, 4, &args), 4);

        let segments = row_segments(&columns, &[0..1, 3..5], &args);
        assert_eq!(
            segments,
            vec![
                SpanSegment { idx: 0, span: 1 },
                SpanSegment { idx: 1, span: 3 },
                SpanSegment { idx: 4, span: 1 },
            ]
        );
    }

    #[test]
    fn test_overlapping_ranges_do_not_duplicate() {
        let columns = layout(vec![
            plain("a").with_col_span(|_| Some(3)),
            plain("b"),
            plain("c"),
            plain("d"),
        ]);
        let args = ColSpanArgs::Header;
        let segments = row_segments(&columns, &[0..1, 2..3], &args);
        assert_eq!(segments, vec![SpanSegment { idx: 0, span: 3 }]);
    }

    #[test]
    fn test_covering_segment() {
        let columns = layout(vec![
            plain("a"),
            plain("b").with_col_span(|_| Some(2)),
            plain("c"),
            plain("d"),
        ]);
        let args = ColSpanArgs::Header;
        assert_eq!(
            covering_segment(&columns, 2, &args),
            Some(SpanSegment { idx: 1, span: 2 })
        );
        assert_eq!(
            covering_segment(&columns, 3, &args),
            Some(SpanSegment { idx: 3, span: 1 })
        );
        assert_eq!(covering_segment(&columns, 9, &args), None);
    }
}
