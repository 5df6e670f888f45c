//! Column model: resolves caller column definitions into calculated columns.
//!
//! Resolution runs once per (columns, container width, measured widths)
//! combination. Frozen columns are moved to the front, widths are resolved
//! and clamped, and cumulative left offsets are pre-computed so the viewport
//! calculator can binary search them.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::DefaultColumnOptions;
use crate::error::{GridError, Result};
use crate::types::{Column, ColumnWidth};

/// A column with its resolved position and size.
pub struct CalculatedColumn<R, SR = ()> {
    pub column: Rc<Column<R, SR>>,
    /// 0-based position among the resolved columns
    pub idx: usize,
    pub width: f32,
    /// Cumulative left offset in content coordinates
    pub left: f32,
    pub min_width: f32,
    pub max_width: Option<f32>,
    pub frozen: bool,
    pub is_last_frozen_column: bool,
    pub sortable: bool,
    pub resizable: bool,
}

impl<R, SR> Clone for CalculatedColumn<R, SR> {
    fn clone(&self) -> Self {
        Self {
            column: Rc::clone(&self.column),
            idx: self.idx,
            width: self.width,
            left: self.left,
            min_width: self.min_width,
            max_width: self.max_width,
            frozen: self.frozen,
            is_last_frozen_column: self.is_last_frozen_column,
            sortable: self.sortable,
            resizable: self.resizable,
        }
    }
}

impl<R, SR> std::fmt::Debug for CalculatedColumn<R, SR> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatedColumn")
            .field("key", &self.column.key)
            .field("idx", &self.idx)
            .field("width", &self.width)
            .field("left", &self.left)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

impl<R, SR> CalculatedColumn<R, SR> {
    pub fn key(&self) -> &str {
        &self.column.key
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn is_editable(&self, row: &R) -> bool {
        self.column.editable.allows(row)
    }
}

/// Resolved column set.
pub struct ColumnLayout<R, SR = ()> {
    pub columns: Vec<CalculatedColumn<R, SR>>,
    /// Cumulative column positions (`col_positions[i]` = left edge of column i, plus a final edge)
    pub col_positions: Vec<f32>,
    pub total_width: f32,
    pub total_frozen_width: f32,
    /// Index of the last frozen column, `None` when nothing is frozen
    pub last_frozen_column_index: Option<usize>,
    key_index: HashMap<String, usize>,
}

impl<R, SR> std::fmt::Debug for ColumnLayout<R, SR> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnLayout")
            .field("columns", &self.columns)
            .field("total_width", &self.total_width)
            .field("last_frozen_column_index", &self.last_frozen_column_index)
            .finish_non_exhaustive()
    }
}

impl<R, SR> Default for ColumnLayout<R, SR> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            col_positions: vec![0.0],
            total_width: 0.0,
            total_frozen_width: 0.0,
            last_frozen_column_index: None,
            key_index: HashMap::new(),
        }
    }
}

impl<R, SR> ColumnLayout<R, SR> {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&CalculatedColumn<R, SR>> {
        self.columns.get(idx)
    }

    pub fn by_key(&self, key: &str) -> Option<&CalculatedColumn<R, SR>> {
        self.key_index.get(key).and_then(|&idx| self.columns.get(idx))
    }

    /// Number of frozen columns (they form a prefix).
    pub fn frozen_count(&self) -> usize {
        self.last_frozen_column_index.map_or(0, |i| i + 1)
    }

    pub fn is_frozen(&self, idx: usize) -> bool {
        idx < self.frozen_count()
    }

    /// Find column at x position in content coordinates (binary search)
    pub fn col_at_x(&self, x: f32) -> Option<usize> {
        if self.columns.is_empty() || x < 0.0 || x >= self.total_width {
            return None;
        }
        let bounds = self.col_positions.get(1..)?;
        let idx = bounds.partition_point(|&right| right <= x);
        (idx < self.columns.len()).then_some(idx)
    }
}

fn clamp_width(width: f32, min: f32, max: Option<f32>) -> f32 {
    let width = width.max(min);
    max.map_or(width, |max| width.min(max))
}

fn invalid_width(key: &str, width: f32) -> GridError {
    GridError::InvalidColumnWidth {
        key: key.to_string(),
        width: width.to_string(),
    }
}

/// Width of a column before flexible space is distributed.
enum PendingWidth {
    Resolved(f32),
    Flex { weight: f32 },
}

/// Resolve column definitions against a container width.
///
/// Fixed, percentage and measured widths are taken as-is (clamped to
/// `[min, max]`); flexible columns start at their min width and share the
/// remaining space by weight. Space a column cannot take because of its max
/// width is handed to the other flexible columns.
///
/// # Errors
/// Returns an error for duplicate keys, `min_width > max_width`, or a
/// negative/non-finite width specification. The caller keeps its previous
/// layout in that case.
pub fn resolve_columns<R, SR>(
    columns: &[Rc<Column<R, SR>>],
    container_width: f32,
    defaults: &DefaultColumnOptions,
    measured_widths: &HashMap<String, f32>,
) -> Result<ColumnLayout<R, SR>> {
    let mut key_index = HashMap::with_capacity(columns.len());

    // Frozen columns first, preserving relative order within each group
    let ordered: Vec<&Rc<Column<R, SR>>> = columns
        .iter()
        .filter(|c| c.frozen)
        .chain(columns.iter().filter(|c| !c.frozen))
        .collect();

    let mut pending = Vec::with_capacity(ordered.len());
    let mut bounds = Vec::with_capacity(ordered.len());

    for (idx, column) in ordered.iter().enumerate() {
        if key_index.insert(column.key.clone(), idx).is_some() {
            return Err(GridError::DuplicateColumnKey(column.key.clone()));
        }

        let mut min = column.min_width.unwrap_or(defaults.min_width);
        let mut max = column.max_width.or(defaults.max_width);
        if !min.is_finite() || min < 0.0 {
            return Err(invalid_width(&column.key, min));
        }
        if let Some(upper) = max.filter(|&upper| min > upper) {
            // A bound declared on the column wins over an inherited default
            match (column.min_width.is_some(), column.max_width.is_some()) {
                (false, true) => min = upper,
                (true, false) => max = Some(min),
                _ => {
                    return Err(GridError::InvalidWidthBounds {
                        key: column.key.clone(),
                        min,
                        max: upper,
                    })
                }
            }
        }

        let width = match column.width {
            ColumnWidth::Px(px) => {
                if !px.is_finite() || px < 0.0 {
                    return Err(invalid_width(&column.key, px));
                }
                PendingWidth::Resolved(clamp_width(px, min, max))
            }
            ColumnWidth::Percent(pct) => {
                if !pct.is_finite() || pct < 0.0 {
                    return Err(invalid_width(&column.key, pct));
                }
                PendingWidth::Resolved(clamp_width(container_width * pct / 100.0, min, max))
            }
            ColumnWidth::Flex(weight) => {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(invalid_width(&column.key, weight));
                }
                PendingWidth::Flex { weight }
            }
            ColumnWidth::Auto => PendingWidth::Flex { weight: 1.0 },
            ColumnWidth::MaxContent => match measured_widths.get(&column.key) {
                Some(&measured) => PendingWidth::Resolved(clamp_width(measured, min, max)),
                None => PendingWidth::Flex { weight: 1.0 },
            },
        };
        pending.push(width);
        bounds.push((min, max));
    }

    let widths = distribute_flex(&pending, &bounds, container_width);

    let frozen_count = ordered.iter().filter(|c| c.frozen).count();
    let last_frozen_column_index = frozen_count.checked_sub(1);

    let mut calculated = Vec::with_capacity(ordered.len());
    let mut col_positions = Vec::with_capacity(ordered.len() + 1);
    let mut left = 0.0_f32;
    let mut total_frozen_width = 0.0_f32;

    for (idx, ((column, width), (min, max))) in ordered
        .into_iter()
        .zip(widths)
        .zip(bounds)
        .enumerate()
    {
        col_positions.push(left);
        if column.frozen {
            total_frozen_width += width;
        }
        calculated.push(CalculatedColumn {
            column: Rc::clone(column),
            idx,
            width,
            left,
            min_width: min,
            max_width: max,
            frozen: column.frozen,
            is_last_frozen_column: last_frozen_column_index == Some(idx),
            sortable: column.sortable.unwrap_or(defaults.sortable),
            resizable: column.resizable.unwrap_or(defaults.resizable),
        });
        left += width;
    }
    col_positions.push(left);

    Ok(ColumnLayout {
        columns: calculated,
        col_positions,
        total_width: left,
        total_frozen_width,
        last_frozen_column_index,
        key_index,
    })
}

fn distribute_flex(
    pending: &[PendingWidth],
    bounds: &[(f32, Option<f32>)],
    container_width: f32,
) -> Vec<f32> {
    let mut widths: Vec<f32> = pending
        .iter()
        .zip(bounds)
        .map(|(p, (min, _))| match p {
            PendingWidth::Resolved(w) => *w,
            PendingWidth::Flex { .. } => *min,
        })
        .collect();

    let mut remaining = container_width - widths.iter().sum::<f32>();
    let mut capped = vec![false; pending.len()];

    loop {
        let active: Vec<(usize, f32)> = pending
            .iter()
            .enumerate()
            .filter_map(|(i, p)| match p {
                PendingWidth::Flex { weight } if !capped.get(i).copied().unwrap_or(true) => {
                    Some((i, *weight))
                }
                _ => None,
            })
            .collect();
        if remaining <= 0.0 || active.is_empty() {
            break;
        }

        let total_weight: f32 = active.iter().map(|(_, w)| w).sum();
        let mut given = 0.0;
        let mut any_capped = false;
        for (i, weight) in active {
            let extra = remaining * weight / total_weight;
            let (Some(width), Some((_, max))) = (widths.get_mut(i), bounds.get(i)) else {
                continue;
            };
            match max {
                Some(max) if *width + extra >= *max => {
                    given += *max - *width;
                    *width = *max;
                    if let Some(c) = capped.get_mut(i) {
                        *c = true;
                    }
                    any_capped = true;
                }
                _ => {
                    *width += extra;
                    given += extra;
                }
            }
        }
        remaining -= given;
        if !any_capped {
            break;
        }
    }

    widths
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

    fn cols(columns: Vec<Column<()>>) -> Vec<Rc<Column<()>>> {
        columns.into_iter().map(Rc::new).collect()
    }

    fn resolve(columns: Vec<Column<()>>, width: f32) -> Result<ColumnLayout<()>> {
        resolve_columns(
            &cols(columns),
            width,
            &DefaultColumnOptions::default(),
            &HashMap::new(),
        )
    }

    #[test]
    fn test_fixed_widths_and_offsets() {
        let layout = resolve(
            vec![
                Column::new("a", "A").with_width(ColumnWidth::Px(80.0)),
                Column::new("b", "B").with_width(ColumnWidth::Px(120.0)),
            ],
            1000.0,
        )
        .unwrap();

        assert_eq!(layout.len(), 2);
        assert_eq!(layout.columns[0].left, 0.0);
        assert_eq!(layout.columns[1].left, 80.0);
        assert_eq!(layout.total_width, 200.0);
        assert_eq!(layout.col_positions, vec![0.0, 80.0, 200.0]);
        assert_eq!(layout.last_frozen_column_index, None);
    }

    #[test]
    fn test_flex_columns_share_remaining_space() {
        let layout = resolve(
            vec![
                Column::new("fixed", "F").with_width(ColumnWidth::Px(200.0)),
                Column::new("a", "A"),
                Column::new("b", "B").with_width(ColumnWidth::Flex(3.0)),
            ],
            600.0,
        )
        .unwrap();

        // 600 - 200 - 2 * 50 (min widths) = 300 extra, split 1:3
        assert_eq!(layout.columns[1].width, 125.0);
        assert_eq!(layout.columns[2].width, 275.0);
        assert_eq!(layout.total_width, 600.0);
    }

    #[test]
    fn test_flex_respects_max_width_and_redistributes() {
        let layout = resolve(
            vec![
                Column::new("a", "A").with_max_width(100.0),
                Column::new("b", "B"),
            ],
            500.0,
        )
        .unwrap();

        assert_eq!(layout.columns[0].width, 100.0);
        assert_eq!(layout.columns[1].width, 400.0);
    }

    #[test]
    fn test_flex_columns_keep_min_width_when_container_is_too_small() {
        let layout = resolve(
            vec![
                Column::new("fixed", "F").with_width(ColumnWidth::Px(300.0)),
                Column::new("a", "A").with_min_width(80.0),
            ],
            200.0,
        )
        .unwrap();

        assert_eq!(layout.columns[1].width, 80.0);
        assert_eq!(layout.total_width, 380.0);
    }

    #[test]
    fn test_fixed_width_is_clamped() {
        let layout = resolve(
            vec![Column::new("a", "A")
                .with_width(ColumnWidth::Px(20.0))
                .with_min_width(40.0)],
            500.0,
        )
        .unwrap();
        assert_eq!(layout.columns[0].width, 40.0);
    }

    #[test]
    fn test_percent_width() {
        let layout = resolve(
            vec![Column::new("a", "A").with_width(ColumnWidth::Percent(25.0))],
            800.0,
        )
        .unwrap();
        assert_eq!(layout.columns[0].width, 200.0);
    }

    #[test]
    fn test_frozen_columns_move_to_front_in_order() {
        let layout = resolve(
            vec![
                Column::new("a", "A").with_width(ColumnWidth::Px(100.0)),
                Column::new("f1", "F1").with_width(ColumnWidth::Px(80.0)).frozen(),
                Column::new("b", "B").with_width(ColumnWidth::Px(100.0)),
                Column::new("f2", "F2").with_width(ColumnWidth::Px(80.0)).frozen(),
            ],
            1000.0,
        )
        .unwrap();

        let keys: Vec<&str> = layout.columns.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["f1", "f2", "a", "b"]);
        assert_eq!(layout.last_frozen_column_index, Some(1));
        assert_eq!(layout.frozen_count(), 2);
        assert_eq!(layout.total_frozen_width, 160.0);
        assert!(layout.columns[1].is_last_frozen_column);
        assert!(!layout.columns[0].is_last_frozen_column);
        assert_eq!(layout.by_key("b").unwrap().idx, 3);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = resolve(vec![Column::new("a", "A"), Column::new("a", "Again")], 500.0)
            .unwrap_err();
        assert!(matches!(err, GridError::DuplicateColumnKey(ref k) if k == "a"));
    }

    #[test]
    fn test_min_greater_than_max_is_rejected() {
        let err = resolve(
            vec![Column::new("a", "A").with_min_width(200.0).with_max_width(100.0)],
            500.0,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidWidthBounds { .. }));
    }

    #[test]
    fn test_declared_bound_overrides_default() {
        let layout = resolve(
            vec![
                Column::new("narrow", "Narrow").with_max_width(30.0),
                Column::new("wide", "Wide").with_width(ColumnWidth::Px(40.0)),
            ],
            500.0,
        )
        .unwrap();
        let narrow = layout.by_key("narrow").unwrap();
        assert_eq!(narrow.min_width, 30.0);
        assert_eq!(narrow.max_width, Some(30.0));
        assert_eq!(narrow.width, 30.0);
        // The inherited min still applies where nothing contradicts it
        assert_eq!(layout.by_key("wide").unwrap().width, 50.0);

        let defaults = DefaultColumnOptions {
            max_width: Some(100.0),
            ..DefaultColumnOptions::default()
        };
        let columns = vec![Rc::new(Column::<()>::new("a", "A").with_min_width(150.0))];
        let layout = resolve_columns(&columns, 500.0, &defaults, &HashMap::new()).unwrap();
        assert_eq!(layout.columns[0].width, 150.0);
        assert_eq!(layout.columns[0].max_width, Some(150.0));
    }

    #[test]
    fn test_negative_width_is_rejected() {
        let err = resolve(
            vec![Column::new("a", "A").with_width(ColumnWidth::Px(-5.0))],
            500.0,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidColumnWidth { .. }));
    }

    #[test]
    fn test_max_content_uses_measured_width() {
        let mut measured = HashMap::new();
        measured.insert("a".to_string(), 173.0);
        let layout = resolve_columns(
            &cols(vec![
                Column::new("a", "A").with_width(ColumnWidth::MaxContent),
                Column::new("b", "B").with_width(ColumnWidth::MaxContent),
            ]),
            400.0,
            &DefaultColumnOptions::default(),
            &measured,
        )
        .unwrap();

        assert_eq!(layout.columns[0].width, 173.0);
        // Unmeasured falls back to flexible sizing
        assert_eq!(layout.columns[1].width, 227.0);
    }

    #[test]
    fn test_col_at_x() {
        let layout = resolve(
            vec![
                Column::new("a", "A").with_width(ColumnWidth::Px(80.0)),
                Column::new("b", "B").with_width(ColumnWidth::Px(120.0)),
            ],
            1000.0,
        )
        .unwrap();

        assert_eq!(layout.col_at_x(0.0), Some(0));
        assert_eq!(layout.col_at_x(79.9), Some(0));
        assert_eq!(layout.col_at_x(80.0), Some(1));
        assert_eq!(layout.col_at_x(199.0), Some(1));
        assert_eq!(layout.col_at_x(200.0), None);
        assert_eq!(layout.col_at_x(-1.0), None);
    }

    #[test]
    fn test_default_options_apply() {
        let defaults = DefaultColumnOptions {
            sortable: true,
            ..DefaultColumnOptions::default()
        };
        let layout = resolve_columns(
            &cols(vec![
                Column::new("a", "A"),
                Column::new("b", "B").with_width(ColumnWidth::Px(10.0)),
            ]),
            400.0,
            &defaults,
            &HashMap::new(),
        )
        .unwrap();
        assert!(layout.columns[0].sortable);
        assert_eq!(layout.columns[1].width, 50.0);
    }
}
