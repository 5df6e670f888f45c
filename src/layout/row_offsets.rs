//! Cumulative row offset table.
//!
//! Uniform heights are answered arithmetically; per-row heights keep a prefix
//! table of row tops. The table is rebuilt only when a declared height
//! actually changes, and `generation` counts those rebuilds so dependent
//! caches can tell when they went stale.

use crate::config::RowHeight;

#[derive(Debug, Clone, PartialEq)]
enum Offsets {
    Uniform { height: f32, count: usize },
    /// `tops[i]` = top of row i; one trailing entry for the total height
    Variable { tops: Vec<f32> },
}

/// Row position lookups for the data rows of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOffsets {
    offsets: Offsets,
    generation: u64,
}

impl Default for RowOffsets {
    fn default() -> Self {
        Self::uniform(0.0, 0)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_index(value: f32) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // Saturating float-to-int cast
        value.floor() as usize
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f32(n: usize) -> f32 {
    n as f32
}

fn same_heights(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

fn tops_from(heights: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut tops = vec![0.0];
    let mut y = 0.0_f32;
    for h in heights {
        y += h.max(0.0);
        tops.push(y);
    }
    tops
}

impl RowOffsets {
    pub fn uniform(height: f32, count: usize) -> Self {
        Self {
            offsets: Offsets::Uniform {
                height: height.max(0.0),
                count,
            },
            generation: 0,
        }
    }

    pub fn from_heights(heights: impl IntoIterator<Item = f32>) -> Self {
        Self {
            offsets: Offsets::Variable {
                tops: tops_from(heights),
            },
            generation: 0,
        }
    }

    /// Build the table for `rows` using a declared height.
    pub fn compute<R>(rows: &[R], height: &RowHeight<R>) -> Self {
        let mut offsets = Self::default();
        offsets.update(rows, height);
        offsets.generation = 0;
        offsets
    }

    /// Recompute against new rows or heights.
    ///
    /// Returns `true` (and bumps the generation) when any row's top or height
    /// changed.
    pub fn update<R>(&mut self, rows: &[R], height: &RowHeight<R>) -> bool {
        let next = match height {
            RowHeight::Fixed(h) => Offsets::Uniform {
                height: h.max(0.0),
                count: rows.len(),
            },
            RowHeight::PerRow(f) => Offsets::Variable {
                tops: tops_from(rows.iter().enumerate().map(|(i, row)| f(row, i))),
            },
        };

        let unchanged = match (&self.offsets, &next) {
            (
                Offsets::Uniform { height, count },
                Offsets::Uniform {
                    height: next_height,
                    count: next_count,
                },
            ) => height.to_bits() == next_height.to_bits() && count == next_count,
            (Offsets::Variable { tops }, Offsets::Variable { tops: next_tops }) => {
                same_heights(tops, next_tops)
            }
            _ => false,
        };
        if unchanged {
            return false;
        }

        self.offsets = next;
        self.generation = self.generation.wrapping_add(1);
        tracing::trace!(generation = self.generation, rows = self.len(), "row offsets rebuilt");
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        match &self.offsets {
            Offsets::Uniform { count, .. } => *count,
            Offsets::Variable { tops } => tops.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self.offsets, Offsets::Uniform { .. })
    }

    /// Top of row `idx`. Indices past the end map to the total height.
    pub fn row_top(&self, idx: usize) -> f32 {
        match &self.offsets {
            Offsets::Uniform { height, count } => to_f32(idx.min(*count)) * height,
            Offsets::Variable { tops } => tops
                .get(idx)
                .or_else(|| tops.last())
                .copied()
                .unwrap_or(0.0),
        }
    }

    pub fn row_height(&self, idx: usize) -> f32 {
        match &self.offsets {
            Offsets::Uniform { height, count } => {
                if idx < *count {
                    *height
                } else {
                    0.0
                }
            }
            Offsets::Variable { tops } => match (tops.get(idx), tops.get(idx + 1)) {
                (Some(top), Some(bottom)) => bottom - top,
                _ => 0.0,
            },
        }
    }

    pub fn total_height(&self) -> f32 {
        self.row_top(self.len())
    }

    /// First row whose bottom edge is below `y`.
    pub fn first_row_ending_after(&self, y: f32) -> Option<usize> {
        let count = self.len();
        if count == 0 {
            return None;
        }
        let idx = match &self.offsets {
            Offsets::Uniform { height, .. } => {
                if *height <= 0.0 {
                    return None;
                }
                floor_index(y / height)
            }
            Offsets::Variable { tops } => {
                let bottoms = tops.get(1..)?;
                bottoms.partition_point(|&bottom| bottom <= y)
            }
        };
        (idx < count).then_some(idx)
    }

    /// Last row whose top edge is above `y`.
    pub fn last_row_starting_before(&self, y: f32) -> Option<usize> {
        let count = self.len();
        if count == 0 || y <= 0.0 {
            return None;
        }
        match &self.offsets {
            Offsets::Uniform { height, .. } => {
                if *height <= 0.0 {
                    return count.checked_sub(1);
                }
                let idx = floor_index((y / height).ceil()).checked_sub(1)?;
                Some(idx.min(count - 1))
            }
            Offsets::Variable { tops } => {
                let starts = tops.get(..count)?;
                starts.partition_point(|&top| top < y).checked_sub(1)
            }
        }
    }

    /// Row containing `y`, clamped to the first/last row.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.first_row_ending_after(y)
            .or_else(|| self.len().checked_sub(1))
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
    use std::rc::Rc;

    #[test]
    fn test_uniform_lookups() {
        let offsets = RowOffsets::uniform(35.0, 100);
        assert_eq!(offsets.row_top(3), 105.0);
        assert_eq!(offsets.total_height(), 3500.0);
        assert_eq!(offsets.first_row_ending_after(0.0), Some(0));
        assert_eq!(offsets.first_row_ending_after(34.9), Some(0));
        assert_eq!(offsets.first_row_ending_after(35.0), Some(1));
        assert_eq!(offsets.last_row_starting_before(350.0), Some(9));
        assert_eq!(offsets.last_row_starting_before(350.5), Some(10));
        assert_eq!(offsets.last_row_starting_before(0.0), None);
        assert_eq!(offsets.first_row_ending_after(3500.0), None);
        assert_eq!(offsets.last_row_starting_before(99_999.0), Some(99));
    }

    #[test]
    fn test_variable_lookups() {
        let offsets = RowOffsets::from_heights([10.0, 20.0, 30.0]);
        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets.row_top(2), 30.0);
        assert_eq!(offsets.row_height(2), 30.0);
        assert_eq!(offsets.total_height(), 60.0);
        assert_eq!(offsets.first_row_ending_after(10.0), Some(1));
        assert_eq!(offsets.first_row_ending_after(9.0), Some(0));
        assert_eq!(offsets.last_row_starting_before(30.0), Some(1));
        assert_eq!(offsets.last_row_starting_before(30.5), Some(2));
        assert_eq!(offsets.row_at(1000.0), Some(2));
    }

    #[test]
    fn test_update_detects_changes() {
        let rows = vec![1_u32, 2, 3];
        let fixed = RowHeight::Fixed(35.0);
        let mut offsets = RowOffsets::compute(&rows, &fixed);
        assert_eq!(offsets.generation(), 0);

        assert!(!offsets.update(&rows, &fixed));
        assert_eq!(offsets.generation(), 0);

        let per_row: RowHeight<u32> = RowHeight::PerRow(Rc::new(|row, _| *row as f32 * 10.0));
        assert!(offsets.update(&rows, &per_row));
        assert_eq!(offsets.generation(), 1);
        assert_eq!(offsets.total_height(), 60.0);

        // Same declared heights, no rebuild
        assert!(!offsets.update(&rows, &per_row));

        let rows = vec![1_u32, 5, 3];
        assert!(offsets.update(&rows, &per_row));
        assert_eq!(offsets.generation(), 2);
        assert_eq!(offsets.row_top(2), 60.0);
    }

    #[test]
    fn test_empty_table() {
        let offsets = RowOffsets::default();
        assert!(offsets.is_empty());
        assert_eq!(offsets.first_row_ending_after(0.0), None);
        assert_eq!(offsets.last_row_starting_before(100.0), None);
        assert_eq!(offsets.row_at(0.0), None);
        assert_eq!(offsets.total_height(), 0.0);
    }
}
