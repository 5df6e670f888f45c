use serde::{Deserialize, Serialize};

/// A cell address in the rendered row sequence.
///
/// `row_idx` is negative for the header row and top summary rows, and
/// continues past the data rows for bottom summary rows (see [`RowBounds`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPosition {
    pub row_idx: i32,
    pub idx: usize,
}

impl CellPosition {
    pub fn new(row_idx: i32, idx: usize) -> Self {
        Self { row_idx, idx }
    }
}

/// Which part of the grid a row index falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRegion {
    Header,
    /// Index into the top summary rows
    TopSummary(usize),
    /// Index into the data rows
    Row(usize),
    /// Index into the bottom summary rows
    BottomSummary(usize),
}

/// Row counts of each region, and the row index scheme derived from them.
///
/// Layout for `top = 2, rows = 3, bottom = 1`:
/// header `-3`, top summaries `-2, -1`, data rows `0..3`, bottom summary `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowBounds {
    pub top_summary_rows: usize,
    pub rows: usize,
    pub bottom_summary_rows: usize,
}

pub(crate) fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl RowBounds {
    pub fn new(top_summary_rows: usize, rows: usize, bottom_summary_rows: usize) -> Self {
        Self {
            top_summary_rows,
            rows,
            bottom_summary_rows,
        }
    }

    /// Row index of the header row.
    pub fn header_row_idx(&self) -> i32 {
        -1 - to_i32(self.top_summary_rows)
    }

    pub fn min_row_idx(&self) -> i32 {
        self.header_row_idx()
    }

    pub fn max_row_idx(&self) -> i32 {
        to_i32(self.rows) + to_i32(self.bottom_summary_rows) - 1
    }

    pub fn contains(&self, row_idx: i32) -> bool {
        row_idx >= self.min_row_idx() && row_idx <= self.max_row_idx()
    }

    pub fn region(&self, row_idx: i32) -> Option<RowRegion> {
        if !self.contains(row_idx) {
            return None;
        }
        if row_idx == self.header_row_idx() {
            return Some(RowRegion::Header);
        }
        if row_idx < 0 {
            let offset = usize::try_from(row_idx - self.header_row_idx() - 1).ok()?;
            return Some(RowRegion::TopSummary(offset));
        }
        let idx = usize::try_from(row_idx).ok()?;
        if idx < self.rows {
            Some(RowRegion::Row(idx))
        } else {
            Some(RowRegion::BottomSummary(idx - self.rows))
        }
    }

    pub fn row_idx_of(&self, region: RowRegion) -> i32 {
        match region {
            RowRegion::Header => self.header_row_idx(),
            RowRegion::TopSummary(i) => self.header_row_idx() + 1 + to_i32(i),
            RowRegion::Row(i) => to_i32(i),
            RowRegion::BottomSummary(i) => to_i32(self.rows) + to_i32(i),
        }
    }

    /// 1-based aria row index.
    pub fn aria_row_index(&self, row_idx: i32) -> i32 {
        row_idx - self.header_row_idx() + 1
    }

    pub fn is_data_row(&self, row_idx: i32) -> bool {
        matches!(self.region(row_idx), Some(RowRegion::Row(_)))
    }

    /// Clamp a row index into `[min_row_idx, max_row_idx]`.
    pub fn clamp(&self, row_idx: i32) -> i32 {
        row_idx.clamp(self.min_row_idx(), self.max_row_idx().max(self.min_row_idx()))
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
    fn test_row_index_scheme() {
        let bounds = RowBounds::new(2, 3, 1);
        assert_eq!(bounds.header_row_idx(), -3);
        assert_eq!(bounds.max_row_idx(), 3);
        assert_eq!(bounds.region(-3), Some(RowRegion::Header));
        assert_eq!(bounds.region(-2), Some(RowRegion::TopSummary(0)));
        assert_eq!(bounds.region(-1), Some(RowRegion::TopSummary(1)));
        assert_eq!(bounds.region(0), Some(RowRegion::Row(0)));
        assert_eq!(bounds.region(2), Some(RowRegion::Row(2)));
        assert_eq!(bounds.region(3), Some(RowRegion::BottomSummary(0)));
        assert_eq!(bounds.region(4), None);
        assert_eq!(bounds.region(-4), None);
    }

    #[test]
    fn test_region_roundtrip() {
        let bounds = RowBounds::new(1, 5, 2);
        for row_idx in bounds.min_row_idx()..=bounds.max_row_idx() {
            let region = bounds.region(row_idx).unwrap();
            assert_eq!(bounds.row_idx_of(region), row_idx);
        }
    }

    #[test]
    fn test_aria_row_index() {
        let bounds = RowBounds::new(0, 10, 0);
        assert_eq!(bounds.aria_row_index(-1), 1);
        assert_eq!(bounds.aria_row_index(0), 2);

        let bounds = RowBounds::new(1, 10, 0);
        assert_eq!(bounds.aria_row_index(-2), 1);
        assert_eq!(bounds.aria_row_index(0), 3);
    }

    #[test]
    fn test_empty_grid_bounds() {
        let bounds = RowBounds::new(0, 0, 0);
        assert_eq!(bounds.min_row_idx(), -1);
        assert_eq!(bounds.max_row_idx(), -1);
        assert_eq!(bounds.clamp(5), -1);
        assert!(!bounds.is_data_row(0));
    }
}
