//! Row selection set updates.
//!
//! The selected-rows set belongs to the caller. These functions compute the
//! next set; the engine hands it back through the selected-rows callback.

use std::collections::HashSet;

use crate::types::RowKey;

/// Selected-rows set after toggling one row.
///
/// With `extend_from` (shift-click) every row strictly between the anchor and
/// `row_idx` gets the same checked state as `row_idx`.
pub fn toggle_row_selection<R>(
    selected: &HashSet<RowKey>,
    rows: &[R],
    row_key: impl Fn(&R, usize) -> RowKey,
    row_idx: usize,
    checked: bool,
    extend_from: Option<usize>,
) -> HashSet<RowKey> {
    let mut next = selected.clone();
    let mut apply = |idx: usize| {
        if let Some(row) = rows.get(idx) {
            let key = row_key(row, idx);
            if checked {
                next.insert(key);
            } else {
                next.remove(&key);
            }
        }
    };

    apply(row_idx);

    if let Some(anchor) = extend_from.filter(|&a| a != row_idx && a < rows.len()) {
        let between = if anchor < row_idx {
            anchor + 1..row_idx
        } else {
            row_idx + 1..anchor
        };
        for idx in between {
            apply(idx);
        }
    }

    next
}

/// Selected-rows set after the header "select all" checkbox changes.
pub fn select_all_rows<R>(
    rows: &[R],
    row_key: impl Fn(&R, usize) -> RowKey,
    checked: bool,
) -> HashSet<RowKey> {
    if !checked {
        return HashSet::new();
    }
    rows.iter()
        .enumerate()
        .map(|(idx, row)| row_key(row, idx))
        .collect()
}

/// `(all, some)` selection state for the header checkbox.
pub fn header_selection_state<R>(
    selected: &HashSet<RowKey>,
    rows: &[R],
    row_key: impl Fn(&R, usize) -> RowKey,
) -> (bool, bool) {
    if rows.is_empty() || selected.is_empty() {
        return (false, false);
    }
    let mut any = false;
    let mut all = true;
    for (idx, row) in rows.iter().enumerate() {
        if selected.contains(&row_key(row, idx)) {
            any = true;
        } else {
            all = false;
        }
        if any && !all {
            break;
        }
    }
    (all, any)
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

    fn key(_: &u32, idx: usize) -> RowKey {
        RowKey::from(idx)
    }

    fn keys(idx: &[i64]) -> HashSet<RowKey> {
        idx.iter().map(|&i| RowKey::Int(i)).collect()
    }

    #[test]
    fn test_shift_extends_upward() {
        let rows = vec![0_u32; 10];
        let selected = toggle_row_selection(&HashSet::new(), &rows, key, 5, true, None);
        assert_eq!(selected, keys(&[5]));
        let selected = toggle_row_selection(&selected, &rows, key, 2, true, Some(5));
        assert_eq!(selected, keys(&[2, 3, 4, 5]));
    }

    #[test]
    fn test_shift_uncheck_removes_range() {
        let rows = vec![0_u32; 10];
        let selected = keys(&[1, 2, 3, 4, 5, 6]);
        let next = toggle_row_selection(&selected, &rows, key, 5, false, Some(2));
        assert_eq!(next, keys(&[1, 2, 6]));
    }

    #[test]
    fn test_stale_anchor_is_ignored() {
        let rows = vec![0_u32; 3];
        let next = toggle_row_selection(&HashSet::new(), &rows, key, 1, true, Some(40));
        assert_eq!(next, keys(&[1]));
    }

    #[test]
    fn test_select_all_and_header_state() {
        let rows = vec![0_u32; 3];
        let all = select_all_rows(&rows, key, true);
        assert_eq!(header_selection_state(&all, &rows, key), (true, true));
        assert_eq!(
            header_selection_state(&keys(&[1]), &rows, key),
            (false, true)
        );
        let none = select_all_rows(&rows, key, false);
        assert_eq!(header_selection_state(&none, &rows, key), (false, false));
    }
}
