//! Header sort cycle and row ordering.
//!
//! The sort specification is owned by the caller. A header click computes the
//! next specification with [`next_sort_columns`]; the caller stores it and
//! feeds it back on the next render.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::types::{Column, GridRow, SortColumn, SortDirection};

/// Direction and display priority of a column in the sort specification.
///
/// Priority is 1-based and only reported when more than one column is sorted.
pub fn sort_state(sort_columns: &[SortColumn], key: &str) -> (Option<SortDirection>, Option<usize>) {
    let Some(index) = sort_columns.iter().position(|s| s.column_key == key) else {
        return (None, None);
    };
    let direction = sort_columns.get(index).map(|s| s.direction);
    let priority = (sort_columns.len() > 1).then_some(index + 1);
    (direction, priority)
}

/// Sort specification after a header click on `key`.
///
/// Cycles first direction → reversed → unsorted, where the first direction is
/// DESC for `descending_first` columns and ASC otherwise. An additive click
/// (Ctrl/Cmd) keeps the other sort columns; a plain click replaces them.
pub fn next_sort_columns(
    current: &[SortColumn],
    key: &str,
    additive: bool,
    descending_first: bool,
) -> Vec<SortColumn> {
    let first = if descending_first {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    let Some(index) = current.iter().position(|s| s.column_key == key) else {
        let next = SortColumn::new(key, first);
        if additive {
            let mut columns = current.to_vec();
            columns.push(next);
            return columns;
        }
        return vec![next];
    };

    let next = current
        .get(index)
        .filter(|s| s.direction == first)
        .map(|s| SortColumn::new(key, s.direction.reversed()));

    if additive {
        let mut columns = current.to_vec();
        match next {
            Some(next) => {
                if let Some(slot) = columns.get_mut(index) {
                    *slot = next;
                }
            }
            None => {
                columns.remove(index);
            }
        }
        columns
    } else {
        next.into_iter().collect()
    }
}

/// Rows ordered by the sort specification (stable).
///
/// Each sort column uses its column's comparator when present and the
/// natural [`CellValue`](crate::types::CellValue) ordering otherwise. Sort
/// columns that match no column are compared by value.
pub fn sort_rows<R: GridRow, SR>(
    rows: &[R],
    sort_columns: &[SortColumn],
    columns: &[Rc<Column<R, SR>>],
) -> Vec<R> {
    let mut sorted = rows.to_vec();
    if sort_columns.is_empty() {
        return sorted;
    }

    let comparators: Vec<_> = sort_columns
        .iter()
        .map(|sort| {
            let comparator = columns
                .iter()
                .find(|c| c.key == sort.column_key)
                .and_then(|c| c.sort_comparator.clone());
            (sort, comparator)
        })
        .collect();

    sorted.sort_by(|a, b| {
        for (sort, comparator) in &comparators {
            let ordering = match comparator {
                Some(compare) => compare(a, b),
                None => {
                    let left = a.cell_value(&sort.column_key).unwrap_or_default();
                    let right = b.cell_value(&sort.column_key).unwrap_or_default();
                    left.compare(&right)
                }
            };
            let ordering = match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    sorted
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
    use crate::types::{CellValue, JsonRow};
    use serde_json::json;
    use test_case::test_case;

    fn asc(key: &str) -> SortColumn {
        SortColumn::new(key, SortDirection::Asc)
    }

    fn desc(key: &str) -> SortColumn {
        SortColumn::new(key, SortDirection::Desc)
    }

    #[test_case(vec![], false => vec![asc("a")]; "unsorted to asc")]
    #[test_case(vec![asc("a")], false => vec![desc("a")]; "asc to desc")]
    #[test_case(vec![desc("a")], false => Vec::<SortColumn>::new(); "desc to unsorted")]
    #[test_case(vec![asc("b")], false => vec![asc("a")]; "plain click replaces")]
    #[test_case(vec![asc("b")], true => vec![asc("b"), asc("a")]; "additive click appends")]
    #[test_case(vec![asc("a"), asc("b")], true => vec![desc("a"), asc("b")]; "additive toggles in place")]
    #[test_case(vec![desc("a"), asc("b")], true => vec![asc("b")]; "additive removes")]
    fn test_sort_cycle(current: Vec<SortColumn>, additive: bool) -> Vec<SortColumn> {
        next_sort_columns(&current, "a", additive, false)
    }

    #[test]
    fn test_descending_first_cycle() {
        let step1 = next_sort_columns(&[], "a", false, true);
        assert_eq!(step1, vec![desc("a")]);
        let step2 = next_sort_columns(&step1, "a", false, true);
        assert_eq!(step2, vec![asc("a")]);
        let step3 = next_sort_columns(&step2, "a", false, true);
        assert!(step3.is_empty());
    }

    #[test]
    fn test_sort_state_priority() {
        assert_eq!(sort_state(&[asc("a")], "a"), (Some(SortDirection::Asc), None));
        let multi = [asc("a"), desc("b")];
        assert_eq!(sort_state(&multi, "b"), (Some(SortDirection::Desc), Some(2)));
        assert_eq!(sort_state(&multi, "c"), (None, None));
    }

    fn rows() -> Vec<JsonRow> {
        [
            json!({"id": 1, "group": "b", "n": 3}),
            json!({"id": 2, "group": "a", "n": 5}),
            json!({"id": 3, "group": "b", "n": 1}),
            json!({"id": 4, "group": "a", "n": 2}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    fn ids(rows: &[JsonRow]) -> Vec<CellValue> {
        rows.iter().map(|r| r.cell_value("id").unwrap()).collect()
    }

    #[test]
    fn test_sort_rows_multi_column() {
        let columns: Vec<Rc<Column<JsonRow>>> = Vec::new();
        let sorted = sort_rows(&rows(), &[asc("group"), desc("n")], &columns);
        assert_eq!(
            ids(&sorted),
            vec![2.0, 4.0, 1.0, 3.0]
                .into_iter()
                .map(CellValue::Number)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_sort_rows_uses_comparator() {
        let columns = vec![Rc::new(
            Column::<JsonRow>::new("group", "Group").with_sort_comparator(|a, b| {
                // Reverse alphabetical
                let a = a.cell_value("group").unwrap_or_default();
                let b = b.cell_value("group").unwrap_or_default();
                b.compare(&a)
            }),
        )];
        let sorted = sort_rows(&rows(), &[asc("group")], &columns);
        assert_eq!(
            ids(&sorted),
            vec![1.0, 3.0, 2.0, 4.0]
                .into_iter()
                .map(CellValue::Number)
                .collect::<Vec<_>>()
        );
    }
}
