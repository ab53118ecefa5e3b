use std::collections::HashMap;

use crate::error::TableResult;
use crate::view::IndexView;

/// Ordered partition of a view by grouping-key values.
///
/// `keys[i]` holds the values of the grouping columns that produced `views[i]`.
/// Groups are ordered by first occurrence in the parent view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Splits {
    pub keys: Vec<Vec<String>>,
    pub views: Vec<IndexView>,
}

impl Splits {
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], &IndexView)> {
        self.keys.iter().map(|k| k.as_slice()).zip(self.views.iter())
    }

    /// Largest group size, 0 when there are no groups
    pub fn max_len(&self) -> usize {
        self.views.iter().map(IndexView::len).max().unwrap_or(0)
    }
}

/// Split `view` into sub-views by the distinct values of `columns`.
///
/// Rows keep the parent's order inside each group. Sort the parent on the grouping
/// columns first when groups are needed in sorted order.
pub fn group_by(view: &IndexView, columns: &[&str]) -> TableResult<Splits> {
    let table = view.table();
    let cols = columns
        .iter()
        .map(|name| table.column_by_name(name))
        .collect::<TableResult<Vec<_>>>()?;

    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();
    let mut keys: Vec<Vec<String>> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for &row in view.indices() {
        let key = cols
            .iter()
            .map(|col| col.string_value(row))
            .collect::<TableResult<Vec<_>>>()?;

        let gi = match lookup.get(&key) {
            Some(&gi) => gi,
            None => {
                let gi = groups.len();
                lookup.insert(key.clone(), gi);
                keys.push(key);
                groups.push(Vec::new());
                gi
            }
        };
        groups[gi].push(row);
    }

    let views = groups.into_iter().map(|rows| view.derive(rows)).collect();
    Ok(Splits { keys, views })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::table::{Column, Table};
    use crate::view::SortOrder;
    use std::sync::Arc;

    fn make_view() -> IndexView {
        let table = Table::from_columns(vec![
            Column::string(
                "cond",
                vec!["on".into(), "off".into(), "on".into(), "mid".into(), "off".into()],
            ),
            Column::float("run", vec![1.0, 1.0, 2.0, 2.0, 1.0]),
            Column::float("val", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
        ])
        .unwrap();
        IndexView::new(Arc::new(table))
    }

    #[test]
    fn test_groups_in_first_occurrence_order() {
        let splits = group_by(&make_view(), &["cond"]).unwrap();
        assert_eq!(
            splits.keys,
            vec![vec!["on".to_string()], vec!["off".to_string()], vec!["mid".to_string()]]
        );
        assert_eq!(splits.views[0].indices(), &[0, 2]);
        assert_eq!(splits.views[1].indices(), &[1, 4]);
        assert_eq!(splits.views[2].indices(), &[3]);
        assert_eq!(splits.max_len(), 2);
    }

    #[test]
    fn test_sorted_parent_gives_sorted_groups() {
        let mut view = make_view();
        view.sort_by_names(&["cond"], SortOrder::Ascending).unwrap();
        let splits = group_by(&view, &["cond"]).unwrap();
        let names: Vec<&str> = splits.keys.iter().map(|k| k[0].as_str()).collect();
        assert_eq!(names, vec!["mid", "off", "on"]);
    }

    #[test]
    fn test_multi_column_keys() {
        let splits = group_by(&make_view(), &["cond", "run"]).unwrap();
        assert_eq!(splits.len(), 4);
        assert_eq!(splits.keys[0], vec!["on".to_string(), "1".to_string()]);
        assert_eq!(splits.views[1].indices(), &[1, 4]);
    }

    #[test]
    fn test_split_is_permutation_of_parent() {
        let view = IndexView::with_indices(
            Arc::clone(make_view().table()),
            vec![4, 3, 3, 0, 2, 1],
        )
        .unwrap();
        let splits = group_by(&view, &["cond"]).unwrap();
        let mut rebuilt: Vec<usize> = splits
            .iter()
            .flat_map(|(_, v)| v.indices().iter().copied())
            .collect();
        let mut parent = view.indices().to_vec();
        rebuilt.sort_unstable();
        parent.sort_unstable();
        assert_eq!(rebuilt, parent);
    }

    #[test]
    fn test_empty_view_gives_no_groups() {
        let view = make_view().filter(|_, _| false);
        let splits = group_by(&view, &["cond"]).unwrap();
        assert!(splits.is_empty());
        assert_eq!(splits.max_len(), 0);
    }

    #[test]
    fn test_missing_column() {
        let err = group_by(&make_view(), &["cond", "nope"]).unwrap_err();
        assert_eq!(err, TableError::ColumnNotFound("nope".to_string()));
    }
}
