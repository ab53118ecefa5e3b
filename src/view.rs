use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{check_index, TableResult};
use crate::table::Table;

/// Sort direction for [`IndexView::sort_by_names`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// An ordered list of row indices into a shared [`Table`].
///
/// Views never touch the store: sorting and filtering only rearrange the private
/// index vector, so any number of views can be derived from one table and used
/// from different threads.
#[derive(Debug, Clone)]
pub struct IndexView {
    table: Arc<Table>,
    idxs: Vec<usize>,
}

impl IndexView {
    /// View over every row of the table, in storage order
    pub fn new(table: Arc<Table>) -> Self {
        let idxs = (0..table.rows()).collect();
        Self { table, idxs }
    }

    /// View over an explicit index list; duplicates and omissions are allowed.
    pub fn with_indices(table: Arc<Table>, idxs: Vec<usize>) -> TableResult<Self> {
        let rows = table.rows();
        for &idx in &idxs {
            check_index(idx, rows)?;
        }
        Ok(Self { table, idxs })
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.idxs
    }

    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }

    /// Store row at view position `pos`
    pub fn row_at(&self, pos: usize) -> TableResult<usize> {
        check_index(pos, self.idxs.len())?;
        Ok(self.idxs[pos])
    }

    /// Stable sort on one or more columns, compared left to right.
    pub fn sort_by_names(&mut self, names: &[&str], order: SortOrder) -> TableResult<()> {
        let cols = names
            .iter()
            .map(|name| self.table.col_index(name))
            .collect::<TableResult<Vec<_>>>()?;
        self.sort_by_cols(&cols, order)
    }

    /// Stable sort on column ordinals.
    pub fn sort_by_cols(&mut self, cols: &[usize], order: SortOrder) -> TableResult<()> {
        let columns = cols
            .iter()
            .map(|&ci| self.table.column(ci))
            .collect::<TableResult<Vec<_>>>()?;

        self.idxs.sort_by(|&a, &b| {
            let ord = columns
                .iter()
                .map(|col| col.compare_rows(a, b))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        Ok(())
    }

    /// New view keeping only rows for which `pred(table, row)` holds, in the same order.
    pub fn filter<F>(&self, pred: F) -> IndexView
    where
        F: Fn(&Table, usize) -> bool,
    {
        let idxs = self
            .idxs
            .iter()
            .copied()
            .filter(|&row| pred(&self.table, row))
            .collect();
        Self {
            table: Arc::clone(&self.table),
            idxs,
        }
    }

    /// Sub-view over explicit store rows of the same table
    pub(crate) fn derive(&self, idxs: Vec<usize>) -> IndexView {
        Self {
            table: Arc::clone(&self.table),
            idxs,
        }
    }

    /// Column lookup through the view's table
    pub fn col_index(&self, name: &str) -> TableResult<usize> {
        self.table.col_index(name)
    }

    /// String value of column `col` at view position `pos`
    pub fn string_value(&self, col: usize, pos: usize) -> TableResult<String> {
        let row = self.row_at(pos)?;
        self.table.column(col)?.string_value(row)
    }

    /// Numeric value of column `col`, cell `cell`, at view position `pos`
    pub fn float_value(&self, col: usize, cell: usize, pos: usize) -> TableResult<f64> {
        let row = self.row_at(pos)?;
        self.table.column(col)?.float_value(row, cell)
    }
}

impl PartialEq for IndexView {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.table, &other.table) && self.idxs == other.idxs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::table::Column;

    fn make_table() -> Arc<Table> {
        Arc::new(
            Table::from_columns(vec![
                Column::string(
                    "g",
                    vec!["b".into(), "a".into(), "b".into(), "a".into(), "c".into()],
                ),
                Column::float("v", vec![3.0, 1.0, 1.0, 1.0, 2.0]),
                Column::float("id", vec![0.0, 1.0, 2.0, 3.0, 4.0]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_new_view_covers_all_rows() {
        let view = IndexView::new(make_table());
        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_with_indices_validates() {
        let table = make_table();
        assert!(IndexView::with_indices(Arc::clone(&table), vec![4, 4, 0]).is_ok());
        let err = IndexView::with_indices(table, vec![5]).unwrap_err();
        assert_eq!(err, TableError::IndexOutOfRange { index: 5, len: 5 });
    }

    #[test]
    fn test_row_at_out_of_range() {
        let view = IndexView::new(make_table());
        assert_eq!(view.row_at(4).unwrap(), 4);
        assert!(matches!(
            view.row_at(5),
            Err(TableError::IndexOutOfRange { index: 5, len: 5 })
        ));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut view = IndexView::new(make_table());
        view.sort_by_names(&["v"], SortOrder::Ascending).unwrap();
        // rows 1, 2, 3 tie on v == 1.0 and keep their relative order
        assert_eq!(view.indices(), &[1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let mut view = IndexView::new(make_table());
        view.sort_by_names(&["v"], SortOrder::Descending).unwrap();
        assert_eq!(view.indices(), &[0, 4, 1, 2, 3]);
    }

    #[test]
    fn test_sort_multi_key() {
        let mut view = IndexView::new(make_table());
        view.sort_by_names(&["g", "v"], SortOrder::Ascending).unwrap();
        assert_eq!(view.indices(), &[1, 3, 2, 0, 4]);
    }

    #[test]
    fn test_sort_missing_column() {
        let mut view = IndexView::new(make_table());
        let err = view.sort_by_names(&["nope"], SortOrder::Ascending).unwrap_err();
        assert_eq!(err, TableError::ColumnNotFound("nope".to_string()));
        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sort_does_not_touch_other_views() {
        let table = make_table();
        let original = IndexView::new(Arc::clone(&table));
        let mut sorted = original.clone();
        sorted.sort_by_names(&["g"], SortOrder::Ascending).unwrap();
        assert_eq!(original.indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(table.column(2).unwrap().float_value(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_filter_preserves_order() {
        let table = make_table();
        let g = table.col_index("g").unwrap();
        let view = IndexView::with_indices(Arc::clone(&table), vec![4, 3, 2, 1, 0]).unwrap();
        let filtered = view.filter(|t, row| {
            t.column(g).map(|c| c.string_value(row).unwrap_or_default() != "a").unwrap_or(false)
        });
        assert_eq!(filtered.indices(), &[4, 2, 0]);
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_view_is_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<IndexView>();
    }

    #[test]
    fn test_values_through_view() {
        let table = make_table();
        let view = IndexView::with_indices(table, vec![2, 0]).unwrap();
        assert_eq!(view.string_value(0, 0).unwrap(), "b");
        assert_eq!(view.float_value(1, 0, 1).unwrap(), 3.0);
        assert!(view.float_value(1, 0, 2).is_err());
    }
}
