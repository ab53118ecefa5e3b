use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{check_index, TableError, TableResult};

/// Element kind stored by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Float,
    Tensor,
    Str,
}

/// Raw column storage. Tensor values are laid out row-major, `cells` values per row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<f64>),
    Tensor { cells: usize, values: Vec<f64> },
    Str(Vec<String>),
}

/// A named column of the store
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Float(values),
        }
    }

    pub fn string(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Str(values),
        }
    }

    /// Tensor column with `cells` values per row; `values.len()` must be a multiple of `cells`.
    pub fn tensor(name: impl Into<String>, cells: usize, values: Vec<f64>) -> TableResult<Self> {
        if cells == 0 || values.len() % cells != 0 {
            let expected = if cells == 0 {
                1
            } else {
                values.len().div_ceil(cells) * cells
            };
            return Err(TableError::ShapeMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            data: ColumnData::Tensor { cells, values },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Tensor { .. } => ColumnKind::Tensor,
            ColumnData::Str(_) => ColumnKind::Str,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self.data, ColumnData::Str(_))
    }

    /// Number of rows (outer length)
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Float(v) => v.len(),
            ColumnData::Tensor { cells, values } => values.len() / cells,
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells per row: 1 for scalar and string columns.
    pub fn cell_size(&self) -> usize {
        match &self.data {
            ColumnData::Tensor { cells, .. } => *cells,
            _ => 1,
        }
    }

    /// Numeric value at (row, cell). String columns parse their value, yielding NaN
    /// when it is not a number.
    pub fn float_value(&self, row: usize, cell: usize) -> TableResult<f64> {
        check_index(row, self.len())?;
        check_index(cell, self.cell_size())?;
        let v = match &self.data {
            ColumnData::Float(v) => v[row],
            ColumnData::Tensor { cells, values } => values[row * cells + cell],
            ColumnData::Str(v) => v[row].trim().parse::<f64>().unwrap_or(f64::NAN),
        };
        Ok(v)
    }

    /// String form of the row's value (cell 0 for tensors).
    pub fn string_value(&self, row: usize) -> TableResult<String> {
        check_index(row, self.len())?;
        let s = match &self.data {
            ColumnData::Float(v) => format_float(v[row]),
            ColumnData::Tensor { cells, values } => format_float(values[row * cells]),
            ColumnData::Str(v) => v[row].clone(),
        };
        Ok(s)
    }

    /// Orders two rows of this column: numerically (cell 0 for tensors, NaN last)
    /// or lexically for strings. Rows must be in bounds.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match &self.data {
            ColumnData::Float(v) => compare_f64(v[a], v[b]),
            ColumnData::Tensor { cells, values } => compare_f64(values[a * cells], values[b * cells]),
            ColumnData::Str(v) => v[a].cmp(&v[b]),
        }
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{}", v)
    }
}

/// Append-only columnar store. Every column has exactly `rows` rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns, checking they all share one row count.
    pub fn from_columns(columns: Vec<Column>) -> TableResult<Self> {
        let mut table = Self::new();
        for col in columns {
            table.add_column(col)?;
        }
        Ok(table)
    }

    /// Appends a column and returns its ordinal position. The first column fixes the row count.
    pub fn add_column(&mut self, column: Column) -> TableResult<usize> {
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(TableError::ShapeMismatch {
                expected: self.rows,
                found: column.len(),
            });
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> TableResult<&Column> {
        check_index(idx, self.columns.len())?;
        Ok(&self.columns[idx])
    }

    pub fn col_index(&self, name: &str) -> TableResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    pub fn column_by_name(&self, name: &str) -> TableResult<&Column> {
        let idx = self.col_index(name)?;
        Ok(&self.columns[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::string("name", vec!["a".into(), "b".into(), "c".into()]),
            Column::float("y", vec![1.0, 2.5, f64::NAN]),
            Column::tensor("t", 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_count_shared() {
        let table = sample();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.num_columns(), 3);
        for col in table.columns() {
            assert_eq!(col.len(), 3);
        }
    }

    #[test]
    fn test_add_column_shape_mismatch() {
        let mut table = sample();
        let err = table.add_column(Column::float("z", vec![1.0])).unwrap_err();
        assert_eq!(err, TableError::ShapeMismatch { expected: 3, found: 1 });
    }

    #[test]
    fn test_tensor_shape_mismatch() {
        assert!(Column::tensor("t", 2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(Column::tensor("t", 0, vec![]).is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        let table = sample();
        assert_eq!(table.col_index("y").unwrap(), 1);
        assert_eq!(
            table.col_index("missing"),
            Err(TableError::ColumnNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_values() {
        let table = sample();
        let t = table.column_by_name("t").unwrap();
        assert_eq!(t.kind(), ColumnKind::Tensor);
        assert_eq!(t.cell_size(), 2);
        assert_eq!(t.float_value(1, 1).unwrap(), 4.0);
        assert!(t.float_value(1, 2).is_err());
        assert!(t.float_value(3, 0).is_err());
        assert_eq!(t.string_value(2).unwrap(), "5");

        let y = table.column_by_name("y").unwrap();
        assert_eq!(y.string_value(1).unwrap(), "2.5");
        assert_eq!(y.string_value(2).unwrap(), "NaN");

        let name = table.column_by_name("name").unwrap();
        assert!(name.float_value(0, 0).unwrap().is_nan());
        assert_eq!(name.string_value(0).unwrap(), "a");
    }

    #[test]
    fn test_compare_rows_nan_last() {
        let table = sample();
        let y = table.column_by_name("y").unwrap();
        assert_eq!(y.compare_rows(0, 1), Ordering::Less);
        assert_eq!(y.compare_rows(2, 0), Ordering::Greater);
    }
}
