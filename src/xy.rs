use crate::error::{check_index, TableError, TableResult};
use crate::minmax::FixedRange;
use crate::view::IndexView;

/// Lazy (x, y) accessor over a view: values are read from the store on demand.
#[derive(Debug, Clone)]
pub struct TableXY<'a> {
    view: &'a IndexView,
    x_col: usize,
    x_idx: usize,
    y_col: usize,
    y_idx: usize,
    y_range: FixedRange,
    label_col: Option<usize>,
}

impl<'a> TableXY<'a> {
    /// Build an accessor from column ordinals, validating columns and cell indices.
    pub fn new(
        view: &'a IndexView,
        x_col: usize,
        x_idx: usize,
        y_col: usize,
        y_idx: usize,
        y_range: FixedRange,
    ) -> TableResult<Self> {
        let table = view.table();
        check_index(x_idx, table.column(x_col)?.cell_size())?;
        check_index(y_idx, table.column(y_col)?.cell_size())?;
        Ok(Self {
            view,
            x_col,
            x_idx,
            y_col,
            y_idx,
            y_range,
            label_col: None,
        })
    }

    /// Same as [`TableXY::new`] with the y column looked up by name.
    pub fn by_name(
        view: &'a IndexView,
        x_col: usize,
        x_idx: usize,
        y_name: &str,
        y_idx: usize,
        y_range: FixedRange,
    ) -> TableResult<Self> {
        let y_col = view.col_index(y_name)?;
        Self::new(view, x_col, x_idx, y_col, y_idx, y_range)
    }

    /// Read labels from `col` instead of the y column
    pub fn with_label_col(mut self, col: usize) -> TableResult<Self> {
        self.view.table().column(col)?;
        self.label_col = Some(col);
        Ok(self)
    }

    pub fn view(&self) -> &'a IndexView {
        self.view
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn y_col(&self) -> usize {
        self.y_col
    }

    pub fn y_idx(&self) -> usize {
        self.y_idx
    }

    pub fn y_range(&self) -> FixedRange {
        self.y_range
    }

    /// y value at view position `pos`, clipped to the fixed range ends
    pub fn value(&self, pos: usize) -> TableResult<f64> {
        let v = self.view.float_value(self.y_col, self.y_idx, pos)?;
        Ok(self.y_range.clip(v))
    }

    /// x value at view position `pos`; string x columns use the position itself
    pub fn x_value(&self, pos: usize) -> TableResult<f64> {
        if self.view.table().column(self.x_col)?.is_string() {
            check_index(pos, self.len())?;
            return Ok(pos as f64);
        }
        self.view.float_value(self.x_col, self.x_idx, pos)
    }

    pub fn xy(&self, pos: usize) -> TableResult<(f64, f64)> {
        Ok((self.x_value(pos)?, self.value(pos)?))
    }

    /// Label text at view position `pos`
    pub fn label(&self, pos: usize) -> TableResult<String> {
        self.view
            .string_value(self.label_col.unwrap_or(self.y_col), pos)
    }

    /// All y values in view order
    pub fn values(&self) -> TableResult<Vec<f64>> {
        (0..self.len()).map(|pos| self.value(pos)).collect()
    }
}

/// A value series with optional symmetric error magnitudes, aligned position by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPair {
    pub values: Vec<f64>,
    pub errors: Option<Vec<f64>>,
}

impl ErrorPair {
    /// Materialize `xy` and, when given, `err`. Fails when the two lengths differ.
    pub fn new(xy: &TableXY<'_>, err: Option<&TableXY<'_>>) -> TableResult<Self> {
        if let Some(err) = err {
            if err.len() != xy.len() {
                return Err(TableError::ShapeMismatch {
                    expected: xy.len(),
                    found: err.len(),
                });
            }
        }
        let values = xy.values()?;
        let errors = err.map(|e| e.values()).transpose()?;
        Ok(Self { values, errors })
    }
}
