use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::minmax::FixedRange;

/// Which tensor cells of a column are plotted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSelect {
    /// One series from the given cell
    Fixed(usize),
    /// One series per cell of the column
    All,
}

impl Default for CellSelect {
    fn default() -> Self {
        CellSelect::Fixed(0)
    }
}

impl CellSelect {
    /// Concrete cell indices for a column with `cell_size` cells per row
    pub fn cells(&self, cell_size: usize) -> Vec<usize> {
        match self {
            CellSelect::Fixed(i) => vec![*i],
            CellSelect::All => (0..cell_size).collect(),
        }
    }

    /// First selected cell, used where a single value per row is needed
    pub fn first(&self) -> usize {
        match self {
            CellSelect::Fixed(i) => *i,
            CellSelect::All => 0,
        }
    }
}

impl FromStr for CellSelect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(CellSelect::All);
        }
        s.parse::<usize>()
            .map(CellSelect::Fixed)
            .map_err(|_| anyhow!("Invalid cell selection '{}' (expected an index or 'all')", s))
    }
}

/// Display configuration for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColParams {
    pub col: String,
    #[serde(default = "default_on")]
    pub on: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub cell: CellSelect,
    #[serde(default)]
    pub err_col: Option<String>,
    #[serde(default)]
    pub range: FixedRange,
}

fn default_on() -> bool {
    true
}

fn default_color() -> String {
    "black".to_string()
}

impl ColParams {
    pub fn new(col: impl Into<String>) -> Self {
        Self {
            col: col.into(),
            on: default_on(),
            label: None,
            color: default_color(),
            cell: CellSelect::default(),
            err_col: None,
            range: FixedRange::default(),
        }
    }

    pub fn with_cell(mut self, cell: CellSelect) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_err_col(mut self, err_col: impl Into<String>) -> Self {
        self.err_col = Some(err_col.into());
        self
    }

    pub fn with_range(mut self, range: FixedRange) -> Self {
        self.range = range;
        self
    }

    pub fn off(mut self) -> Self {
        self.on = false;
        self
    }

    /// Display label: explicit label, or the column name
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.col)
    }
}

/// Plot-level configuration for the bar layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotParams {
    #[serde(default)]
    pub title: Option<String>,
    pub x_col: String,
    #[serde(default)]
    pub legend_col: Option<String>,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    /// Category label rotation in degrees
    #[serde(default)]
    pub x_axis_rot: f64,
    #[serde(default)]
    pub columns: Vec<ColParams>,
    #[serde(default)]
    pub palette: Vec<String>,
}

fn default_bar_width() -> f64 {
    0.8
}

impl PlotParams {
    pub fn new(x_col: impl Into<String>) -> Self {
        Self {
            title: None,
            x_col: x_col.into(),
            legend_col: None,
            bar_width: default_bar_width(),
            x_axis_rot: 0.0,
            columns: Vec::new(),
            palette: Vec::new(),
        }
    }

    pub fn with_column(mut self, col: ColParams) -> Self {
        self.columns.push(col);
        self
    }

    pub fn with_legend(mut self, legend_col: impl Into<String>) -> Self {
        self.legend_col = Some(legend_col.into());
        self
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid plot configuration")
    }

    /// Bar width clamped into (0, 1]; anything outside resets to the default.
    pub fn effective_bar_width(&self) -> f64 {
        if self.bar_width > 1.0 || self.bar_width <= 0.0 || self.bar_width.is_nan() {
            default_bar_width()
        } else {
            self.bar_width
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColParams> {
        self.columns.iter().find(|c| c.col == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColParams> {
        self.columns.iter_mut().find(|c| c.col == name)
    }
}
