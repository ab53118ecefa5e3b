//! Categorical bar layout.
//!
//! Every x category owns `stride` equally spaced slots. Each (numeric column,
//! legend group, tensor cell) combination gets one slot offset (`start`) inside
//! that block, the same for every category, so bars of one category sit side by
//! side and categories are separated by one empty gap slot.
//!
//! Phases run in a fixed order because later ones use totals from earlier ones:
//! census of columns (`nys`), legend split (`nleg`), stride, slot assignment,
//! category labels, then string-label overlays.

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{TableError, TableResult};
use crate::minmax::{FixedRange, Range64};
use crate::palette::{parse_color, to_hex, Palette};
use crate::params::{ColParams, PlotParams};
use crate::split::{group_by, Splits};
use crate::table::Table;
use crate::view::{IndexView, SortOrder};
use crate::xy::{ErrorPair, TableXY};

/// One positioned bar series, ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub column: String,
    pub legend: Option<String>,
    pub cell: usize,
    pub label: String,
    /// Color name, from the column or the palette
    pub color: String,
    /// `#rrggbb` form of `color`
    pub rgb: String,
    /// Slot positions: `start + i * stride`
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub errors: Option<Vec<f64>>,
    pub stride: usize,
    pub start: usize,
    pub width: f64,
}

/// Text labels drawn at the height of the first bar series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelOverlay {
    pub column: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub labels: Vec<String>,
}

/// A series that could not be built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesFailure {
    pub column: String,
    pub legend: Option<String>,
    pub cell: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: TableError,
}

fn serialize_display<S: Serializer>(err: &TableError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Result of building one candidate series
pub type Outcome<T> = std::result::Result<T, SeriesFailure>;

/// Complete bar layout
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BarLayout {
    pub title: Option<String>,
    pub series: Vec<BarSeries>,
    /// x-axis labels, one slot per position; `len() == rows * stride`
    pub categories: Vec<String>,
    /// Rotation of the category labels, in degrees
    pub x_axis_rot: f64,
    pub overlays: Vec<LabelOverlay>,
    /// Total series per category before legend fan-out
    pub nys: usize,
    pub nleg: usize,
    pub stride: usize,
    pub mid: usize,
    /// Value range of the bars (including the zero baseline and error bars),
    /// widened by any fixed column range
    pub y_range: Option<Range64>,
    pub failures: Vec<SeriesFailure>,
    pub warnings: Vec<String>,
}

impl BarLayout {
    /// True when nothing is drawn
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Category label rotation in radians
    pub fn x_label_rotation(&self) -> f64 {
        self.x_axis_rot.to_radians()
    }

    /// Steeply rotated labels hang right-aligned from their tick
    pub fn x_labels_right_aligned(&self) -> bool {
        self.x_axis_rot > 10.0
    }
}

/// `nys * nleg` slots, plus one gap slot when more than one bar shares a category
pub fn compute_stride(nys: usize, nleg: usize) -> usize {
    let stride = nys * nleg;
    if stride > 1 {
        stride + 1
    } else {
        stride
    }
}

/// Slot nearest the visual center of a stride block, biased low
pub fn compute_mid(stride: usize) -> usize {
    if stride > 1 {
        (stride - 2) / 2
    } else {
        stride.saturating_sub(1) / 2
    }
}

/// A numeric column that takes part in the layout, with its resolved cells
struct NumericCol<'p> {
    params: &'p ColParams,
    cells: Vec<usize>,
}

struct Census<'p> {
    numeric: Vec<NumericCol<'p>>,
    strings: Vec<&'p ColParams>,
    /// Fixed ranges of the numeric columns, in census order
    ranges: Vec<FixedRange>,
    nys: usize,
}

/// Values fixed once the stride is known, shared by every series of one layout
struct LayoutCtx {
    xi: usize,
    x_cell: usize,
    nleg: usize,
    stride: usize,
    mid: usize,
    width: f64,
}

/// Per-series settings shared by every cell of one column/legend pass
struct SeriesSlot<'a> {
    legend: Option<&'a str>,
    legend_idx: usize,
    col_ordinal: usize,
    expand: bool,
    start: usize,
}

/// Column, cell and range of the first bar series, whose heights anchor label overlays
struct Anchor {
    col: usize,
    cell: usize,
    range: FixedRange,
    /// Largest legend sub-view seen while building series
    maxx: usize,
}

/// Lays out bar charts for a plot configuration
#[derive(Debug, Clone)]
pub struct BarLayoutEngine<'p> {
    params: &'p PlotParams,
    palette: Palette,
}

impl<'p> BarLayoutEngine<'p> {
    pub fn new(params: &'p PlotParams, palette: Palette) -> Self {
        Self { params, palette }
    }

    /// Compute the layout for `view`.
    ///
    /// Only a missing x column is an error; per-series problems are logged and
    /// recorded in `failures` / `warnings`.
    pub fn layout(&self, view: &IndexView) -> TableResult<BarLayout> {
        let params = self.params;
        let table = view.table();
        let xi = table.col_index(&params.x_col)?;
        let x_cell = params
            .column(&params.x_col)
            .map(|cp| cp.cell.first())
            .unwrap_or(0);

        let mut layout = BarLayout {
            title: params.title.clone(),
            x_axis_rot: params.x_axis_rot,
            nleg: 1,
            ..Default::default()
        };

        if view.is_empty() {
            debug!("empty view, nothing to lay out");
            return Ok(layout);
        }

        let census = self.census(table, &mut layout);
        layout.nys = census.nys;
        if census.nys == 0 {
            debug!("no numeric columns enabled, nothing to lay out");
            return Ok(layout);
        }

        let mut xview = view.clone();
        let lsplit = self.legend_split(&mut xview, xi, &mut layout);
        let nleg = lsplit.as_ref().map_or(0, Splits::len).max(1);
        let stride = compute_stride(census.nys, nleg);
        let ctx = LayoutCtx {
            xi,
            x_cell,
            nleg,
            stride,
            mid: compute_mid(stride),
            width: params.effective_bar_width(),
        };
        layout.nleg = nleg;
        layout.stride = stride;
        layout.mid = ctx.mid;
        debug!(nys = census.nys, nleg, stride, mid = ctx.mid, "bar layout");

        let mut outcomes: Vec<Outcome<BarSeries>> = Vec::new();
        let mut anchor: Option<Anchor> = None;
        let mut maxx = 0;
        let mut yoff = 0;

        for (yidx, ncol) in census.numeric.iter().enumerate() {
            let cp = ncol.params;
            let mut start = yoff;
            for li in 0..nleg {
                let (lview, legend) = match &lsplit {
                    Some(s) if li < s.len() => (&s.views[li], s.keys[li].first().map(String::as_str)),
                    _ => (&xview, None),
                };
                for &cell in &ncol.cells {
                    let slot = SeriesSlot {
                        legend,
                        legend_idx: li,
                        col_ordinal: yidx,
                        expand: ncol.cells.len() > 1,
                        start,
                    };
                    let outcome = self.build_series(lview, &ctx, cp, cell, &slot, &mut layout.warnings);
                    match &outcome {
                        Ok(_) => {
                            start += 1;
                            maxx = maxx.max(lview.len());
                            if anchor.is_none() {
                                anchor = Some(Anchor {
                                    col: table.col_index(&cp.col)?,
                                    cell,
                                    range: cp.range,
                                    maxx: 0,
                                });
                            }
                        }
                        Err(failure) => {
                            warn!(column = %failure.column, cell, error = %failure.error, "dropping bar series");
                        }
                    }
                    outcomes.push(outcome);
                }
            }
            yoff += nleg * ncol.cells.len();
        }

        for outcome in outcomes {
            match outcome {
                Ok(series) => layout.series.push(series),
                Err(failure) => layout.failures.push(failure),
            }
        }

        layout.categories = category_labels(view, xi, ctx.mid, stride)?;

        if let Some(mut anchor) = anchor {
            anchor.maxx = maxx;
            for cp in &census.strings {
                match label_overlay(&xview, &ctx, cp, &anchor) {
                    Ok(overlay) => layout.overlays.push(overlay),
                    Err(e) => {
                        warn!(column = %cp.col, error = %e, "dropping label overlay");
                        layout.warnings.push(format!("label column '{}': {}", cp.col, e));
                    }
                }
            }
        }

        layout.y_range = value_range(&layout.series, &census.ranges);
        Ok(layout)
    }

    /// Phase 1: sort enabled columns into numeric and string columns, count series.
    fn census(&self, table: &Table, layout: &mut BarLayout) -> Census<'p> {
        let params = self.params;
        let mut census = Census {
            numeric: Vec::new(),
            strings: Vec::new(),
            ranges: Vec::new(),
            nys: 0,
        };
        for cp in &params.columns {
            if !cp.on || cp.col == params.x_col {
                continue;
            }
            let col = match table.column_by_name(&cp.col) {
                Ok(col) => col,
                Err(error) => {
                    warn!(column = %cp.col, error = %error, "skipping column");
                    layout.failures.push(SeriesFailure {
                        column: cp.col.clone(),
                        legend: None,
                        cell: cp.cell.first(),
                        error,
                    });
                    continue;
                }
            };
            if col.is_string() {
                census.strings.push(cp);
                continue;
            }
            let cells = cp.cell.cells(col.cell_size());
            census.nys += cells.len();
            if cp.range.is_fixed() {
                census.ranges.push(cp.range);
            }
            census.numeric.push(NumericCol { params: cp, cells });
        }
        census
    }

    /// Phase 2: sort by (legend, x) and split by the legend column, if one is configured.
    fn legend_split(&self, xview: &mut IndexView, xi: usize, layout: &mut BarLayout) -> Option<Splits> {
        let leg = self.params.legend_col.as_deref()?;
        let li = match xview.col_index(leg) {
            Ok(li) => li,
            Err(e) => {
                warn!(legend = leg, error = %e, "legend grouping disabled");
                layout.warnings.push(format!("legend column '{}': {}", leg, e));
                return None;
            }
        };
        let split = match xview.sort_by_cols(&[li, xi], SortOrder::Ascending) {
            Ok(()) => group_by(xview, &[leg]),
            Err(e) => Err(e),
        };
        match split {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(legend = leg, error = %e, "legend grouping disabled");
                layout.warnings.push(format!("legend column '{}': {}", leg, e));
                None
            }
        }
    }

    /// Phase 4 body: one series for one column, legend group and cell.
    fn build_series(
        &self,
        lview: &IndexView,
        ctx: &LayoutCtx,
        cp: &ColParams,
        cell: usize,
        slot: &SeriesSlot<'_>,
        warnings: &mut Vec<String>,
    ) -> Outcome<BarSeries> {
        let fail = |error: TableError| SeriesFailure {
            column: cp.col.clone(),
            legend: slot.legend.map(str::to_string),
            cell,
            error,
        };

        let xy = TableXY::by_name(lview, ctx.xi, ctx.x_cell, &cp.col, cell, cp.range).map_err(fail)?;

        let mut label = cp.label().to_string();
        let mut color = cp.color.clone();
        if let Some(leg) = slot.legend.filter(|l| !l.is_empty()) {
            label = format!("{} {}", leg, label);
        }
        if ctx.nleg > 1 {
            color = self
                .palette
                .name_at(slot.col_ordinal * ctx.nleg + slot.legend_idx)
                .to_string();
        }
        if slot.expand {
            color = self.palette.name_at(cell).to_string();
            label = format!("{}_{:02}", label, cell);
        }

        // the error extractor reads the same sub-view, so both series share its length
        let err_xy = match &cp.err_col {
            None => None,
            Some(ec) => match lview
                .col_index(ec)
                .and_then(|ei| TableXY::new(lview, ctx.xi, ctx.x_cell, ei, 0, FixedRange::default()))
            {
                Ok(exy) => Some(exy),
                Err(e) => {
                    warn!(column = %cp.col, err_col = %ec, error = %e, "error bars disabled");
                    warnings.push(format!("error column '{}' for '{}': {}", ec, cp.col, e));
                    None
                }
            },
        };
        let pair = ErrorPair::new(&xy, err_xy.as_ref()).map_err(fail)?;

        let rgb = parse_color(&color).map(to_hex).unwrap_or_else(|| "#000000".to_string());
        let x = (0..pair.values.len())
            .map(|i| (slot.start + i * ctx.stride) as f64)
            .collect();

        Ok(BarSeries {
            column: cp.col.clone(),
            legend: slot.legend.map(str::to_string),
            cell,
            label,
            color,
            rgb,
            x,
            y: pair.values,
            errors: pair.errors,
            stride: ctx.stride,
            start: slot.start,
            width: ctx.width,
        })
    }
}

/// Range covering every bar top (plus/minus its error) and the zero baseline,
/// widened by the fixed ranges of the numeric columns.
fn value_range(series: &[BarSeries], fixed: &[FixedRange]) -> Option<Range64> {
    let mut range = Range64::infinity();
    for s in series {
        for (i, &y) in s.y.iter().enumerate() {
            if y.is_nan() {
                continue;
            }
            let e = s.errors.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0);
            let e = if e.is_nan() { 0.0 } else { e.abs() };
            range.fit_val_in_range(y - e);
            range.fit_val_in_range(y + e);
        }
    }
    if range.is_valid() {
        range.fit_val_in_range(0.0);
    }
    for fr in fixed {
        if fr.fix_min {
            range.min = range.min.min(fr.min);
        }
        if fr.fix_max {
            range.max = range.max.max(fr.max);
        }
    }
    if range.is_valid() {
        Some(range)
    } else {
        None
    }
}

/// Lay out `view` with the palette named in `params` (or the default palette).
pub fn layout_bars(view: &IndexView, params: &PlotParams) -> TableResult<BarLayout> {
    let palette = Palette::new(params.palette.clone());
    BarLayoutEngine::new(params, palette).layout(view)
}

/// Phase 5: one label per row of the unsorted view, at `mid + i * stride`.
fn category_labels(view: &IndexView, xi: usize, mid: usize, stride: usize) -> TableResult<Vec<String>> {
    let xc = view.table().column(xi)?;
    let netn = view.len() * stride;
    let mut vals = vec![String::new(); netn];
    for (i, &row) in view.indices().iter().enumerate() {
        let pi = mid + i * stride;
        if pi < netn {
            vals[pi] = xc.string_value(row)?;
        }
    }
    Ok(vals)
}

/// Phase 6: text of a string column at the heights of the first bar series.
fn label_overlay(
    xview: &IndexView,
    ctx: &LayoutCtx,
    cp: &ColParams,
    anchor: &Anchor,
) -> TableResult<LabelOverlay> {
    let lc = xview.col_index(&cp.col)?;
    let xy = TableXY::new(xview, ctx.xi, ctx.x_cell, anchor.col, anchor.cell, anchor.range)?
        .with_label_col(lc)?;
    let n = xy.len();
    let maxx = anchor.maxx.max(1);

    let mut overlay = LabelOverlay {
        column: cp.col.clone(),
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        labels: Vec::with_capacity(n),
    };
    for i in 0..n {
        overlay.x.push((ctx.mid + (i % maxx) * ctx.stride) as f64);
        overlay.y.push(xy.value(i)?);
        overlay.labels.push(xy.label(i)?);
    }
    Ok(overlay)
}
