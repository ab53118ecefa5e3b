use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tabplot::{data, layout_bars, CellSelect, ColParams, IndexView, PlotParams, Table};

#[derive(Parser, Debug)]
#[command(name = "tabplot")]
#[command(about = "Lay out grouped bar charts from CSV data as JSON", long_about = None)]
struct Args {
    /// CSV input file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Read the input as a JSON array of records instead of CSV
    #[arg(long)]
    json: bool,

    /// JSON plot configuration; command-line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Column providing the x-axis categories
    #[arg(short, long)]
    x: Option<String>,

    /// Bar column as `col`, `col:<cell>` or `col:all` (repeatable)
    #[arg(short, long)]
    y: Vec<String>,

    /// Column whose distinct values become legend groups
    #[arg(short, long)]
    legend: Option<String>,

    /// Error-bar column for a bar column as `ycol=errcol` (repeatable)
    #[arg(long)]
    err: Vec<String>,

    /// Bar width as a fraction of one slot, in (0, 1]
    #[arg(long)]
    bar_width: Option<f64>,

    /// Category label rotation in degrees
    #[arg(long)]
    x_axis_rot: Option<f64>,

    /// Plot title copied into the layout
    #[arg(long)]
    title: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level for diagnostics on stderr
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let table = read_table(&args).context("Failed to read input")?;
    let params = build_params(&args)?;
    tracing::info!(rows = table.rows(), columns = table.num_columns(), "table loaded");

    let view = IndexView::new(Arc::new(table));
    let layout = layout_bars(&view, &params).context("Failed to lay out bars")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&layout)
    } else {
        serde_json::to_string(&layout)
    }
    .context("Failed to serialize layout")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write layout to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn read_table(args: &Args) -> Result<Table> {
    let reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            fs::File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    if args.json {
        data::read_json(reader)
    } else {
        data::read_csv(reader)
    }
}

/// Merge the optional config file with command-line overrides
fn build_params(args: &Args) -> Result<PlotParams> {
    let mut params = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Cannot read config '{}'", path.display()))?;
            PlotParams::from_json(&json)?
        }
        None => {
            let x = args
                .x
                .as_ref()
                .ok_or_else(|| anyhow!("No x column specified (use --x or a config file)"))?;
            PlotParams::new(x.clone())
        }
    };

    if let Some(x) = &args.x {
        params.x_col = x.clone();
    }
    if let Some(legend) = &args.legend {
        params.legend_col = Some(legend.clone());
    }
    if let Some(width) = args.bar_width {
        params.bar_width = width;
    }
    if let Some(rot) = args.x_axis_rot {
        params.x_axis_rot = rot;
    }
    if let Some(title) = &args.title {
        params.title = Some(title.clone());
    }

    for arg in &args.y {
        let (col, cell) = parse_y_arg(arg)?;
        match params.column_mut(&col) {
            Some(cp) => {
                cp.on = true;
                cp.cell = cell;
            }
            None => params.columns.push(ColParams::new(col).with_cell(cell)),
        }
    }

    for arg in &args.err {
        let (ycol, ecol) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid --err '{}' (expected ycol=errcol)", arg))?;
        let cp = params
            .column_mut(ycol.trim())
            .ok_or_else(|| anyhow!("--err refers to unknown bar column '{}'", ycol))?;
        cp.err_col = Some(ecol.trim().to_string());
    }

    if params.columns.is_empty() {
        bail!("No bar columns specified (use --y or a config file)");
    }
    Ok(params)
}

/// `col`, `col:<cell>` or `col:all`; a suffix that is not a cell stays part of the name
fn parse_y_arg(arg: &str) -> Result<(String, CellSelect)> {
    let arg = arg.trim();
    if arg.is_empty() {
        bail!("Empty --y column");
    }
    if let Some((col, cell)) = arg.rsplit_once(':') {
        if let Ok(cell) = cell.parse::<CellSelect>() {
            return Ok((col.to_string(), cell));
        }
    }
    Ok((arg.to_string(), CellSelect::default()))
}
