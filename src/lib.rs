// Library exports for tabplot

pub mod bar;
pub mod data;
pub mod error;
pub mod minmax;
pub mod palette;
pub mod params;
pub mod split;
pub mod table;
pub mod view;
pub mod xy;

pub use bar::{layout_bars, BarLayout, BarLayoutEngine, BarSeries, LabelOverlay, Outcome, SeriesFailure};
pub use error::{TableError, TableResult};
pub use palette::Palette;
pub use params::{CellSelect, ColParams, PlotParams};
pub use split::{group_by, Splits};
pub use table::{Column, ColumnKind, Table};
pub use view::{IndexView, SortOrder};
pub use xy::{ErrorPair, TableXY};
