//! Flight-line selection over multi-row channel plots.
//!
//! The crate has a headless core and an egui front-end:
//! - `data::grid`: rows of plots with keyed series attachment and shared x ranges
//! - `data::segments` / `data::line_select`: segment groups spanning every row,
//!   click-to-create and drag editing
//! - `data::store`: host-side persistence of committed segment edits
//! - `events`: change notifications delivered over `mpsc` channels
//! - `panels` / `app`: egui rendering and the standalone eframe window

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod panels;

// Public re-exports for a compact external API
pub use app::{run_flightline_plot, FlightPlotApp};
pub use config::LineSelectConfig;
pub use data::grid::{Axis, CurveId, GridPlot, PlotAxes, PlotItem, SeriesKey, DEFAULT_RANGE};
pub use data::line_select::LineSelectPlot;
pub use data::segments::{DragTarget, LinearSegment, LinearSegmentGroup, SegmentBound, SegmentId};
pub use data::series::{IndexKind, Series};
pub use data::store::{DataSegment, SegmentStore};
pub use data::x_formatter::{AxisFormatter, PolyAxis};
pub use error::{PlotError, Result};
pub use events::{
    EventController, EventFilter, EventKind, LineAction, LineUpdate, PlotEvent,
};
