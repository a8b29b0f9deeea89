//! Error type shared by the grid, segment and store layers.

use crate::data::grid::{Axis, CurveId};
use crate::data::segments::SegmentId;

/// Everything that can go wrong when mutating the plot grid or its segments.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    /// A series was attached (or looked up) with an empty name.
    #[error("series name must not be empty")]
    EmptySeriesName,

    /// No series is attached under the given key.
    #[error("no series '{name}' on row {row}, col {col}, {axis} axis")]
    SeriesNotFound {
        name: String,
        row: usize,
        col: usize,
        axis: Axis,
    },

    #[error("plot row {0} is out of bounds")]
    RowOutOfBounds(usize),

    #[error("plot column {0} is out of bounds")]
    ColOutOfBounds(usize),

    /// The right-hand axis was requested on a grid built without `multiy`.
    #[error("{0} axis is not available on this grid")]
    AxisUnavailable(Axis),

    #[error("plot item {0} is not attached to this grid")]
    ItemNotFound(CurveId),

    #[error("segment {0} already exists")]
    DuplicateSegment(SegmentId),

    #[error("segment {0} not found")]
    SegmentNotFound(SegmentId),

    /// A segment boundary could not be expressed as a POSIX timestamp.
    #[error("cannot convert {0} to a POSIX timestamp")]
    TimestampConversion(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;
