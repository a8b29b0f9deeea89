//! Draggable boundary pairs ("segments") and their cross-row groups.
//!
//! A [`LinearSegment`] is the visual of one flight line on one plot row. A
//! [`LinearSegmentGroup`] owns one segment per row and keeps them identical:
//! whatever happens to one member's boundaries is copied to the others before
//! control returns to the caller.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::data::grid::{GridPlot, RegionId};
use crate::data::series::datetime_to_secs;
use crate::error::{PlotError, Result};
use crate::events::{LineAction, LineUpdate};

// ─────────────────────────────────────────────────────────────────────────────
// SegmentId
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier of one segment group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    /// A fresh random identifier (32 hex digits).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SegmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SegmentBound
// ─────────────────────────────────────────────────────────────────────────────

/// A segment boundary as supplied by the host: raw POSIX seconds or a date-time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentBound {
    Timestamp(f64),
    Utc(DateTime<Utc>),
    /// Wall-clock time in the local zone; may be ambiguous around DST changes.
    Local(NaiveDateTime),
}

impl SegmentBound {
    /// The boundary as fractional POSIX seconds.
    pub fn to_timestamp(&self) -> Result<f64> {
        match self {
            SegmentBound::Timestamp(t) if t.is_finite() => Ok(*t),
            SegmentBound::Timestamp(t) => Err(PlotError::TimestampConversion(t.to_string())),
            SegmentBound::Utc(dt) => Ok(datetime_to_secs(dt)),
            SegmentBound::Local(naive) => Local
                .from_local_datetime(naive)
                .single()
                .map(|dt| datetime_to_secs(&dt.with_timezone(&Utc)))
                .ok_or_else(|| PlotError::TimestampConversion(naive.to_string())),
        }
    }
}

impl From<f64> for SegmentBound {
    fn from(t: f64) -> Self {
        SegmentBound::Timestamp(t)
    }
}

impl From<i64> for SegmentBound {
    fn from(t: i64) -> Self {
        SegmentBound::Timestamp(t as f64)
    }
}

impl From<DateTime<Utc>> for SegmentBound {
    fn from(dt: DateTime<Utc>) -> Self {
        SegmentBound::Utc(dt)
    }
}

impl From<NaiveDateTime> for SegmentBound {
    fn from(naive: NaiveDateTime) -> Self {
        SegmentBound::Local(naive)
    }
}

/// Which part of a segment the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Start,
    Stop,
    /// Inside the region; drags both boundaries together.
    Body,
}

// ─────────────────────────────────────────────────────────────────────────────
// LinearSegment
// ─────────────────────────────────────────────────────────────────────────────

/// One row's boundary pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSegment {
    row: usize,
    region: RegionId,
    start: f64,
    stop: f64,
    label: String,
    movable: bool,
}

impl LinearSegment {
    fn new(row: usize, region: RegionId, a: f64, b: f64) -> Self {
        Self {
            row,
            region,
            start: a.min(b),
            stop: a.max(b),
            label: String::new(),
            movable: true,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn region_id(&self) -> RegionId {
        self.region
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// `(start, stop)`, always ordered.
    pub fn region(&self) -> (f64, f64) {
        (self.start, self.stop)
    }

    pub fn label_text(&self) -> &str {
        &self.label
    }

    pub fn movable(&self) -> bool {
        self.movable
    }

    /// Place the handles at `a` and `b`; whichever is smaller becomes the start.
    fn set_region(&mut self, a: f64, b: f64) {
        self.start = a.min(b);
        self.stop = a.max(b);
    }

    /// `true` when `x` lies within `[start, stop]`.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.stop
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LinearSegmentGroup
// ─────────────────────────────────────────────────────────────────────────────

/// One logical flight line, drawn once on every row of the grid.
#[derive(Debug, Clone)]
pub struct LinearSegmentGroup {
    uid: SegmentId,
    start: f64,
    stop: f64,
    label: String,
    movable: bool,
    segments: Vec<LinearSegment>,
}

impl LinearSegmentGroup {
    /// Create the group and place one region visual on each row of `grid`.
    pub fn new(
        uid: SegmentId,
        start: f64,
        stop: f64,
        label: &str,
        movable: bool,
        grid: &mut GridPlot,
    ) -> Result<Self> {
        let mut segments = Vec::with_capacity(grid.rows());
        for row in 0..grid.rows() {
            let region = grid.attach_region(row)?;
            segments.push(LinearSegment::new(row, region, start, stop));
        }
        let mut group = Self {
            uid,
            start: start.min(stop),
            stop: start.max(stop),
            label: String::new(),
            movable,
            segments,
        };
        group.set_label(label);
        group.set_movable(movable);
        Ok(group)
    }

    pub fn uid(&self) -> &SegmentId {
        &self.uid
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn movable(&self) -> bool {
        self.movable
    }

    pub fn segments(&self) -> &[LinearSegment] {
        &self.segments
    }

    pub fn segment(&self, row: usize) -> Option<&LinearSegment> {
        self.segments.iter().find(|s| s.row == row)
    }

    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
        for seg in &mut self.segments {
            seg.movable = movable;
        }
    }

    /// A drag on `row` moved its handles to `a` / `b`; copy the result to every row.
    ///
    /// Returns `false` (and changes nothing) when the group is locked or `row`
    /// is not a member.
    pub fn region_changed(&mut self, row: usize, a: f64, b: f64) -> bool {
        if !self.movable || !(a.is_finite() && b.is_finite()) {
            return false;
        }
        let Some(source) = self.segments.iter_mut().find(|s| s.row == row) else {
            return false;
        };
        source.set_region(a, b);
        let (start, stop) = source.region();
        self.start = start;
        self.stop = stop;
        for seg in &mut self.segments {
            seg.set_region(start, stop);
        }
        true
    }

    /// Set the shared label and the text shown on every member.
    pub(crate) fn set_label(&mut self, text: &str) {
        self.label = text.to_string();
        for seg in &mut self.segments {
            seg.label = text.to_string();
        }
    }

    /// Remove every member's visual from its row.
    pub(crate) fn delete(self, grid: &mut GridPlot) -> SegmentId {
        for seg in &self.segments {
            grid.detach_region(seg.row, seg.region);
        }
        self.uid
    }

    /// Snapshot of the group as a change notification.
    pub fn to_update(&self, action: LineAction) -> LineUpdate {
        LineUpdate {
            action,
            uid: self.uid.clone(),
            start: self.start,
            stop: self.stop,
            label: self.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(rows: usize) -> (GridPlot, LinearSegmentGroup) {
        let mut grid = GridPlot::new(rows);
        let g = LinearSegmentGroup::new(SegmentId::from("g"), 10.0, 20.0, "", true, &mut grid)
            .unwrap();
        (grid, g)
    }

    #[test]
    fn handles_swap_when_dragged_past_each_other() {
        let (_grid, mut g) = group(3);
        assert!(g.region_changed(1, 30.0, 20.0));
        for seg in g.segments() {
            assert_eq!(seg.region(), (20.0, 30.0));
        }
        assert_eq!((g.start(), g.stop()), (20.0, 30.0));
    }

    #[test]
    fn locked_group_ignores_drags() {
        let (_grid, mut g) = group(2);
        g.set_movable(false);
        assert!(!g.region_changed(0, 0.0, 1.0));
        assert_eq!((g.start(), g.stop()), (10.0, 20.0));
        assert!(g.segments().iter().all(|s| !s.movable()));
    }

    #[test]
    fn delete_detaches_every_row() {
        let (mut grid, g) = group(2);
        assert_eq!(grid.get_plot(0, crate::data::grid::Axis::Left).unwrap().items().len(), 1);
        let uid = g.delete(&mut grid);
        assert_eq!(uid.as_str(), "g");
        for row in 0..2 {
            assert!(grid
                .get_plot(row, crate::data::grid::Axis::Left)
                .unwrap()
                .items()
                .is_empty());
        }
    }

    #[test]
    fn non_finite_timestamp_is_rejected() {
        assert!(matches!(
            SegmentBound::from(f64::NAN).to_timestamp(),
            Err(PlotError::TimestampConversion(_))
        ));
        assert_eq!(SegmentBound::from(12_i64).to_timestamp(), Ok(12.0));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(SegmentId::generate(), SegmentId::generate());
        assert_eq!(SegmentId::generate().as_str().len(), 32);
    }
}
