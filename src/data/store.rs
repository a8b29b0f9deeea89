//! Host-side record of committed flight lines.
//!
//! [`SegmentStore`] is what an application keeps next to its dataset: it is fed
//! the [`LineUpdate`]s published by a [`LineSelectPlot`] and can seed a fresh
//! plot with everything it holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::line_select::LineSelectPlot;
use crate::data::segments::SegmentId;
use crate::data::series::datetime_to_secs;
use crate::error::{PlotError, Result};
use crate::events::{secs_to_datetime, LineAction, LineUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSegment {
    pub uid: SegmentId,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub label: String,
    /// Position in insertion order, starting at 0.
    pub sequence: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentStore {
    segments: Vec<DataSegment>,
    next_sequence: usize,
}

fn to_utc(secs: f64) -> Result<DateTime<Utc>> {
    secs_to_datetime(secs).ok_or_else(|| {
        log::error!("cannot convert {secs} to a POSIX timestamp");
        PlotError::TimestampConversion(secs.to_string())
    })
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[DataSegment] {
        &self.segments
    }

    pub fn get(&self, uid: &SegmentId) -> Option<&DataSegment> {
        self.segments.iter().find(|s| &s.uid == uid)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn add_segment(&mut self, uid: SegmentId, start: f64, stop: f64, label: &str) -> Result<()> {
        if self.get(&uid).is_some() {
            return Err(PlotError::DuplicateSegment(uid));
        }
        let (start, stop) = (to_utc(start)?, to_utc(stop)?);
        self.segments.push(DataSegment {
            uid,
            start,
            stop,
            label: label.to_string(),
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        Ok(())
    }

    pub fn update_segment(&mut self, uid: &SegmentId, start: f64, stop: f64, label: &str) -> Result<()> {
        let (start, stop) = (to_utc(start)?, to_utc(stop)?);
        let seg = self
            .segments
            .iter_mut()
            .find(|s| &s.uid == uid)
            .ok_or_else(|| PlotError::SegmentNotFound(uid.clone()))?;
        seg.start = start;
        seg.stop = stop;
        seg.label = label.to_string();
        Ok(())
    }

    pub fn remove_segment(&mut self, uid: &SegmentId) -> Result<DataSegment> {
        let pos = self
            .segments
            .iter()
            .position(|s| &s.uid == uid)
            .ok_or_else(|| PlotError::SegmentNotFound(uid.clone()))?;
        Ok(self.segments.remove(pos))
    }

    /// Persist one change notification.
    pub fn apply(&mut self, update: &LineUpdate) -> Result<()> {
        log::debug!("{} segment {}", update.action, update.uid);
        match update.action {
            LineAction::Add => {
                self.add_segment(update.uid.clone(), update.start, update.stop, &update.label)
            }
            LineAction::Modify => {
                self.update_segment(&update.uid, update.start, update.stop, &update.label)
            }
            LineAction::Remove => self.remove_segment(&update.uid).map(|_| ()),
        }
    }

    /// Load every stored segment into `plot` without publishing notifications.
    ///
    /// Returns the number of segments added.
    pub fn seed(&self, plot: &mut LineSelectPlot) -> Result<usize> {
        for seg in &self.segments {
            plot.add_segment(
                datetime_to_secs(&seg.start),
                datetime_to_secs(&seg.stop),
                &seg.label,
                Some(seg.uid.clone()),
                false,
            )?;
        }
        Ok(self.segments.len())
    }
}
