//! The multi-row channel plot with flight-line segment editing.
//!
//! [`LineSelectPlot`] wraps a [`GridPlot`] and adds segment groups on top of it.
//! It has two modes:
//!
//! * **locked** (default) – segments are drawn but cannot be dragged, and
//!   clicking the plot does nothing;
//! * **interactive** – every segment is draggable and a click that is not close
//!   to an existing boundary creates a new segment around the click.
//!
//! Every committed change (add, drag release, label edit, removal) is published
//! as a [`LineUpdate`] through the plot's [`EventController`].

use std::collections::HashMap;

use crate::config::LineSelectConfig;
use crate::data::grid::{Axis, CurveId, GridPlot, PlotAxes, SeriesKey};
use crate::data::segments::{DragTarget, LinearSegmentGroup, SegmentBound, SegmentId};
use crate::data::series::Series;
use crate::data::x_formatter::AxisFormatter;
use crate::error::{PlotError, Result};
use crate::events::{EventController, EventFilter, EventKind, LineAction, PlotEvent};

pub struct LineSelectPlot {
    grid: GridPlot,
    segments: HashMap<SegmentId, LinearSegmentGroup>,
    order: Vec<SegmentId>,
    /// Bounds of groups under a live drag, as they were before the drag began.
    drag_origin: HashMap<SegmentId, (f64, f64)>,
    selection_mode: bool,
    proximity: f64,
    click_width: f64,
    events: EventController,
}

impl LineSelectPlot {
    /// `rows` linked rows with date-time x axes and default interaction settings.
    pub fn new(rows: usize) -> Self {
        Self::with_config(&LineSelectConfig {
            rows,
            ..LineSelectConfig::default()
        })
    }

    pub fn with_config(cfg: &LineSelectConfig) -> Self {
        let mut grid = GridPlot::with_layout(cfg.rows, 1, cfg.sharex, cfg.multiy);
        grid.set_all_xaxis_formatters(cfg.x_formatter);
        Self {
            grid,
            segments: HashMap::new(),
            order: Vec::new(),
            drag_origin: HashMap::new(),
            selection_mode: false,
            proximity: cfg.proximity,
            click_width: cfg.click_width,
            events: EventController::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn grid(&self) -> &GridPlot {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridPlot {
        &mut self.grid
    }

    pub fn events(&self) -> &EventController {
        &self.events
    }

    pub fn subscribe(&self, filter: EventFilter) -> std::sync::mpsc::Receiver<PlotEvent> {
        self.events.subscribe(filter)
    }

    pub fn proximity(&self) -> f64 {
        self.proximity
    }

    // ── Selection mode ──────────────────────────────────────────────────────

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Switch between locked and interactive mode; every group follows.
    pub fn set_select_mode(&mut self, enabled: bool) {
        self.selection_mode = enabled;
        for group in self.segments.values_mut() {
            group.set_movable(enabled);
        }
        log::info!(
            "line selection {}",
            if enabled { "active" } else { "locked" }
        );
        let mut evt = PlotEvent::new(EventKind::SELECT_MODE_CHANGED);
        evt.select_mode = Some(enabled);
        self.events.emit(evt);
    }

    // ── Segments ────────────────────────────────────────────────────────────

    /// Create a segment group spanning every row.
    ///
    /// `start` / `stop` may be POSIX seconds or date-times and are sorted, so
    /// `add_segment(300.0, 250.0, ..)` yields `[250, 300]`. A missing `uid` is
    /// generated. With `emit` an `add` notification is published; hosts
    /// loading stored segments pass `false`.
    pub fn add_segment(
        &mut self,
        start: impl Into<SegmentBound>,
        stop: impl Into<SegmentBound>,
        label: &str,
        uid: Option<SegmentId>,
        emit: bool,
    ) -> Result<SegmentId> {
        let (start, stop) = match (start.into().to_timestamp(), stop.into().to_timestamp()) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("segment not added: {e}");
                return Err(e);
            }
        };
        let uid = uid.unwrap_or_else(SegmentId::generate);
        if self.segments.contains_key(&uid) {
            return Err(PlotError::DuplicateSegment(uid));
        }

        let group = LinearSegmentGroup::new(
            uid.clone(),
            start,
            stop,
            label,
            self.selection_mode,
            &mut self.grid,
        )?;
        log::debug!(
            "added segment {uid} [{}, {}] on {} rows",
            group.start(),
            group.stop(),
            group.segments().len()
        );
        if emit {
            self.events
                .emit(PlotEvent::segment(group.to_update(LineAction::Add)));
        }
        self.segments.insert(uid.clone(), group);
        self.order.push(uid.clone());
        Ok(uid)
    }

    /// Delete a group and all of its per-row visuals; publishes `remove`.
    pub fn remove_segment(&mut self, uid: &SegmentId) -> Result<()> {
        let group = self
            .segments
            .remove(uid)
            .ok_or_else(|| PlotError::SegmentNotFound(uid.clone()))?;
        self.order.retain(|id| id != uid);
        self.drag_origin.remove(uid);
        let update = group.to_update(LineAction::Remove);
        group.delete(&mut self.grid);
        log::debug!("removed segment {uid}");
        self.events.emit(PlotEvent::segment(update));
        Ok(())
    }

    pub fn segment(&self, uid: &SegmentId) -> Option<&LinearSegmentGroup> {
        self.segments.get(uid)
    }

    /// Groups in creation order.
    pub fn segments(&self) -> impl Iterator<Item = &LinearSegmentGroup> + '_ {
        self.order.iter().filter_map(|id| self.segments.get(id))
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn group_mut(&mut self, uid: &SegmentId) -> Result<&mut LinearSegmentGroup> {
        self.segments
            .get_mut(uid)
            .ok_or_else(|| PlotError::SegmentNotFound(uid.clone()))
    }

    /// Set the group's label on every row; publishes `modify`.
    pub fn update_label(&mut self, uid: &SegmentId, text: &str) -> Result<()> {
        let group = self.group_mut(uid)?;
        group.set_label(text);
        let update = group.to_update(LineAction::Modify);
        self.events.emit(PlotEvent::segment(update));
        Ok(())
    }

    /// Live drag: place `row`'s handles at `a` / `b` and mirror them on every row.
    ///
    /// Nothing is published until [`finish_drag`](Self::finish_drag). Returns
    /// `false` when the group is locked.
    pub fn drag_segment(&mut self, uid: &SegmentId, row: usize, a: f64, b: f64) -> Result<bool> {
        let group = self
            .segments
            .get_mut(uid)
            .ok_or_else(|| PlotError::SegmentNotFound(uid.clone()))?;
        let before = (group.start(), group.stop());
        let moved = group.region_changed(row, a, b);
        if moved {
            self.drag_origin.entry(uid.clone()).or_insert(before);
        }
        Ok(moved)
    }

    /// Commit a drag; publishes `modify` only when the bounds actually changed.
    pub fn finish_drag(&mut self, uid: &SegmentId) -> Result<()> {
        let origin = self.drag_origin.remove(uid);
        let group = self.group_mut(uid)?;
        if !group.movable() {
            return Ok(());
        }
        match origin {
            Some(bounds) if bounds != (group.start(), group.stop()) => {
                let update = group.to_update(LineAction::Modify);
                self.events.emit(PlotEvent::segment(update));
            }
            _ => log::trace!("drag of {uid} ended without moving"),
        }
        Ok(())
    }

    /// [`drag_segment`](Self::drag_segment) followed by [`finish_drag`](Self::finish_drag).
    pub fn move_segment(&mut self, uid: &SegmentId, row: usize, a: f64, b: f64) -> Result<bool> {
        let moved = self.drag_segment(uid, row, a, b)?;
        if moved {
            self.finish_drag(uid)?;
        }
        Ok(moved)
    }

    /// `true` when no boundary of any segment lies within `proximity * span` of `xpos`.
    ///
    /// A single match anywhere suppresses creation.
    pub fn check_proximity(&self, xpos: f64, span: f64, proximity: f64) -> bool {
        let limit = (proximity * span).abs();
        !self.segments.values().any(|group| {
            group.segments().iter().any(|seg| {
                (xpos - seg.start()).abs() < limit || (xpos - seg.stop()).abs() < limit
            })
        })
    }

    /// What a pointer at `x` on `row` would grab, if anything.
    ///
    /// The nearest boundary within `tolerance` wins; otherwise the most recently
    /// added segment containing `x` is grabbed by its body.
    pub fn boundary_near(&self, row: usize, x: f64, tolerance: f64) -> Option<(SegmentId, DragTarget)> {
        let mut best: Option<(f64, &SegmentId, DragTarget)> = None;
        for group in self.segments() {
            let Some(seg) = group.segment(row) else {
                continue;
            };
            for (pos, target) in [(seg.start(), DragTarget::Start), (seg.stop(), DragTarget::Stop)] {
                let dist = (x - pos).abs();
                if dist <= tolerance && best.map_or(true, |(d, _, _)| dist < d) {
                    best = Some((dist, group.uid(), target));
                }
            }
        }
        if let Some((_, uid, target)) = best {
            return Some((uid.clone(), target));
        }
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.segments.get(id))
            .find(|g| g.segment(row).is_some_and(|s| s.contains(x)))
            .map(|g| (g.uid().clone(), DragTarget::Body))
    }

    /// A primary click at `x` on `row`.
    ///
    /// In interactive mode, and only when the click is clear of every existing
    /// boundary, a segment of `2 * click_width * span` centred on `x` is created.
    pub fn click(&mut self, row: usize, x: f64) -> Result<Option<SegmentId>> {
        if !self.selection_mode {
            return Ok(None);
        }
        let xlim = self
            .grid
            .get_xlim(row)
            .ok_or(PlotError::RowOutOfBounds(row))?;
        let span = xlim[1] - xlim[0];
        if !self.check_proximity(x, span, self.proximity) {
            log::debug!("click at {x} is too close to an existing boundary");
            return Ok(None);
        }
        let half = span * self.click_width;
        self.add_segment(x - half, x + half, "", None, true).map(Some)
    }

    // ── Series delegation ───────────────────────────────────────────────────

    pub fn add_series(
        &mut self,
        series: Series,
        row: usize,
        axis: Axis,
        autorange: bool,
    ) -> Result<CurveId> {
        let before = self.grid.series_keys().len();
        let id = self.grid.add_series(series, row, axis, autorange)?;
        if self.grid.series_keys().len() > before {
            let mut evt = PlotEvent::new(EventKind::SERIES_ADDED);
            evt.series = self.grid.curve_key(id).cloned();
            self.events.emit(evt);
        }
        Ok(id)
    }

    pub fn remove_series(&mut self, name: &str, row: usize, axis: Axis) -> Result<()> {
        self.grid.remove_series(name, row, axis)?;
        let mut evt = PlotEvent::new(EventKind::SERIES_REMOVED);
        evt.series = GridPlot::make_index(name, row, 0, Some(axis.to_string().as_str())).ok();
        self.events.emit(evt);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.events.emit(PlotEvent::new(EventKind::SERIES_CLEARED));
    }

    pub fn find_series(&self, name: &str) -> Vec<SeriesKey> {
        self.grid.find_series(name)
    }

    pub fn get_series(&self, name: &str, row: usize, axis: Axis) -> Option<&Series> {
        self.grid.get_series(name, row, axis)
    }

    pub fn get_plot(&self, row: usize, axis: Axis) -> Option<PlotAxes<'_>> {
        self.grid.get_plot(row, axis)
    }

    pub fn get_xlim(&self, row: usize) -> Option<[f64; 2]> {
        self.grid.get_xlim(row)
    }

    pub fn set_xlim(&mut self, row: usize, range: [f64; 2]) -> Result<()> {
        self.grid.set_xlim(row, range)
    }

    pub fn set_xlink(&mut self, enabled: bool, autorange: bool) {
        self.grid.set_xlink(enabled, autorange);
    }

    pub fn set_xaxis_formatter(&mut self, formatter: AxisFormatter, row: usize) -> Result<()> {
        self.grid.set_xaxis_formatter(formatter, row)
    }
}

impl std::fmt::Debug for LineSelectPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSelectPlot")
            .field("rows", &self.rows())
            .field("segments", &self.order)
            .field("selection_mode", &self.selection_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot_with_view(rows: usize) -> LineSelectPlot {
        let mut plot = LineSelectPlot::new(rows);
        plot.set_xlim(0, [0.0, 1000.0]).unwrap();
        plot
    }

    #[test]
    fn new_groups_follow_selection_mode() {
        let mut plot = plot_with_view(2);
        let locked = plot.add_segment(10.0, 20.0, "", None, false).unwrap();
        plot.set_select_mode(true);
        let live = plot.add_segment(30.0, 40.0, "", None, false).unwrap();
        assert!(plot.segment(&locked).unwrap().movable());
        assert!(plot.segment(&live).unwrap().movable());
        plot.set_select_mode(false);
        assert!(plot.segments().all(|g| !g.movable()));
    }

    #[test]
    fn boundary_near_prefers_closest_handle() {
        let mut plot = plot_with_view(1);
        let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
        assert_eq!(
            plot.boundary_near(0, 103.0, 5.0),
            Some((uid.clone(), DragTarget::Start))
        );
        assert_eq!(
            plot.boundary_near(0, 198.0, 5.0),
            Some((uid.clone(), DragTarget::Stop))
        );
        assert_eq!(plot.boundary_near(0, 150.0, 5.0), Some((uid, DragTarget::Body)));
        assert_eq!(plot.boundary_near(0, 500.0, 5.0), None);
    }

    #[test]
    fn finish_drag_on_locked_group_is_silent() {
        let mut plot = plot_with_view(1);
        let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
        let rx = plot.subscribe(EventFilter::all());
        assert!(!plot.move_segment(&uid, 0, 0.0, 50.0).unwrap());
        plot.finish_drag(&uid).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn release_without_movement_is_silent() {
        let mut plot = plot_with_view(1);
        let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
        plot.set_select_mode(true);
        let rx = plot.subscribe(EventFilter::only(EventKind::SEGMENT_CHANGED));
        plot.finish_drag(&uid).unwrap();
        assert!(plot.drag_segment(&uid, 0, 100.0, 200.0).unwrap());
        plot.finish_drag(&uid).unwrap();
        assert!(rx.try_recv().is_err());

        assert!(plot.drag_segment(&uid, 0, 120.0, 200.0).unwrap());
        plot.finish_drag(&uid).unwrap();
        let evt = rx.try_recv().unwrap();
        let update = evt.segment.unwrap();
        assert_eq!(update.action, LineAction::Modify);
        assert_eq!((update.start, update.stop), (120.0, 200.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn configured_formatter_reaches_every_row() {
        let plot = LineSelectPlot::with_config(&LineSelectConfig {
            rows: 3,
            x_formatter: AxisFormatter::Scalar,
            ..LineSelectConfig::default()
        });
        for row in 0..3 {
            let axes = plot.get_plot(row, Axis::Left).unwrap();
            assert_eq!(axes.x_axis().formatter(), AxisFormatter::Scalar);
        }
    }

    #[test]
    fn unknown_segment_is_an_error() {
        let mut plot = plot_with_view(1);
        let missing = SegmentId::from("nope");
        assert_eq!(
            plot.update_label(&missing, "x"),
            Err(PlotError::SegmentNotFound(missing.clone()))
        );
        assert!(plot.remove_segment(&missing).is_err());
    }
}
