//! Change notifications emitted by the line-selection plot.
//!
//! Hosts subscribe through [`EventController`] with an [`EventFilter`] and
//! receive [`PlotEvent`]s on an `mpsc` channel. Emission is synchronous: by the
//! time a mutating call on [`LineSelectPlot`](crate::LineSelectPlot) returns,
//! the matching events are already sitting in every subscribed receiver.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::grid::SeriesKey;
use crate::data::segments::SegmentId;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u32);

impl EventKind {
    /// A segment group was created.
    pub const SEGMENT_ADDED: Self = Self(1 << 0);
    /// A segment group's boundaries or label changed.
    pub const SEGMENT_MODIFIED: Self = Self(1 << 1);
    /// A segment group was deleted.
    pub const SEGMENT_REMOVED: Self = Self(1 << 2);
    /// Selection mode was switched on or off.
    pub const SELECT_MODE_CHANGED: Self = Self(1 << 3);
    pub const SERIES_ADDED: Self = Self(1 << 4);
    pub const SERIES_REMOVED: Self = Self(1 << 5);
    pub const SERIES_CLEARED: Self = Self(1 << 6);

    /// Any add/modify/remove of a segment.
    pub const SEGMENT_CHANGED: Self =
        Self(Self::SEGMENT_ADDED.0 | Self::SEGMENT_MODIFIED.0 | Self::SEGMENT_REMOVED.0);

    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }
        let pairs: &[(EventKind, &str)] = &[
            (EventKind::SEGMENT_ADDED, "SEGMENT_ADDED"),
            (EventKind::SEGMENT_MODIFIED, "SEGMENT_MODIFIED"),
            (EventKind::SEGMENT_REMOVED, "SEGMENT_REMOVED"),
            (EventKind::SELECT_MODE_CHANGED, "SELECT_MODE_CHANGED"),
            (EventKind::SERIES_ADDED, "SERIES_ADDED"),
            (EventKind::SERIES_REMOVED, "SERIES_REMOVED"),
            (EventKind::SERIES_CLEARED, "SERIES_CLEARED"),
        ];
        let mut names = Vec::new();
        let mut known = 0u32;
        for (kind, name) in pairs {
            known |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LineUpdate – the segment change payload
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineAction {
    Add,
    Modify,
    Remove,
}

impl LineAction {
    pub fn kind(self) -> EventKind {
        match self {
            LineAction::Add => EventKind::SEGMENT_ADDED,
            LineAction::Modify => EventKind::SEGMENT_MODIFIED,
            LineAction::Remove => EventKind::SEGMENT_REMOVED,
        }
    }
}

impl std::fmt::Display for LineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineAction::Add => write!(f, "add"),
            LineAction::Modify => write!(f, "modify"),
            LineAction::Remove => write!(f, "remove"),
        }
    }
}

/// One committed edit of a flight line. `start` / `stop` are POSIX seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineUpdate {
    pub action: LineAction,
    pub uid: SegmentId,
    pub start: f64,
    pub stop: f64,
    pub label: String,
}

impl LineUpdate {
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.start)
    }

    pub fn stop_datetime(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.stop)
    }
}

/// `None` when `secs` is not finite or outside chrono's representable range.
pub(crate) fn secs_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

// ─────────────────────────────────────────────────────────────────────────────
// PlotEvent
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PlotEvent {
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,
    pub segment: Option<LineUpdate>,
    pub select_mode: Option<bool>,
    pub series: Option<SeriesKey>,
}

impl PlotEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0,
            segment: None,
            select_mode: None,
            series: None,
        }
    }

    pub fn segment(update: LineUpdate) -> Self {
        let mut evt = Self::new(update.action.kind());
        evt.segment = Some(update);
        evt
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask over [`EventKind`]: an event is delivered when its kinds intersect the mask.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &PlotEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<PlotEvent>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

/// Fan-out of plot events to any number of channel subscribers.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventCtrlInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self, filter: EventFilter) -> Receiver<PlotEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<PlotEvent> {
        self.subscribe(EventFilter::all())
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Deliver `event` to every matching subscriber, dropping closed channels.
    pub fn emit(&self, mut event: PlotEvent) {
        let mut inner = self.lock();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventController")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_changed_covers_all_actions() {
        for action in [LineAction::Add, LineAction::Modify, LineAction::Remove] {
            assert!(EventKind::SEGMENT_CHANGED.contains(action.kind()));
        }
        assert!(!EventKind::SEGMENT_CHANGED.intersects(EventKind::SELECT_MODE_CHANGED));
    }

    #[test]
    fn display_joins_known_names() {
        let combo = EventKind::SEGMENT_ADDED | EventKind::SERIES_ADDED;
        assert_eq!(combo.to_string(), "SEGMENT_ADDED|SERIES_ADDED");
        assert_eq!(EventKind::ALL.to_string(), "ALL");
        assert!(EventKind(1 << 31).to_string().starts_with("0x"));
    }

    #[test]
    fn secs_to_datetime_rejects_nan() {
        assert!(secs_to_datetime(f64::NAN).is_none());
        assert_eq!(
            secs_to_datetime(1.5).map(|d| d.timestamp_subsec_millis()),
            Some(500)
        );
    }
}
