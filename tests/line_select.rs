use std::sync::mpsc::Receiver;

use chrono::{TimeZone, Utc};
use flightline_plot::*;

fn drain(rx: &Receiver<PlotEvent>) -> Vec<PlotEvent> {
    rx.try_iter().collect()
}

fn plot_with_span(rows: usize, span: [f64; 2]) -> LineSelectPlot {
    let mut plot = LineSelectPlot::new(rows);
    plot.set_xlim(0, span).unwrap();
    plot
}

#[test]
fn end_to_end_segment_lifecycle() {
    let mut plot = LineSelectPlot::new(2);
    let rx = plot.subscribe(EventFilter::only(EventKind::SEGMENT_CHANGED));

    let a = plot
        .add_segment(100.0, 200.0, "", Some(SegmentId::from("A")), false)
        .unwrap();
    assert_eq!(a.as_str(), "A");
    assert!(drain(&rx).is_empty());
    assert_eq!(plot.segment_count(), 1);
    assert_eq!(plot.segment(&a).unwrap().segments().len(), 2);
    for row in 0..2 {
        let items = plot.get_plot(row, Axis::Left).unwrap().items();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], PlotItem::Region(_)));
    }

    let b = plot.add_segment(300.0, 250.0, "", None, true).unwrap();
    let group = plot.segment(&b).unwrap();
    assert_eq!((group.start(), group.stop()), (250.0, 300.0));
    let events = drain(&rx);
    assert_eq!(events.len(), 1);
    let update = events[0].segment.as_ref().unwrap();
    assert_eq!(update.action, LineAction::Add);
    assert_eq!(update.uid, b);
    assert_eq!((update.start, update.stop), (250.0, 300.0));

    plot.set_select_mode(true);
    assert!(plot.segments().all(|g| g.movable()));
    assert!(plot
        .segments()
        .flat_map(|g| g.segments())
        .all(|s| s.movable()));

    plot.remove_segment(&a).unwrap();
    assert_eq!(plot.segment_count(), 1);
    for row in 0..2 {
        assert_eq!(plot.get_plot(row, Axis::Left).unwrap().items().len(), 1);
    }
    let events = drain(&rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kinds, EventKind::SEGMENT_REMOVED);
    assert_eq!(events[0].segment.as_ref().unwrap().uid, a);
}

#[test]
fn add_then_remove_lone_group_returns_to_zero() {
    let mut plot = LineSelectPlot::new(3);
    let uid = plot.add_segment(1.0, 2.0, "", None, false).unwrap();
    assert_eq!(plot.segment_count(), 1);
    plot.remove_segment(&uid).unwrap();
    assert_eq!(plot.segment_count(), 0);
    for row in 0..3 {
        assert!(plot.get_plot(row, Axis::Left).unwrap().items().is_empty());
    }
}

#[test]
fn drag_syncs_every_row_and_commits_once() {
    let mut plot = LineSelectPlot::new(3);
    plot.set_select_mode(true);
    let uid = plot.add_segment(100.0, 200.0, "L1", None, false).unwrap();
    let rx = plot.subscribe(EventFilter::only(EventKind::SEGMENT_CHANGED));

    // left handle dragged past the right one
    assert!(plot.drag_segment(&uid, 1, 260.0, 200.0).unwrap());
    assert!(plot.drag_segment(&uid, 1, 400.0, 150.0).unwrap());
    assert!(drain(&rx).is_empty());

    let group = plot.segment(&uid).unwrap();
    assert_eq!((group.start(), group.stop()), (150.0, 400.0));
    for seg in group.segments() {
        assert_eq!(seg.region(), (150.0, 400.0));
    }

    plot.finish_drag(&uid).unwrap();
    let events = drain(&rx);
    assert_eq!(events.len(), 1);
    let update = events[0].segment.as_ref().unwrap();
    assert_eq!(update.action, LineAction::Modify);
    assert_eq!((update.start, update.stop), (150.0, 400.0));
    assert_eq!(update.label, "L1");
}

#[test]
fn locked_segments_cannot_be_dragged() {
    let mut plot = LineSelectPlot::new(2);
    let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
    assert!(!plot.segment(&uid).unwrap().movable());
    assert!(!plot.move_segment(&uid, 0, 0.0, 10.0).unwrap());
    let group = plot.segment(&uid).unwrap();
    assert_eq!((group.start(), group.stop()), (100.0, 200.0));
}

#[test]
fn label_update_reaches_every_row() {
    let mut plot = LineSelectPlot::new(2);
    let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
    let rx = plot.subscribe(EventFilter::all());
    plot.update_label(&uid, "Line 7").unwrap();
    let group = plot.segment(&uid).unwrap();
    assert_eq!(group.label(), "Line 7");
    assert!(group.segments().iter().all(|s| s.label_text() == "Line 7"));
    let events = drain(&rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].segment.as_ref().unwrap().action, LineAction::Modify);
}

#[test]
fn proximity_gate_uses_fraction_of_span() {
    let mut plot = LineSelectPlot::new(2);
    plot.add_segment(1000.0, 1100.0, "", None, false).unwrap();
    let span = 1000.0;
    assert!(!plot.check_proximity(1050.0, span, 0.1));
    assert!(!plot.check_proximity(1190.0, span, 0.1));
    assert!(plot.check_proximity(1250.0, span, 0.1));
    // the limit itself is outside the gate
    assert!(plot.check_proximity(900.0, span, 0.1));
    assert!(!plot.check_proximity(1250.0, span, 0.2));
}

#[test]
fn proximity_any_match_suppresses() {
    let mut plot = LineSelectPlot::new(1);
    plot.add_segment(0.0, 10.0, "", None, false).unwrap();
    plot.add_segment(500.0, 600.0, "", None, false).unwrap();
    assert!(!plot.check_proximity(5.0, 1000.0, 0.1));
    assert!(plot.check_proximity(300.0, 1000.0, 0.1));
}

#[test]
fn click_creates_only_in_interactive_mode() {
    let mut plot = plot_with_span(2, [0.0, 1000.0]);
    assert_eq!(plot.click(0, 500.0).unwrap(), None);
    assert_eq!(plot.segment_count(), 0);

    plot.set_select_mode(true);
    let rx = plot.subscribe(EventFilter::only(EventKind::SEGMENT_ADDED));
    let uid = plot.click(1, 500.0).unwrap().unwrap();
    let group = plot.segment(&uid).unwrap();
    assert_eq!((group.start(), group.stop()), (450.0, 550.0));
    assert!(group.movable());
    assert_eq!(drain(&rx).len(), 1);

    // near an existing boundary: treated as a drag, not a new segment
    assert_eq!(plot.click(0, 520.0).unwrap(), None);
    assert!(plot.click(0, 800.0).unwrap().is_some());
    assert_eq!(plot.segment_count(), 2);
}

#[test]
fn click_on_missing_row_is_an_error() {
    let mut plot = LineSelectPlot::new(1);
    plot.set_select_mode(true);
    assert_eq!(plot.click(5, 1.0), Err(PlotError::RowOutOfBounds(5)));
}

#[test]
fn boundary_hit_test() {
    let mut plot = LineSelectPlot::new(2);
    let uid = plot.add_segment(100.0, 200.0, "", None, false).unwrap();
    assert_eq!(
        plot.boundary_near(1, 101.0, 2.0),
        Some((uid.clone(), DragTarget::Start))
    );
    assert_eq!(
        plot.boundary_near(1, 199.0, 2.0),
        Some((uid.clone(), DragTarget::Stop))
    );
    assert_eq!(plot.boundary_near(1, 150.0, 2.0), Some((uid, DragTarget::Body)));
    assert_eq!(plot.boundary_near(1, 10.0, 2.0), None);
    assert_eq!(plot.boundary_near(7, 150.0, 2.0), None);
}

#[test]
fn datetime_bounds_are_converted_to_timestamps() {
    let mut plot = LineSelectPlot::new(1);
    let start = Utc.with_ymd_and_hms(2018, 6, 14, 16, 0, 0).unwrap();
    let stop = Utc.with_ymd_and_hms(2018, 6, 14, 17, 30, 0).unwrap();
    let uid = plot.add_segment(start, stop, "dt", None, false).unwrap();
    let group = plot.segment(&uid).unwrap();
    assert_eq!(group.start(), start.timestamp() as f64);
    assert_eq!(group.stop(), stop.timestamp() as f64);
    let update = group.to_update(LineAction::Add);
    assert_eq!(update.start_datetime(), Some(start));
    assert_eq!(update.stop_datetime(), Some(stop));
}

#[test]
fn zero_width_segment_is_accepted() {
    let mut plot = LineSelectPlot::new(2);
    let uid = plot.add_segment(42.0, 42.0, "marker", None, false).unwrap();
    let group = plot.segment(&uid).unwrap();
    assert_eq!((group.start(), group.stop()), (42.0, 42.0));
}

#[test]
fn invalid_timestamp_aborts_without_event() {
    let mut plot = LineSelectPlot::new(2);
    let rx = plot.subscribe(EventFilter::all());
    let res = plot.add_segment(f64::NAN, 10.0, "", None, true);
    assert!(matches!(res, Err(PlotError::TimestampConversion(_))));
    assert_eq!(plot.segment_count(), 0);
    assert!(plot.get_plot(0, Axis::Left).unwrap().items().is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn duplicate_uid_is_rejected() {
    let mut plot = LineSelectPlot::new(2);
    let uid = SegmentId::from("dup");
    plot.add_segment(1.0, 2.0, "", Some(uid.clone()), false).unwrap();
    let rx = plot.subscribe(EventFilter::all());
    assert_eq!(
        plot.add_segment(3.0, 4.0, "", Some(uid.clone()), true),
        Err(PlotError::DuplicateSegment(uid))
    );
    assert_eq!(plot.segment_count(), 1);
    assert_eq!(plot.get_plot(1, Axis::Left).unwrap().items().len(), 1);
    assert!(drain(&rx).is_empty());
}

#[test]
fn generated_uids_are_unique() {
    let mut plot = LineSelectPlot::new(1);
    let a = plot.add_segment(1.0, 2.0, "", None, false).unwrap();
    let b = plot.add_segment(1.0, 2.0, "", None, false).unwrap();
    assert_ne!(a, b);
}

#[test]
fn mode_toggle_is_published() {
    let mut plot = LineSelectPlot::new(1);
    let rx = plot.subscribe(EventFilter::only(EventKind::SELECT_MODE_CHANGED));
    plot.set_select_mode(true);
    plot.set_select_mode(false);
    let modes: Vec<Option<bool>> = drain(&rx).into_iter().map(|e| e.select_mode).collect();
    assert_eq!(modes, vec![Some(true), Some(false)]);
    assert!(!plot.selection_mode());
}

#[test]
fn series_changes_are_published() {
    let mut plot = LineSelectPlot::new(2);
    let rx = plot.subscribe(EventFilter::only(
        EventKind::SERIES_ADDED | EventKind::SERIES_REMOVED | EventKind::SERIES_CLEARED,
    ));
    plot.add_series(Series::new("Gravity", [1.0, 2.0]), 1, Axis::Left, true)
        .unwrap();
    plot.add_series(Series::new("Gravity", [1.0, 2.0]), 1, Axis::Left, true)
        .unwrap();
    plot.remove_series("gravity", 1, Axis::Left).unwrap();
    plot.clear();

    let events = drain(&rx);
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kinds).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::SERIES_ADDED,
            EventKind::SERIES_REMOVED,
            EventKind::SERIES_CLEARED
        ]
    );
    let key = events[0].series.as_ref().unwrap();
    assert_eq!((key.name.as_str(), key.row), ("gravity", 1));
}

#[test]
fn config_drives_layout_and_gate() {
    let cfg = LineSelectConfig {
        rows: 3,
        multiy: true,
        sharex: false,
        proximity: 0.2,
        ..LineSelectConfig::default()
    };
    let plot = LineSelectPlot::with_config(&cfg);
    assert_eq!(plot.rows(), 3);
    assert!(plot.get_plot(2, Axis::Right).is_some());
    assert!(!plot.grid().is_xlinked());
    assert_eq!(plot.proximity(), 0.2);
    assert!(plot
        .get_plot(0, Axis::Left)
        .unwrap()
        .x_axis()
        .is_time_axis());
}
