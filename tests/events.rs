use flightline_plot::*;

#[test]
fn filter_only_delivers_matching_kinds() {
    let ctrl = EventController::new();
    let seg_rx = ctrl.subscribe(EventFilter::only(EventKind::SEGMENT_CHANGED));
    let all_rx = ctrl.subscribe_all();

    ctrl.emit(PlotEvent::new(EventKind::SERIES_ADDED));
    ctrl.emit(PlotEvent::segment(LineUpdate {
        action: LineAction::Remove,
        uid: SegmentId::from("a"),
        start: 0.0,
        stop: 1.0,
        label: String::new(),
    }));

    let seg: Vec<EventKind> = seg_rx.try_iter().map(|e| e.kinds).collect();
    assert_eq!(seg, vec![EventKind::SEGMENT_REMOVED]);
    assert_eq!(all_rx.try_iter().count(), 2);
}

#[test]
fn dropped_receivers_are_pruned() {
    let ctrl = EventController::new();
    let rx = ctrl.subscribe_all();
    {
        let _gone = ctrl.subscribe_all();
    }
    assert_eq!(ctrl.subscriber_count(), 2);
    ctrl.emit(PlotEvent::new(EventKind::SERIES_CLEARED));
    assert_eq!(ctrl.subscriber_count(), 1);
    assert!(rx.try_recv().is_ok());
}

#[test]
fn cloned_controllers_share_subscribers() {
    let ctrl = EventController::new();
    let rx = ctrl.subscribe_all();
    let other = ctrl.clone();
    other.emit(PlotEvent::new(EventKind::SELECT_MODE_CHANGED));
    let evt = rx.try_recv().unwrap();
    assert!(evt.kinds.contains(EventKind::SELECT_MODE_CHANGED));
    assert!(evt.timestamp >= 0.0);
}

#[test]
fn line_action_names() {
    assert_eq!(LineAction::Add.to_string(), "add");
    assert_eq!(LineAction::Modify.to_string(), "modify");
    assert_eq!(LineAction::Remove.to_string(), "remove");
}

#[test]
fn events_are_synchronous_with_plot_mutations() {
    let mut plot = LineSelectPlot::new(1);
    let rx = plot.subscribe(EventFilter::all());
    let uid = plot.add_segment(1.0, 2.0, "", None, true).unwrap();
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.segment.unwrap().uid, uid);
}
