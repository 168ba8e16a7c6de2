//! Tracker dispatch guarantees across the event vocabulary.

use std::sync::Arc;

use beacon_sdk::events::{EventName, EventParams, ParamValue};
use beacon_sdk::{Environment, RecordingBackend, Tracker};
use rstest::rstest;

#[rstest]
#[case(EventName::TodoAdded)]
#[case(EventName::TodoDeleted)]
#[case(EventName::TodoToggled)]
#[case(EventName::PageView)]
#[case(EventName::PageExit)]
#[case(EventName::ButtonClick)]
#[case(EventName::ScrollLoadMore)]
#[case(EventName::ReachedListEnd)]
#[case(EventName::ScrollDepth)]
#[case(EventName::AbTestExposed)]
#[case(EventName::Custom("checkout_started".to_string()))]
fn test_present_backend_gets_exactly_one_dispatch(#[case] name: EventName) {
    let backend = Arc::new(RecordingBackend::new());
    let tracker = Tracker::new(Some(backend.clone()), Environment::Production);
    let params = EventParams::new()
        .with("source", "contract")
        .with("count", 3i64)
        .with("flag", true);

    tracker.track(name.clone(), Some(params));

    let events = backend.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, name);
    assert_eq!(events[0].params.get("source").and_then(ParamValue::as_str), Some("contract"));
    assert_eq!(events[0].params.get("count"), Some(&ParamValue::Int(3)));
    assert_eq!(events[0].params.get("flag"), Some(&ParamValue::Bool(true)));
}

#[rstest]
#[case(Environment::Development)]
#[case(Environment::Production)]
fn test_absent_backend_never_dispatches(#[case] environment: Environment) {
    let tracker = Tracker::disabled(environment);

    for name in EventName::KNOWN {
        tracker.track(name, None);
    }
    tracker.track_todo_deleted(1, None);
    tracker.track_scroll_load_more(10, 1, 90);
    assert!(!tracker.is_enabled());
}

#[test]
fn test_unavailable_backend_never_dispatches() {
    let backend = Arc::new(RecordingBackend::unavailable());
    let tracker = Tracker::new(Some(backend.clone()), Environment::Development);

    for name in EventName::KNOWN {
        tracker.track(name, Some(EventParams::new().with("k", "v")));
    }
    assert_eq!(backend.count(), 0);
}

#[test]
fn test_wrappers_map_to_canonical_names() {
    let backend = Arc::new(RecordingBackend::new());
    let tracker = Tracker::new(Some(backend.clone()), Environment::Development);

    tracker.track_todo_added(1, "a");
    tracker.track_todo_deleted(1, Some("a"));
    tracker.track_todo_toggled(1, true);
    tracker.track_page_view("Event", "/event");
    tracker.track_page_exit("Event", 3);
    tracker.track_button_click("info_action", None);
    tracker.track_scroll_load_more(10, 1, 95);
    tracker.track_reached_list_end(50);
    tracker.track_scroll_depth(25, 10);
    tracker.track_ab_test_exposed("exp", "b");

    let names: Vec<EventName> = backend.events().into_iter().map(|e| e.name).collect();
    assert_eq!(names, EventName::KNOWN.to_vec());
}
