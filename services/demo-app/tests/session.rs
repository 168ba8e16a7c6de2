//! End-to-end visits with in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use beacon_demo::pages::todos::BUTTON_COLOR_EXPERIMENT;
use beacon_demo::{run_session, App, SessionPlan};
use beacon_sdk::events::{EventName, ParamValue};
use beacon_sdk::{
    ConfigResolver, Environment, RecordingBackend, RemoteConfigSettings, StaticRemoteConfig,
    Tracker,
};

fn app_with(remote: StaticRemoteConfig) -> (App, Arc<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::new());
    let tracker = Arc::new(Tracker::new(Some(backend.clone()), Environment::Development));
    let resolver = Arc::new(
        ConfigResolver::new(Some(Arc::new(remote)), RemoteConfigSettings::default())
            .with_defaults(beacon_demo::app::default_remote_config()),
    );
    (App::new(tracker, resolver), backend)
}

#[tokio::test(start_paused = true)]
async fn test_full_visit_reports_every_page() {
    let (app, backend) = app_with(
        StaticRemoteConfig::new([(BUTTON_COLOR_EXPERIMENT, "green")])
            .with_delay(Duration::from_millis(300)),
    );

    let summary = run_session(&app, &SessionPlan::default()).await;

    assert!(summary.remote_config_activated);
    assert_eq!(summary.button_color, "green");
    assert_eq!(summary.todos, 4);
    assert_eq!(summary.completed_todos, 1);
    assert_eq!(summary.clicks, 4);
    assert_eq!(summary.seconds_on_event_page, 2);
    assert_eq!(summary.list_items, 50);
    assert_eq!(summary.list_loads, 4);

    let exposures = backend.events_named("ab_test_exposed");
    assert_eq!(exposures.len(), 1);
    assert_eq!(
        exposures[0].params.get("variant").and_then(ParamValue::as_str),
        Some("green")
    );

    let added = backend.events_named("todo_added");
    assert_eq!(added.len(), 1);
    assert!(added[0].params.get("todoId").and_then(ParamValue::as_i64).is_some());
    assert_eq!(
        added[0].params.get("todoText").and_then(ParamValue::as_str),
        Some("Buy milk")
    );

    assert_eq!(backend.events_named("page_view").len(), 1);
    assert_eq!(backend.events_named("button_click").len(), 4);
    assert_eq!(backend.events_named("page_exit").len(), 1);
    assert_eq!(backend.events_named("scroll_load_more").len(), 4);
    assert_eq!(backend.events_named("reached_list_end").len(), 1);

    // Every depth milestone is reported at most once
    let mut depths: Vec<i64> = backend
        .events_named("scroll_depth")
        .iter()
        .filter_map(|e| e.params.get("depth_percentage").and_then(ParamValue::as_i64))
        .collect();
    let reported = depths.len();
    depths.dedup();
    assert_eq!(depths.len(), reported);
    assert!(depths.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(start_paused = true)]
async fn test_visit_survives_remote_config_failure() {
    let (app, backend) = app_with(StaticRemoteConfig::failing("backend down"));

    let summary = run_session(&app, &SessionPlan::default()).await;

    assert!(!summary.remote_config_activated);
    assert_eq!(summary.button_color, "red");
    assert!(app.resolver().is_ready());
    assert_eq!(backend.events_named("ab_test_exposed").len(), 1);
    assert_eq!(backend.events_named("reached_list_end").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_visit_without_analytics_backend() {
    let tracker = Arc::new(Tracker::disabled(Environment::Production));
    let resolver = Arc::new(ConfigResolver::new(None, RemoteConfigSettings::default()));
    let app = App::new(tracker, resolver);

    let summary = run_session(&app, &SessionPlan::default()).await;

    assert_eq!(summary.button_color, "red");
    assert_eq!(summary.list_items, 50);
}

#[tokio::test(start_paused = true)]
async fn test_failed_dispatch_does_not_interrupt_visit() {
    let backend = Arc::new(RecordingBackend::failing("quota exceeded"));
    let tracker = Arc::new(Tracker::new(Some(backend.clone()), Environment::Production));
    let resolver = Arc::new(ConfigResolver::new(None, RemoteConfigSettings::default()));
    let app = App::new(tracker, resolver);

    let summary = run_session(&app, &SessionPlan::default()).await;

    assert_eq!(summary.list_loads, 4);
    assert_eq!(backend.events_named(EventName::ReachedListEnd.as_str()).len(), 1);
}
