//! Event tracker.
//!
//! Every public operation is infallible: a missing backend turns dispatch into
//! a logged no-op, and backend errors are logged and dropped. No retries, no
//! batching, no ordering guarantees between events.

use std::sync::Arc;

use beacon_events::{Event, EventName, EventParams};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::analytics::AnalyticsBackend;
use crate::config::Environment;
use crate::error::DispatchError;

/// Emits analytics events through an injected backend.
#[derive(Clone)]
pub struct Tracker {
    backend: Option<Arc<dyn AnalyticsBackend>>,
    environment: Environment,
    origin: Option<String>,
}

impl Tracker {
    /// Create a tracker. `None` means no backend exists in this environment.
    pub fn new(backend: Option<Arc<dyn AnalyticsBackend>>, environment: Environment) -> Self {
        Self {
            backend,
            environment,
            origin: None,
        }
    }

    /// A tracker with no backend; every call only logs.
    pub fn disabled(environment: Environment) -> Self {
        Self::new(None, environment)
    }

    /// Origin prepended to page paths to form `page_location`.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into().trim_end_matches('/').to_string());
        self
    }

    /// Whether a backend is present and currently accepting events.
    pub fn is_enabled(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_available())
    }

    /// Track an event by name.
    pub fn track(&self, name: impl Into<EventName>, params: Option<EventParams>) {
        self.track_event(Event::new(name, params.unwrap_or_default()));
    }

    /// Track a fully built event.
    pub fn track_event(&self, event: Event) {
        let params = event.params_json().unwrap_or_default();

        let Some(backend) = self.backend.as_ref().filter(|b| b.is_available()) else {
            info!(event = %event.name, params = %params, "Analytics event (not initialized)");
            return;
        };

        for issue in event.validate() {
            warn!(event = %event.name, issue = %issue, "Analytics event exceeds backend limits");
        }

        match dispatch(backend.as_ref(), &event) {
            Ok(()) => {
                if !self.environment.is_production() {
                    info!(event = %event.name, params = %params, "Analytics event");
                }
            }
            Err(e) => {
                error!(event = %event.name, error = %e, "Failed to log analytics event");
            }
        }
    }

    fn page_location(&self, page_path: &str) -> String {
        match &self.origin {
            Some(origin) => format!("{}{}", origin, page_path),
            None => String::new(),
        }
    }

    pub fn track_page_view(&self, page_title: &str, page_path: &str) {
        let location = self.page_location(page_path);
        self.track_event(Event::page_view(page_title, &location, page_path, Utc::now()));
    }

    pub fn track_page_exit(&self, page_title: &str, duration_seconds: u64) {
        self.track_event(Event::page_exit(page_title, duration_seconds, Utc::now()));
    }

    pub fn track_button_click(&self, button_name: &str, extra: Option<EventParams>) {
        self.track_event(Event::button_click(button_name, extra, Utc::now()));
    }

    pub fn track_todo_added(&self, todo_id: i64, todo_text: &str) {
        self.track_event(Event::todo_added(todo_id, todo_text, Utc::now()));
    }

    pub fn track_todo_deleted(&self, todo_id: i64, todo_text: Option<&str>) {
        self.track_event(Event::todo_deleted(todo_id, todo_text, Utc::now()));
    }

    pub fn track_todo_toggled(&self, todo_id: i64, completed: bool) {
        self.track_event(Event::todo_toggled(todo_id, completed, Utc::now()));
    }

    pub fn track_scroll_load_more(&self, current_items: usize, load_count: u32, scroll_percentage: u32) {
        self.track_event(Event::scroll_load_more(
            current_items,
            load_count,
            scroll_percentage,
            Utc::now(),
        ));
    }

    pub fn track_reached_list_end(&self, total_items: usize) {
        self.track_event(Event::reached_list_end(total_items, Utc::now()));
    }

    pub fn track_scroll_depth(&self, depth_percentage: u32, current_items: usize) {
        self.track_event(Event::scroll_depth(depth_percentage, current_items, Utc::now()));
    }

    pub fn track_ab_test_exposed(&self, experiment_name: &str, variant: &str) {
        self.track_event(Event::ab_test_exposed(experiment_name, variant, Utc::now()));
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("enabled", &self.is_enabled())
            .field("environment", &self.environment)
            .field("origin", &self.origin)
            .finish()
    }
}

fn dispatch(backend: &dyn AnalyticsBackend, event: &Event) -> Result<(), DispatchError> {
    backend.log_event(event)
}
