//! Event tracking page: page view on mount, click counting, dwell time on exit.

use std::sync::Arc;
use std::time::Duration;

use beacon_sdk::events::{param_keys, EventParams};
use beacon_sdk::Tracker;
use tokio::time::Instant;

pub const PAGE_TITLE: &str = "Event Tracking";
pub const PAGE_PATH: &str = "/event";

/// Buttons rendered on the page.
pub const BUTTONS: [&str; 4] = [
    "primary_action",
    "secondary_action",
    "info_action",
    "share_action",
];

pub struct EventPage {
    tracker: Arc<Tracker>,
    entered_at: Option<Instant>,
    clicks: u32,
}

impl EventPage {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self {
            tracker,
            entered_at: None,
            clicks: 0,
        }
    }

    /// Starts the dwell timer and records the page view.
    pub fn mount(&mut self, now: Instant) {
        self.entered_at = Some(now);
        self.clicks = 0;
        self.tracker.track_page_view(PAGE_TITLE, PAGE_PATH);
    }

    /// Records a click on `button_name`, returning the running total.
    pub fn click(&mut self, button_name: &str) -> u32 {
        self.clicks += 1;
        let params = EventParams::new()
            .with(param_keys::PAGE, PAGE_PATH)
            .with(param_keys::TOTAL_CLICKS, self.clicks);
        self.tracker.track_button_click(button_name, Some(params));
        self.clicks
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn time_on_page(&self, now: Instant) -> Duration {
        self.entered_at
            .map(|entered| now.saturating_duration_since(entered))
            .unwrap_or_default()
    }

    /// Records `page_exit` with whole seconds on the page.
    ///
    /// Returns `None` when the page was never mounted.
    pub fn unmount(&mut self, now: Instant) -> Option<u64> {
        self.entered_at?;
        let seconds = self.time_on_page(now).as_secs();
        self.entered_at = None;
        self.tracker.track_page_exit(PAGE_TITLE, seconds);
        Some(seconds)
    }
}
