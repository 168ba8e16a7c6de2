//! Scripted visit through every page, driven the way a browser would.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::app::App;
use crate::pages::event::BUTTONS;
use crate::scroll::ScrollMetrics;

const ITEM_HEIGHT: f64 = 120.0;
const VIEWPORT_HEIGHT: f64 = 800.0;
const SENTINEL_HEIGHT: f64 = 100.0;
const SCROLL_STEP: f64 = 150.0;

/// Pacing of the scripted visit.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Time spent on the event page before leaving.
    pub dwell: Duration,

    /// Simulated network latency of each list page load.
    pub load_delay: Duration,

    /// Spacing between scroll samples.
    pub scroll_interval: Duration,

    pub new_todo: String,
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self {
            dwell: Duration::from_secs(2),
            load_delay: Duration::from_millis(1000),
            scroll_interval: Duration::from_millis(50),
            new_todo: "Buy milk".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub remote_config_activated: bool,
    pub button_color: String,
    pub todos: usize,
    pub completed_todos: usize,
    pub clicks: u32,
    pub seconds_on_event_page: u64,
    pub list_items: usize,
    pub list_loads: u32,
}

/// Runs one visit: todo page, event page, then the infinite list to its end.
pub async fn run_session(app: &App, plan: &SessionPlan) -> SessionSummary {
    let init = app.spawn_initialize();

    // Todo page renders with defaults, then again once config is active
    let mut todos = app.todo_page();
    let initial_color = todos.render().to_string();
    let remote_config_activated = match init.await {
        Ok(activated) => activated,
        Err(e) => {
            warn!(error = %e, "Remote config initialization task failed");
            false
        }
    };
    let button_color = todos.render().to_string();
    info!(initial_color = %initial_color, button_color = %button_color, "Todo page rendered");

    if let Some(id) = todos.add(&plan.new_todo) {
        todos.toggle(id);
    }
    if let Some(first) = todos.todos().first().map(|todo| todo.id) {
        todos.delete(first);
    }
    let stats = todos.stats();

    let mut event_page = app.event_page();
    event_page.mount(Instant::now());
    for button in BUTTONS {
        event_page.click(button);
    }
    sleep(plan.dwell).await;
    let seconds_on_event_page = event_page.unmount(Instant::now()).unwrap_or_default();

    let mut list = app.infinite_list_page();
    let mut scroll_top = 0.0;
    loop {
        let document_height = list.items().len() as f64 * ITEM_HEIGHT + SENTINEL_HEIGHT;
        let max_top = document_height - VIEWPORT_HEIGHT;
        scroll_top = f64::min(scroll_top + SCROLL_STEP, max_top);

        let metrics = ScrollMetrics::new(scroll_top, document_height, VIEWPORT_HEIGHT);
        list.on_scroll(metrics, Instant::now());

        if list.on_intersection(metrics.sentinel_ratio(SENTINEL_HEIGHT)) {
            sleep(plan.load_delay).await;
            list.complete_load();
        }

        if !list.has_more() && scroll_top >= max_top {
            break;
        }
        sleep(plan.scroll_interval).await;
    }

    SessionSummary {
        remote_config_activated,
        button_color,
        todos: stats.total,
        completed_todos: stats.completed,
        clicks: event_page.clicks(),
        seconds_on_event_page,
        list_items: list.items().len(),
        list_loads: list.load_count(),
    }
}
