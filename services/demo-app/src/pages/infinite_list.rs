//! Infinite scroll list: throttled scroll tracking, depth milestones, and
//! intersection-triggered page loads up to a fixed cap.

use std::sync::Arc;

use beacon_sdk::{Throttle, Tracker};
use tokio::time::Instant;
use tracing::debug;

use crate::scroll::{LoadMoreTrigger, ScrollDepthTracker, ScrollMetrics};

pub const INITIAL_ITEMS: usize = 10;
pub const PAGE_SIZE: usize = 10;
pub const MAX_ITEMS: usize = 50;

const COLORS: [&str; 6] = ["blue", "green", "purple", "pink", "yellow", "indigo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub color: &'static str,
}

/// Items `start_id..start_id + count`, ids starting at 1.
fn generate_items(start_id: usize, count: usize) -> impl Iterator<Item = ListItem> {
    (start_id..start_id + count).map(|id| ListItem {
        id,
        title: format!("Item #{}", id),
        description: format!("Generated list entry number {}.", id),
        color: COLORS[id % COLORS.len()],
    })
}

pub struct InfiniteListPage {
    items: Vec<ListItem>,
    loading: bool,
    has_more: bool,
    load_count: u32,
    scroll_percentage: u32,
    throttle: Throttle,
    depth: ScrollDepthTracker,
    trigger: LoadMoreTrigger,
    tracker: Arc<Tracker>,
}

impl InfiniteListPage {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self::with_throttle(tracker, Throttle::default())
    }

    pub fn with_throttle(tracker: Arc<Tracker>, throttle: Throttle) -> Self {
        Self {
            items: generate_items(1, INITIAL_ITEMS).collect(),
            loading: false,
            has_more: true,
            load_count: 0,
            scroll_percentage: 0,
            throttle,
            depth: ScrollDepthTracker::default(),
            trigger: LoadMoreTrigger::default(),
            tracker,
        }
    }

    /// Handles a scroll sample. Returns whether it was processed or dropped
    /// by the throttle.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> bool {
        if !self.throttle.should_run(now) {
            return false;
        }

        self.scroll_percentage = metrics.percentage();
        for milestone in self.depth.observe(metrics.raw_percentage()) {
            self.tracker.track_scroll_depth(milestone, self.items.len());
        }
        true
    }

    /// Handles an intersection report for the load-more sentinel. Returns
    /// true when a load began; the caller finishes it with
    /// [`complete_load`](Self::complete_load).
    pub fn on_intersection(&mut self, intersection_ratio: f64) -> bool {
        if !self
            .trigger
            .should_load(intersection_ratio, self.has_more, self.loading)
        {
            return false;
        }

        self.loading = true;
        self.tracker.track_scroll_load_more(
            self.items.len(),
            self.load_count + 1,
            self.scroll_percentage,
        );
        true
    }

    /// Appends the next page. Returns the number of items added.
    pub fn complete_load(&mut self) -> usize {
        if !self.loading {
            return 0;
        }

        let count = PAGE_SIZE.min(MAX_ITEMS.saturating_sub(self.items.len()));
        let next_id = self.items.len() + 1;
        self.items.extend(generate_items(next_id, count));
        self.load_count += 1;
        self.loading = false;
        debug!(items = self.items.len(), load_count = self.load_count, "Loaded more items");

        if self.items.len() >= MAX_ITEMS {
            self.has_more = false;
            self.tracker.track_reached_list_end(self.items.len());
        }
        count
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn load_count(&self) -> u32 {
        self.load_count
    }

    pub fn scroll_percentage(&self) -> u32 {
        self.scroll_percentage
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use beacon_sdk::events::ParamValue;
    use beacon_sdk::{Environment, RecordingBackend};

    use super::*;

    fn page() -> (InfiniteListPage, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::new());
        let tracker = Arc::new(Tracker::new(Some(backend.clone()), Environment::Development));
        (InfiniteListPage::new(tracker), backend)
    }

    #[test]
    fn test_initial_state() {
        let (page, backend) = page();
        assert_eq!(page.items().len(), INITIAL_ITEMS);
        assert_eq!(page.items()[0].id, 1);
        assert_eq!(page.items()[0].title, "Item #1");
        assert!(page.has_more());
        assert!(!page.is_loading());
        assert_eq!(backend.count(), 0);
    }

    #[test]
    fn test_loads_until_cap_then_reports_end() {
        let (mut page, backend) = page();

        while page.on_intersection(1.0) {
            assert_eq!(page.complete_load(), PAGE_SIZE);
        }

        assert_eq!(page.items().len(), MAX_ITEMS);
        assert_eq!(page.load_count(), 4);
        assert!(!page.has_more());
        assert!(!page.on_intersection(1.0));

        let loads = backend.events_named("scroll_load_more");
        assert_eq!(loads.len(), 4);
        assert_eq!(loads[0].params.get("current_items").and_then(ParamValue::as_i64), Some(10));
        assert_eq!(loads[3].params.get("load_count").and_then(ParamValue::as_i64), Some(4));

        let ends = backend.events_named("reached_list_end");
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].params.get("total_items").and_then(ParamValue::as_i64), Some(50));

        let ids: Vec<usize> = page.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn test_no_second_load_while_loading() {
        let (mut page, backend) = page();
        assert!(page.on_intersection(0.5));
        assert!(!page.on_intersection(1.0));
        assert_eq!(backend.events_named("scroll_load_more").len(), 1);
    }

    #[test]
    fn test_low_ratio_does_not_trigger() {
        let (mut page, _) = page();
        assert!(!page.on_intersection(0.05));
        assert_eq!(page.complete_load(), 0);
    }

    #[test]
    fn test_throttled_scroll_records_milestones() {
        let (mut page, backend) = page();
        let start = Instant::now();

        // Burst of 50 samples over 300 ms, scrolling from top to bottom
        let processed = (0..50u64)
            .filter(|&i| {
                let metrics = ScrollMetrics::new(i as f64 * 25.0, 2025.0, 800.0);
                page.on_scroll(metrics, start + Duration::from_millis(i * 6))
            })
            .count();
        assert_eq!(processed, 2);

        // Sample 34 ran at 204 ms: 850 / 1225 scrolled
        assert_eq!(page.scroll_percentage(), 69);
        let depths: Vec<i64> = backend
            .events_named("scroll_depth")
            .iter()
            .filter_map(|e| e.params.get("depth_percentage").and_then(ParamValue::as_i64))
            .collect();
        assert_eq!(depths, vec![25, 50]);
    }

    #[test]
    fn test_load_more_reports_current_scroll_percentage() {
        let (mut page, backend) = page();
        page.on_scroll(ScrollMetrics::new(1100.0, 2000.0, 800.0), Instant::now());
        page.on_intersection(1.0);

        let load = &backend.events_named("scroll_load_more")[0];
        assert_eq!(load.params.get("scroll_percentage").and_then(ParamValue::as_i64), Some(92));
    }
}
