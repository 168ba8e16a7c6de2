//! Scroll geometry, depth milestones, and the lazy-load trigger.

use std::collections::BTreeSet;

/// Scroll depth milestones reported as `scroll_depth` events.
pub const SCROLL_MILESTONES: [u32; 4] = [25, 50, 75, 100];

/// Intersection ratio at which the load-more sentinel counts as visible.
pub const LOAD_MORE_THRESHOLD: f64 = 0.1;

/// A snapshot of the viewport against the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Percentage scrolled, clamped to 0..=100. A document that fits the
    /// viewport has nothing to scroll and reports 0.
    pub fn raw_percentage(&self) -> f64 {
        let scrollable = self.document_height - self.viewport_height;
        if scrollable <= 0.0 {
            return 0.0;
        }
        (self.scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
    }

    /// Percentage rounded to a whole number, as displayed and reported.
    pub fn percentage(&self) -> u32 {
        self.raw_percentage().round() as u32
    }

    /// Visible fraction of a sentinel of `sentinel_height` at the document end.
    pub fn sentinel_ratio(&self, sentinel_height: f64) -> f64 {
        if sentinel_height <= 0.0 {
            return 0.0;
        }
        let viewport_bottom = self.scroll_top + self.viewport_height;
        let sentinel_top = self.document_height - sentinel_height;
        ((viewport_bottom - sentinel_top) / sentinel_height).clamp(0.0, 1.0)
    }
}

/// Reports each milestone once, on the first sample at or past it.
#[derive(Debug, Clone)]
pub struct ScrollDepthTracker {
    milestones: Vec<u32>,
    reached: BTreeSet<u32>,
}

impl ScrollDepthTracker {
    pub fn new(milestones: impl IntoIterator<Item = u32>) -> Self {
        let mut milestones: Vec<u32> = milestones.into_iter().collect();
        milestones.sort_unstable();
        milestones.dedup();
        Self {
            milestones,
            reached: BTreeSet::new(),
        }
    }

    /// Milestones newly crossed by this sample, ascending.
    pub fn observe(&mut self, percentage: f64) -> Vec<u32> {
        let crossed: Vec<u32> = self
            .milestones
            .iter()
            .copied()
            .filter(|&m| percentage >= f64::from(m) && !self.reached.contains(&m))
            .collect();
        self.reached.extend(crossed.iter().copied());
        crossed
    }

    pub fn reached(&self) -> impl Iterator<Item = u32> + '_ {
        self.reached.iter().copied()
    }
}

impl Default for ScrollDepthTracker {
    fn default() -> Self {
        Self::new(SCROLL_MILESTONES)
    }
}

/// Intersection-based lazy-load trigger.
#[derive(Debug, Clone, Copy)]
pub struct LoadMoreTrigger {
    threshold: f64,
}

impl LoadMoreTrigger {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Whether an intersection report should start a load.
    pub fn should_load(&self, intersection_ratio: f64, has_more: bool, loading: bool) -> bool {
        intersection_ratio > 0.0 && intersection_ratio >= self.threshold && has_more && !loading
    }
}

impl Default for LoadMoreTrigger {
    fn default() -> Self {
        Self::new(LOAD_MORE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 2000.0, 800.0, 0)]
    #[case(600.0, 2000.0, 800.0, 50)]
    #[case(1200.0, 2000.0, 800.0, 100)]
    #[case(1500.0, 2000.0, 800.0, 100)]
    #[case(0.0, 600.0, 800.0, 0)]
    #[case(299.0, 2000.0, 800.0, 25)]
    fn test_percentage(
        #[case] top: f64,
        #[case] document: f64,
        #[case] viewport: f64,
        #[case] expected: u32,
    ) {
        assert_eq!(ScrollMetrics::new(top, document, viewport).percentage(), expected);
    }

    #[test]
    fn test_milestones_reported_once() {
        let mut depth = ScrollDepthTracker::default();

        assert!(depth.observe(10.0).is_empty());
        assert_eq!(depth.observe(26.0), vec![25]);
        assert!(depth.observe(27.0).is_empty());
        assert!(depth.observe(20.0).is_empty());
        assert_eq!(depth.observe(51.5), vec![50]);
    }

    #[test]
    fn test_fast_scroll_crosses_several_milestones() {
        let mut depth = ScrollDepthTracker::default();

        // A single sample jumping from the top straight past 75%
        assert_eq!(depth.observe(80.0), vec![25, 50, 75]);
        assert_eq!(depth.observe(100.0), vec![100]);
        assert_eq!(depth.reached().collect::<Vec<_>>(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_sentinel_ratio() {
        let metrics = ScrollMetrics::new(1150.0, 2000.0, 800.0);
        assert!((metrics.sentinel_ratio(100.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(ScrollMetrics::new(0.0, 2000.0, 800.0).sentinel_ratio(100.0), 0.0);
    }

    #[rstest]
    #[case(1.0, true, false, true)]
    #[case(0.1, true, false, true)]
    #[case(0.05, true, false, false)]
    #[case(1.0, false, false, false)]
    #[case(1.0, true, true, false)]
    #[case(0.0, true, false, false)]
    fn test_load_more_trigger(
        #[case] ratio: f64,
        #[case] has_more: bool,
        #[case] loading: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(LoadMoreTrigger::default().should_load(ratio, has_more, loading), expected);
    }
}
