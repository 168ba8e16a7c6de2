//! Leading-edge rate limiting for high-frequency handlers.

use std::time::Duration;

use tokio::time::Instant;

/// Default spacing between scroll handler runs.
pub const DEFAULT_SCROLL_THROTTLE: Duration = Duration::from_millis(200);

/// Lets a handler run at most once per `interval`.
///
/// The first call always runs; later calls run only once `interval` has
/// passed since the last run. Skipped calls are dropped, not deferred.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true if the handler should run at `now`, recording the run.
    pub fn should_run(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_run = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_run = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THROTTLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_within_window_runs_at_most_twice() {
        let start = Instant::now();
        let mut throttle = Throttle::default();

        // 50 samples spread over 300 ms
        let runs = (0..50)
            .map(|i| start + Duration::from_millis(i * 6))
            .filter(|&now| throttle.should_run(now))
            .count();

        assert!(runs <= 2, "ran {} times", runs);
        assert_eq!(runs, 2);
    }

    #[test]
    fn test_first_call_always_runs() {
        let mut throttle = Throttle::new(Duration::from_secs(10));
        assert_eq!(throttle.interval(), Duration::from_secs(10));
        assert_eq!(Throttle::default().interval(), DEFAULT_SCROLL_THROTTLE);
        assert!(throttle.should_run(Instant::now()));
    }

    #[test]
    fn test_runs_again_after_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(200));

        assert!(throttle.should_run(start));
        assert!(!throttle.should_run(start + Duration::from_millis(199)));
        assert!(throttle.should_run(start + Duration::from_millis(200)));
        assert!(!throttle.should_run(start + Duration::from_millis(250)));
    }

    #[test]
    fn test_reset_allows_immediate_run() {
        let start = Instant::now();
        let mut throttle = Throttle::default();

        assert!(throttle.should_run(start));
        throttle.reset();
        assert!(throttle.should_run(start + Duration::from_millis(1)));
    }
}
