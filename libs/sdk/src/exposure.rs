//! Experiment exposure reporting.
//!
//! The resolver never emits exposure events itself; a page holds one
//! [`ExperimentExposure`] per experiment and calls [`observe`](ExperimentExposure::observe)
//! whenever it renders. The first observation after the resolver is ready
//! records `ab_test_exposed`; later observations are silent.

use tracing::debug;

use crate::resolver::ConfigResolver;
use crate::tracker::Tracker;

/// Per-page-load exposure state for a single experiment.
#[derive(Debug, Clone)]
pub struct ExperimentExposure {
    experiment: String,
    default_variant: String,
    variant: Option<String>,
}

impl ExperimentExposure {
    pub fn new(experiment: impl Into<String>, default_variant: impl Into<String>) -> Self {
        Self {
            experiment: experiment.into(),
            default_variant: default_variant.into(),
            variant: None,
        }
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// The resolved variant, once exposure has been recorded.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// The variant to render right now: resolved if known, else the default.
    pub fn current(&self) -> &str {
        self.variant.as_deref().unwrap_or(&self.default_variant)
    }

    /// Resolves the variant once the resolver is ready and records the exposure.
    ///
    /// Returns `None` while the resolver is still initializing.
    pub fn observe(&mut self, resolver: &ConfigResolver, tracker: &Tracker) -> Option<&str> {
        if self.variant.is_none() {
            if !resolver.is_ready() {
                return None;
            }

            let variant = resolver.get_string(&self.experiment, &self.default_variant);
            debug!(experiment = %self.experiment, variant = %variant, "Experiment exposed");
            tracker.track_ab_test_exposed(&self.experiment, &variant);
            self.variant = Some(variant);
        }

        self.variant.as_deref()
    }
}
