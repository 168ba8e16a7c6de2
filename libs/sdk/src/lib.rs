//! # beacon-sdk
//!
//! Client layer for analytics events and remote configuration.
//!
//! ## Components
//!
//! - [`Tracker`]: emits events through an injected [`AnalyticsBackend`];
//!   never fails, degrades to logging when the backend is absent
//! - [`ConfigResolver`]: fetches and activates remote configuration once per
//!   session through an injected [`RemoteConfigBackend`]; reads never block
//! - [`Readiness`]: one-way ready flag the resolver publishes for dependents
//! - [`ExperimentExposure`]: records `ab_test_exposed` once per page load
//! - [`Throttle`]: rate limit for high-frequency handlers such as scroll
//!
//! Backends are constructed by the application's composition root from
//! [`BeaconConfig`] and passed in, so tests substitute in-memory fakes.

pub mod analytics;
pub mod config;
pub mod error;
pub mod exposure;
pub mod readiness;
pub mod remote_config;
pub mod resolver;
pub mod throttle;
pub mod tracker;

pub use analytics::{AnalyticsBackend, HttpAnalyticsBackend, RecordingBackend};
pub use config::{BeaconConfig, Environment};
pub use error::{ConfigError, DispatchError, FetchError};
pub use exposure::ExperimentExposure;
pub use readiness::{Readiness, ReadinessWatcher};
pub use remote_config::{
    HttpRemoteConfigBackend, RemoteConfigBackend, RemoteTemplate, StaticRemoteConfig,
    TemplateState,
};
pub use resolver::{ConfigResolver, ConfigValue, FetchStatus, RemoteConfigSettings, ValueSource};
pub use throttle::Throttle;
pub use tracker::Tracker;

/// Re-export of the event model.
pub use beacon_events as events;
