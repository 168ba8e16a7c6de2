//! Composition root: builds backends from configuration and shares one
//! tracker and one resolver across all pages.

use std::sync::Arc;

use beacon_sdk::{
    AnalyticsBackend, BeaconConfig, ConfigResolver, HttpAnalyticsBackend,
    HttpRemoteConfigBackend, RemoteConfigBackend, RemoteConfigSettings, Tracker,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::pages::todos::{BUTTON_COLOR_EXPERIMENT, DEFAULT_BUTTON_COLOR};
use crate::pages::{EventPage, InfiniteListPage, TodoPage};

/// In-app defaults applied before any remote value is activated.
pub fn default_remote_config() -> [(&'static str, &'static str); 1] {
    [(BUTTON_COLOR_EXPERIMENT, DEFAULT_BUTTON_COLOR)]
}

#[derive(Debug, Clone)]
pub struct App {
    tracker: Arc<Tracker>,
    resolver: Arc<ConfigResolver>,
}

impl App {
    pub fn new(tracker: Arc<Tracker>, resolver: Arc<ConfigResolver>) -> Self {
        Self { tracker, resolver }
    }

    /// Wires HTTP backends for whatever the configuration enables. Missing
    /// or unusable settings leave that side of the app degraded, never broken.
    pub fn from_config(config: &BeaconConfig) -> Self {
        let analytics: Option<Arc<dyn AnalyticsBackend>> = match config.analytics() {
            Some(settings) => match HttpAnalyticsBackend::new(&settings) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(e) => {
                    warn!(error = %e, "Analytics backend unavailable");
                    None
                }
            },
            None => {
                info!("Analytics not configured, events will only be logged");
                None
            }
        };

        let remote: Option<Arc<dyn RemoteConfigBackend>> = match config.remote_config() {
            Some(settings) => match HttpRemoteConfigBackend::new(&settings) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(e) => {
                    warn!(error = %e, "Remote config backend unavailable");
                    None
                }
            },
            None => {
                info!("Remote config not configured, using in-app defaults");
                None
            }
        };

        let mut tracker = Tracker::new(analytics, config.environment);
        if let Some(origin) = &config.origin {
            tracker = tracker.with_origin(origin.as_str());
        }

        let resolver = ConfigResolver::new(remote, RemoteConfigSettings::from(config))
            .with_defaults(default_remote_config());

        Self::new(Arc::new(tracker), Arc::new(resolver))
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        &self.resolver
    }

    /// Starts remote config initialization in the background. Pages render
    /// with defaults until the resolver reports ready.
    pub fn spawn_initialize(&self) -> JoinHandle<bool> {
        let resolver = Arc::clone(&self.resolver);
        tokio::spawn(async move { resolver.initialize().await })
    }

    pub fn todo_page(&self) -> TodoPage {
        TodoPage::new(Arc::clone(&self.tracker), Arc::clone(&self.resolver))
    }

    pub fn event_page(&self) -> EventPage {
        EventPage::new(Arc::clone(&self.tracker))
    }

    pub fn infinite_list_page(&self) -> InfiniteListPage {
        InfiniteListPage::new(Arc::clone(&self.tracker))
    }
}
