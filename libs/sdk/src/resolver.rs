//! Remote configuration resolver.
//!
//! Holds the activated remote values for the session and answers synchronous
//! reads with default fallback. Availability follows a one-way state machine:
//!
//! ```text
//! UNINITIALIZED --initialize (success | failure)--> READY
//! ```
//!
//! A failed initialization still ends in READY so dependents are never stuck;
//! reads then resolve to in-app or caller defaults.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{BeaconConfig, DEFAULT_MIN_FETCH_INTERVAL};
use crate::error::FetchError;
use crate::readiness::{Readiness, ReadinessWatcher};
use crate::remote_config::RemoteConfigBackend;

/// Resolver settings.
#[derive(Debug, Clone)]
pub struct RemoteConfigSettings {
    /// Fetches closer together than this reuse the last result.
    pub minimum_fetch_interval: Duration,

    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
}

impl Default for RemoteConfigSettings {
    fn default() -> Self {
        Self {
            minimum_fetch_interval: DEFAULT_MIN_FETCH_INTERVAL,
            fetch_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&BeaconConfig> for RemoteConfigSettings {
    fn from(config: &BeaconConfig) -> Self {
        Self {
            minimum_fetch_interval: config.minimum_fetch_interval,
            ..Self::default()
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// In-app default.
    Default,
    /// Activated remote template.
    Remote,
    /// Neither; the value is the empty string.
    Static,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::Remote => write!(f, "remote"),
            ValueSource::Static => write!(f, "static"),
        }
    }
}

/// A resolved configuration value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: String,
    pub source: ValueSource,
}

impl ConfigValue {
    /// Boolean reading of the value, if it is a recognized truthy/falsy string.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }
}

/// Outcome of the most recent fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    NoFetchYet,
    Success,
    Failure,
    Throttle,
}

#[derive(Debug)]
struct FetchState {
    status: FetchStatus,
    last_success: Option<Instant>,
}

/// Session-scoped remote configuration cache.
pub struct ConfigResolver {
    backend: Option<Arc<dyn RemoteConfigBackend>>,
    settings: RemoteConfigSettings,
    defaults: HashMap<String, String>,
    active: RwLock<HashMap<String, String>>,
    fetch_state: Mutex<FetchState>,
    fetch_lock: tokio::sync::Mutex<()>,
    readiness: Readiness,
}

impl ConfigResolver {
    /// Create a resolver. `None` means no backend exists in this environment.
    pub fn new(backend: Option<Arc<dyn RemoteConfigBackend>>, settings: RemoteConfigSettings) -> Self {
        Self {
            backend,
            settings,
            defaults: HashMap::new(),
            active: RwLock::new(HashMap::new()),
            fetch_state: Mutex::new(FetchState {
                status: FetchStatus::NoFetchYet,
                last_success: None,
            }),
            fetch_lock: tokio::sync::Mutex::new(()),
            readiness: Readiness::new(),
        }
    }

    /// In-app defaults served when a key has no remote value.
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn settings(&self) -> &RemoteConfigSettings {
        &self.settings
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Fetch and activate once, then mark the resolver ready.
    ///
    /// Returns true when activation succeeded. Failure is not fatal: the
    /// resolver still becomes ready and serves defaults.
    pub async fn initialize(&self) -> bool {
        info!("Initializing remote config");

        let activated = match self.fetch_and_activate().await {
            Ok(changed) => {
                info!(changed, "Remote config initialized");
                true
            }
            Err(FetchError::Unavailable) => {
                warn!("Remote config backend not configured, serving defaults");
                false
            }
            Err(e) => {
                error!(error = %e, "Remote config initialization failed, serving defaults");
                false
            }
        };

        if self.readiness.mark_ready() {
            debug!(activated, "Remote config ready");
        }

        activated
    }

    /// Fetch the template and activate it.
    ///
    /// Returns whether the active values changed. Within the minimum fetch
    /// interval of the last successful fetch no request is made.
    pub async fn fetch_and_activate(&self) -> Result<bool, FetchError> {
        let backend = self.backend.as_ref().ok_or(FetchError::Unavailable)?;
        let _guard = self.fetch_lock.lock().await;

        let last_success = self.state().last_success;
        if let Some(last) = last_success {
            if last.elapsed() < self.settings.minimum_fetch_interval {
                self.state().status = FetchStatus::Throttle;
                debug!(
                    min_interval_ms = self.settings.minimum_fetch_interval.as_millis() as u64,
                    "Remote config fetch throttled, keeping active values"
                );
                return Ok(false);
            }
        }

        let timeout = self.settings.fetch_timeout;
        let fetched = match tokio::time::timeout(timeout, backend.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        match fetched {
            Ok(template) => {
                let changed = match template.activation() {
                    Some(entries) => self.activate(entries),
                    None => false,
                };
                let mut state = self.state();
                state.status = FetchStatus::Success;
                state.last_success = Some(Instant::now());
                Ok(changed)
            }
            Err(e) => {
                self.state().status = FetchStatus::Failure;
                Err(e)
            }
        }
    }

    fn activate(&self, entries: HashMap<String, String>) -> bool {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if *active == entries {
            return false;
        }
        debug!(entry_count = entries.len(), "Activating remote config");
        *active = entries;
        true
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FetchState> {
        self.fetch_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_fetch_status(&self) -> FetchStatus {
        self.state().status
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Subscribe to the UNINITIALIZED -> READY transition.
    pub fn readiness(&self) -> ReadinessWatcher {
        self.readiness.subscribe()
    }

    /// Resolve a key with provenance, regardless of readiness.
    pub fn get_value(&self, key: &str) -> ConfigValue {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);

        let (value, source) = match (active.get(key), self.defaults.get(key)) {
            (Some(remote), _) => (remote.clone(), ValueSource::Remote),
            (None, Some(default)) => (default.clone(), ValueSource::Default),
            (None, None) => (String::new(), ValueSource::Static),
        };

        ConfigValue {
            key: key.to_string(),
            value,
            source,
        }
    }

    /// Read a string value.
    ///
    /// Returns `default` before the resolver is ready, when the key is unknown,
    /// or when the resolved value is empty.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        if !self.is_ready() {
            debug!(key, default, "Remote config not ready, using default");
            return default.to_string();
        }

        let resolved = self.get_value(key);
        debug!(
            key,
            value = %resolved.value,
            source = %resolved.source,
            default,
            "Remote config value"
        );

        if resolved.value.is_empty() {
            default.to_string()
        } else {
            resolved.value
        }
    }

    /// Read a boolean value, falling back to `default` under the same rules as
    /// [`get_string`](Self::get_string) or when the value is not boolean-like.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.resolved(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Read a numeric value with the same fallback rules.
    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        self.resolved(key)
            .and_then(|v| v.as_number())
            .unwrap_or(default)
    }

    fn resolved(&self, key: &str) -> Option<ConfigValue> {
        if !self.is_ready() {
            return None;
        }
        Some(self.get_value(key)).filter(|v| v.source != ValueSource::Static)
    }

    /// Every key known from defaults or the active template, sorted.
    pub fn all(&self) -> Vec<ConfigValue> {
        let keys: BTreeSet<String> = {
            let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
            active.keys().chain(self.defaults.keys()).cloned().collect()
        };
        keys.iter().map(|key| self.get_value(key)).collect()
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("has_backend", &self.has_backend())
            .field("ready", &self.is_ready())
            .field("last_fetch_status", &self.last_fetch_status())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::remote_config::StaticRemoteConfig;

    fn resolver_with(backend: StaticRemoteConfig) -> (ConfigResolver, Arc<StaticRemoteConfig>) {
        let backend = Arc::new(backend);
        let resolver = ConfigResolver::new(Some(backend.clone()), RemoteConfigSettings::default());
        (resolver, backend)
    }

    #[test]
    fn test_settings_follow_config() {
        let config = BeaconConfig {
            minimum_fetch_interval: Duration::from_millis(500),
            ..BeaconConfig::default()
        };
        let resolver = ConfigResolver::new(None, RemoteConfigSettings::from(&config));

        assert_eq!(resolver.settings().minimum_fetch_interval, Duration::from_millis(500));
        assert_eq!(resolver.settings().fetch_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_reads_before_initialize_return_default() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::new([("k", "remote")]));

        assert!(!resolver.is_ready());
        assert_eq!(resolver.get_string("k", "d"), "d");
        assert!(resolver.get_bool("k", true));
        assert_eq!(resolver.get_number("k", 4.0), 4.0);
    }

    #[tokio::test]
    async fn test_initialize_activates_remote_values() {
        let (resolver, _) =
            resolver_with(StaticRemoteConfig::new([("todo_add_button_color", "blue")]));

        assert!(resolver.initialize().await);
        assert!(resolver.is_ready());
        assert_eq!(resolver.get_string("todo_add_button_color", "red"), "blue");
        assert_eq!(resolver.get_value("todo_add_button_color").source, ValueSource::Remote);
        assert_eq!(resolver.last_fetch_status(), FetchStatus::Success);
    }

    #[tokio::test]
    async fn test_failed_initialize_serves_defaults() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::failing("boom"));

        assert!(!resolver.initialize().await);
        assert!(resolver.is_ready());
        assert_eq!(resolver.get_string("any_key", "fallback"), "fallback");
        assert_eq!(resolver.last_fetch_status(), FetchStatus::Failure);
    }

    #[tokio::test]
    async fn test_missing_backend_becomes_ready_with_defaults() {
        let resolver = ConfigResolver::new(None, RemoteConfigSettings::default())
            .with_defaults([("welcome_text", "hello")]);

        assert!(!resolver.initialize().await);
        assert!(resolver.is_ready());
        assert_eq!(resolver.get_string("welcome_text", "x"), "hello");
        assert_eq!(resolver.get_value("welcome_text").source, ValueSource::Default);
        assert_eq!(resolver.last_fetch_status(), FetchStatus::NoFetchYet);
    }

    #[tokio::test]
    async fn test_remote_overrides_in_app_default() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::new([("color", "green")]));
        let resolver = resolver.with_defaults([("color", "red"), ("size", "m")]);
        resolver.initialize().await;

        let all = resolver.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, "color");
        assert_eq!(all[0].source, ValueSource::Remote);
        assert_eq!(all[1].source, ValueSource::Default);
    }

    #[tokio::test]
    async fn test_empty_remote_value_falls_back_to_caller_default() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::new([("banner", "")]));
        resolver.initialize().await;

        assert_eq!(resolver.get_value("banner").source, ValueSource::Remote);
        assert_eq!(resolver.get_string("banner", "none"), "none");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_within_minimum_interval_are_throttled() {
        let (resolver, backend) = resolver_with(StaticRemoteConfig::new([("k", "v")]));

        assert!(resolver.initialize().await);
        assert!(!resolver.fetch_and_activate().await.unwrap());
        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(resolver.last_fetch_status(), FetchStatus::Throttle);

        tokio::time::advance(Duration::from_millis(2001)).await;
        resolver.fetch_and_activate().await.unwrap();
        assert_eq!(backend.fetch_count(), 2);
        assert_eq!(resolver.last_fetch_status(), FetchStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out() {
        let backend = Arc::new(StaticRemoteConfig::new([("k", "v")]).with_delay(Duration::from_secs(5)));
        let resolver = ConfigResolver::new(
            Some(backend),
            RemoteConfigSettings {
                fetch_timeout: Duration::from_secs(1),
                ..RemoteConfigSettings::default()
            },
        );

        assert!(matches!(
            resolver.fetch_and_activate().await,
            Err(FetchError::Timeout(_))
        ));
        assert!(!resolver.initialize().await);
        assert_eq!(resolver.get_string("k", "d"), "d");
    }

    #[tokio::test]
    async fn test_concurrent_initialize_keeps_cache_consistent() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::new([("a", "1"), ("b", "2")]));
        let resolver = Arc::new(resolver);

        let (first, second) = tokio::join!(resolver.initialize(), resolver.initialize());
        assert!(first && second);
        assert_eq!(resolver.get_string("a", ""), "1");
        assert_eq!(resolver.get_string("b", ""), "2");
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("ON", Some(true))]
    #[case("1", Some(true))]
    #[case("no", Some(false))]
    #[case("0", Some(false))]
    #[case("maybe", None)]
    fn test_bool_parsing(#[case] raw: &str, #[case] expected: Option<bool>) {
        let value = ConfigValue {
            key: "flag".to_string(),
            value: raw.to_string(),
            source: ValueSource::Remote,
        };
        assert_eq!(value.as_bool(), expected);
    }

    #[tokio::test]
    async fn test_typed_reads_after_ready() {
        let (resolver, _) = resolver_with(StaticRemoteConfig::new([
            ("show_banner", "yes"),
            ("page_size", "20"),
            ("broken", "n/a"),
        ]));
        resolver.initialize().await;

        assert!(resolver.get_bool("show_banner", false));
        assert_eq!(resolver.get_number("page_size", 10.0), 20.0);
        assert_eq!(resolver.get_number("broken", 10.0), 10.0);
        assert!(!resolver.get_bool("missing", false));
    }
}
