//! Environment configuration.
//!
//! Every variable is optional. A missing identifier never fails startup; it
//! only leaves the corresponding backend unavailable.

use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_ANALYTICS_ENDPOINT: &str = "https://www.google-analytics.com";
pub const DEFAULT_REMOTE_CONFIG_ENDPOINT: &str = "https://firebaseremoteconfig.googleapis.com";
pub const DEFAULT_MIN_FETCH_INTERVAL: Duration = Duration::from_millis(2000);

/// Build flavor; controls console echo of tracked events and log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                var: "BEACON_ENV",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Analytics backend settings, present only when fully configured.
#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    pub endpoint: String,
    pub measurement_id: String,
    pub api_secret: String,
}

/// Remote configuration backend settings, present only when fully configured.
#[derive(Debug, Clone)]
pub struct RemoteConfigEndpoint {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub app_id: String,
}

/// Client configuration loaded from the environment.
#[derive(Clone)]
pub struct BeaconConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
    pub api_secret: Option<String>,

    /// Analytics collection base URL.
    pub analytics_endpoint: String,

    /// Remote configuration base URL.
    pub remote_config_endpoint: String,

    /// Origin used to build `page_location` (e.g. `https://demo.example.com`).
    pub origin: Option<String>,

    pub environment: Environment,

    /// Session-level throttle on remote config re-fetches.
    pub minimum_fetch_interval: Duration,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl BeaconConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Only the fetch interval is fatal; an unknown flavor runs as development
        let environment = match var("BEACON_ENV") {
            Some(v) => v.trim().parse().unwrap_or_else(|e: ConfigError| {
                warn!(error = %e, "Unrecognized environment, using development");
                Environment::default()
            }),
            None => Environment::default(),
        };

        let minimum_fetch_interval = match var("BEACON_MIN_FETCH_INTERVAL_MS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue {
                    var: "BEACON_MIN_FETCH_INTERVAL_MS",
                    value: v.clone(),
                })?,
            None => DEFAULT_MIN_FETCH_INTERVAL,
        };

        Ok(Self {
            api_key: var("BEACON_API_KEY"),
            auth_domain: var("BEACON_AUTH_DOMAIN"),
            project_id: var("BEACON_PROJECT_ID"),
            storage_bucket: var("BEACON_STORAGE_BUCKET"),
            messaging_sender_id: var("BEACON_MESSAGING_SENDER_ID"),
            app_id: var("BEACON_APP_ID"),
            measurement_id: var("BEACON_MEASUREMENT_ID"),
            api_secret: var("BEACON_API_SECRET"),
            analytics_endpoint: var("BEACON_ANALYTICS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ANALYTICS_ENDPOINT.to_string()),
            remote_config_endpoint: var("BEACON_REMOTE_CONFIG_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_REMOTE_CONFIG_ENDPOINT.to_string()),
            origin: var("BEACON_ORIGIN"),
            environment,
            minimum_fetch_interval,
            log_level: var("BEACON_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Analytics settings if measurement id and api secret are both set.
    pub fn analytics(&self) -> Option<AnalyticsSettings> {
        Some(AnalyticsSettings {
            endpoint: self.analytics_endpoint.clone(),
            measurement_id: self.measurement_id.clone()?,
            api_secret: self.api_secret.clone()?,
        })
    }

    /// Remote config settings if api key, project id and app id are all set.
    pub fn remote_config(&self) -> Option<RemoteConfigEndpoint> {
        Some(RemoteConfigEndpoint {
            endpoint: self.remote_config_endpoint.clone(),
            api_key: self.api_key.clone()?,
            project_id: self.project_id.clone()?,
            app_id: self.app_id.clone()?,
        })
    }
}

/// Same as loading from an empty environment.
impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_domain: None,
            project_id: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
            api_secret: None,
            analytics_endpoint: DEFAULT_ANALYTICS_ENDPOINT.to_string(),
            remote_config_endpoint: DEFAULT_REMOTE_CONFIG_ENDPOINT.to_string(),
            origin: None,
            environment: Environment::default(),
            minimum_fetch_interval: DEFAULT_MIN_FETCH_INTERVAL,
            log_level: "info".to_string(),
        }
    }
}

impl std::fmt::Debug for BeaconConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("BeaconConfig")
            .field("api_key", &redact(&self.api_key))
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("measurement_id", &self.measurement_id)
            .field("api_secret", &redact(&self.api_secret))
            .field("analytics_endpoint", &self.analytics_endpoint)
            .field("remote_config_endpoint", &self.remote_config_endpoint)
            .field("origin", &self.origin)
            .field("environment", &self.environment)
            .field("minimum_fetch_interval", &self.minimum_fetch_interval)
            .field("log_level", &self.log_level)
            .finish()
    }
}
