//! Remote configuration backend interface and implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RemoteConfigEndpoint;
use crate::error::FetchError;

/// Remote configuration backend interface.
#[async_trait]
pub trait RemoteConfigBackend: Send + Sync {
    /// Fetch the current template.
    async fn fetch(&self) -> Result<RemoteTemplate, FetchError>;
}

/// What the backend says about the template it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateState {
    /// `entries` holds the full new template.
    #[default]
    Update,
    /// Nothing changed since the last fetch; keep what is active.
    NoChange,
    /// No template is published.
    NoTemplate,
    /// A template exists but has no parameters.
    EmptyConfig,
    #[serde(other)]
    Unspecified,
}

/// A fetched configuration template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTemplate {
    #[serde(default)]
    pub entries: HashMap<String, String>,

    #[serde(default)]
    pub state: TemplateState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
}

impl RemoteTemplate {
    pub fn update(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            state: TemplateState::Update,
            template_version: None,
        }
    }

    /// Entries to activate, or `None` when the active set should stay as is.
    pub fn activation(self) -> Option<HashMap<String, String>> {
        match self.state {
            TemplateState::NoChange => None,
            TemplateState::NoTemplate | TemplateState::EmptyConfig => Some(HashMap::new()),
            TemplateState::Update | TemplateState::Unspecified => Some(self.entries),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchRequest<'a> {
    app_instance_id: &'a str,
    app_id: &'a str,
}

/// Remote configuration backend over the REST fetch endpoint.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfigBackend {
    client: reqwest::Client,
    fetch_url: String,
    api_key: String,
    app_id: String,
    app_instance_id: String,
}

impl HttpRemoteConfigBackend {
    pub fn new(settings: &RemoteConfigEndpoint) -> Result<Self, FetchError> {
        // The whole-request deadline is the resolver's fetch_timeout
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            fetch_url: format!(
                "{}/v1/projects/{}/namespaces/firebase:fetch",
                settings.endpoint.trim_end_matches('/'),
                settings.project_id
            ),
            api_key: settings.api_key.clone(),
            app_id: settings.app_id.clone(),
            app_instance_id: uuid::Uuid::new_v4().simple().to_string(),
        })
    }
}

#[async_trait]
impl RemoteConfigBackend for HttpRemoteConfigBackend {
    async fn fetch(&self) -> Result<RemoteTemplate, FetchError> {
        debug!(url = %self.fetch_url, "Fetching remote config");

        let request = FetchRequest {
            app_instance_id: &self.app_instance_id,
            app_id: &self.app_id,
        };
        let response = self
            .client
            .post(&self.fetch_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let template: RemoteTemplate = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        debug!(
            state = ?template.state,
            entry_count = template.entries.len(),
            "Fetched remote config"
        );

        Ok(template)
    }
}

/// Backend serving a fixed template, or a fixed failure.
#[derive(Debug)]
pub struct StaticRemoteConfig {
    result: Result<RemoteTemplate, String>,
    delay: Duration,
    fetch_count: AtomicUsize,
}

impl StaticRemoteConfig {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            result: Ok(RemoteTemplate::update(entries)),
            delay: Duration::ZERO,
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// A backend whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            delay: Duration::ZERO,
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Simulated network latency per fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of fetches that reached this backend.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteConfigBackend for StaticRemoteConfig {
    async fn fetch(&self) -> Result<RemoteTemplate, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.result {
            Ok(template) => Ok(template.clone()),
            Err(message) => Err(FetchError::Status {
                status: 503,
                body: message.clone(),
            }),
        }
    }
}
