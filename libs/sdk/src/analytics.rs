//! Analytics backend interface and implementations.
//!
//! Dispatch is synchronous from the caller's point of view: `log_event` hands
//! the event off and returns. The HTTP backend performs the network write on a
//! background task, mirroring how browser analytics SDKs queue events.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use beacon_events::Event;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::AnalyticsSettings;
use crate::error::DispatchError;

/// Analytics backend interface.
pub trait AnalyticsBackend: Send + Sync {
    /// Whether the backend can accept events right now.
    fn is_available(&self) -> bool {
        true
    }

    /// Hands one event to the backend. Must not block on the network.
    fn log_event(&self, event: &Event) -> Result<(), DispatchError>;
}

/// Body of a collection request.
#[derive(Debug, Serialize)]
struct CollectRequest<'a> {
    client_id: &'a str,
    events: [&'a Event; 1],
}

/// Analytics backend speaking the measurement collection protocol over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsBackend {
    client: reqwest::Client,
    collect_url: String,
    measurement_id: String,
    api_secret: String,
    client_id: String,
    runtime: Handle,
}

impl HttpAnalyticsBackend {
    /// Create a backend bound to the current tokio runtime.
    ///
    /// Returns [`DispatchError::Unavailable`] outside a runtime.
    pub fn new(settings: &AnalyticsSettings) -> Result<Self, DispatchError> {
        let runtime = Handle::try_current()
            .map_err(|e| DispatchError::Unavailable(format!("no async runtime: {}", e)))?;
        Self::with_runtime(settings, runtime)
    }

    /// Create a backend that spawns its network writes on `runtime`.
    pub fn with_runtime(settings: &AnalyticsSettings, runtime: Handle) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            collect_url: format!("{}/mp/collect", settings.endpoint.trim_end_matches('/')),
            measurement_id: settings.measurement_id.clone(),
            api_secret: settings.api_secret.clone(),
            client_id: uuid::Uuid::new_v4().to_string(),
            runtime,
        })
    }

    /// Pseudonymous id this client reports events under.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn encode(&self, event: &Event) -> Result<Vec<u8>, DispatchError> {
        let request = CollectRequest {
            client_id: &self.client_id,
            events: [event],
        };
        Ok(serde_json::to_vec(&request)?)
    }

    fn post(&self, body: Vec<u8>) -> reqwest::RequestBuilder {
        self.client
            .post(&self.collect_url)
            .query(&[
                ("measurement_id", self.measurement_id.as_str()),
                ("api_secret", self.api_secret.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
    }

    /// Send one event and wait for the backend's answer.
    pub async fn send(&self, event: &Event) -> Result<(), DispatchError> {
        let body = self.encode(event)?;
        let response = self.post(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status { status, body });
        }

        debug!(event = %event.name, "Analytics event delivered");
        Ok(())
    }
}

impl AnalyticsBackend for HttpAnalyticsBackend {
    fn log_event(&self, event: &Event) -> Result<(), DispatchError> {
        let body = self.encode(event)?;
        let request = self.post(body);
        let name = event.name.clone();

        self.runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(event = %name, "Analytics event delivered");
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    warn!(event = %name, status = %status, body = %body, "Analytics backend rejected event");
                }
                Err(e) => {
                    warn!(event = %name, error = %e, "Analytics event delivery failed");
                }
            }
        });

        Ok(())
    }
}

/// In-memory backend that keeps every event it receives.
#[derive(Debug)]
pub struct RecordingBackend {
    events: Mutex<Vec<Event>>,
    available: bool,
    fail_with: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            available: true,
            fail_with: None,
        }
    }

    /// A backend that reports itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// A backend that records each attempt and then rejects it.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new()
        }
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events received with the given name.
    pub fn events_named(&self, name: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.name.as_str() == name)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsBackend for RecordingBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn log_event(&self, event: &Event) -> Result<(), DispatchError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        match &self.fail_with {
            Some(message) => Err(DispatchError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use beacon_events::EventParams;

    use super::*;

    fn settings(endpoint: &str) -> AnalyticsSettings {
        AnalyticsSettings {
            endpoint: endpoint.to_string(),
            measurement_id: "G-TEST".to_string(),
            api_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_new_outside_runtime_is_unavailable() {
        let err = HttpAnalyticsBackend::new(&settings("http://localhost")).unwrap_err();
        assert!(matches!(err, DispatchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_collect_url_and_body() {
        let backend = HttpAnalyticsBackend::new(&settings("http://localhost:9/")).unwrap();
        assert_eq!(backend.collect_url, "http://localhost:9/mp/collect");

        let event = Event::new("signup", EventParams::new().with("plan", "pro"));
        let body: serde_json::Value = serde_json::from_slice(&backend.encode(&event).unwrap()).unwrap();

        assert_eq!(body["client_id"], backend.client_id());
        assert_eq!(body["events"][0]["name"], "signup");
        assert_eq!(body["events"][0]["params"]["plan"], "pro");
    }

    #[test]
    fn test_recording_backend_failure_still_records() {
        let backend = RecordingBackend::failing("quota exceeded");
        let result = backend.log_event(&Event::new("x", EventParams::new()));

        assert!(result.is_err());
        assert_eq!(backend.count(), 1);
    }

    #[test]
    fn test_recording_backend_clear() {
        let backend = RecordingBackend::new();
        backend.log_event(&Event::new("a", EventParams::new())).unwrap();
        backend.log_event(&Event::new("b", EventParams::new())).unwrap();
        assert_eq!(backend.count(), 2);

        backend.clear();
        assert_eq!(backend.count(), 0);

        backend.log_event(&Event::new("c", EventParams::new())).unwrap();
        assert_eq!(backend.events_named("c").len(), 1);
    }
}
