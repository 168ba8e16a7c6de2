//! Track command: send one analytics event.

use std::sync::Arc;

use anyhow::Result;
use beacon_events::{format_timestamp, param_keys, Event, EventParams, ParamValue};
use beacon_sdk::config::AnalyticsSettings;
use beacon_sdk::{HttpAnalyticsBackend, RecordingBackend, Tracker};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::error::CliError;
use crate::output::{print_output, print_single, print_success, print_warning, OutputFormat};

use super::CommandContext;

/// Track command.
#[derive(Debug, Args)]
pub struct TrackCommand {
    /// Event name (e.g. button_click).
    name: String,

    /// Event parameter as key=value; repeatable.
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,

    /// Print the event instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct ParamRow {
    #[tabled(rename = "Param")]
    name: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl TrackCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let event = self.build_event();
        for issue in event.validate() {
            print_warning(&issue.to_string());
        }

        if self.dry_run {
            let recorder = Arc::new(RecordingBackend::new());
            let tracker = Tracker::new(Some(recorder.clone()), ctx.config.environment);
            tracker.track_event(event);
            for recorded in recorder.events() {
                print_event(&recorded, ctx.format);
            }
            return Ok(());
        }

        let settings = ctx.config.analytics().ok_or(CliError::NotConfigured {
            what: "Analytics",
            vars: "BEACON_MEASUREMENT_ID and BEACON_API_SECRET",
        })?;
        send_event(&settings, &event).await?;

        match ctx.format {
            OutputFormat::Json => print_single(&event),
            OutputFormat::Table => print_success(&format!("Sent {}", event.name)),
        }
        Ok(())
    }

    /// The event as it would be tracked; a `timestamp` is added unless given.
    fn build_event(&self) -> Event {
        let mut params = EventParams::new().with(param_keys::TIMESTAMP, format_timestamp(Utc::now()));
        params.extend(self.params.iter().cloned().collect::<EventParams>());
        Event::new(self.name.as_str(), params)
    }
}

async fn send_event(settings: &AnalyticsSettings, event: &Event) -> Result<(), CliError> {
    let backend = HttpAnalyticsBackend::new(settings)?;
    debug!(
        event = %event.name,
        client_id = backend.client_id(),
        endpoint = %settings.endpoint,
        "Sending analytics event"
    );
    backend.send(event).await?;
    Ok(())
}

fn print_event(event: &Event, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_single(event),
        OutputFormat::Table => {
            println!("{}", event.name);
            let rows: Vec<ParamRow> = event
                .params
                .iter()
                .map(|(name, value)| ParamRow {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect();
            print_output(&rows, format);
        }
    }
}

/// Parses `key=value`. Values read as bool, then integer, then float, else string.
fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in `{}`", raw));
    }
    Ok((key.to_string(), parse_value(value)))
}

fn parse_value(value: &str) -> ParamValue {
    if let Ok(b) = value.parse::<bool>() {
        return ParamValue::Bool(b);
    }
    if let Ok(n) = value.parse::<i64>() {
        return ParamValue::Int(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => ParamValue::Float(f),
        _ => ParamValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[rstest]
    #[case("true", ParamValue::Bool(true))]
    #[case("false", ParamValue::Bool(false))]
    #[case("42", ParamValue::Int(42))]
    #[case("-7", ParamValue::Int(-7))]
    #[case("2.5", ParamValue::Float(2.5))]
    #[case("/event", ParamValue::String("/event".to_string()))]
    #[case("", ParamValue::String(String::new()))]
    #[case("NaN", ParamValue::String("NaN".to_string()))]
    fn test_parse_value(#[case] raw: &str, #[case] expected: ParamValue) {
        assert_eq!(parse_value(raw), expected);
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("page=/event").unwrap(),
            ("page".to_string(), ParamValue::String("/event".to_string()))
        );
        assert_eq!(
            parse_param("note=a=b").unwrap(),
            ("note".to_string(), ParamValue::String("a=b".to_string()))
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn test_build_event_keeps_explicit_timestamp() {
        let cmd = TrackCommand {
            name: "button_click".to_string(),
            params: vec![
                ("timestamp".to_string(), ParamValue::String("fixed".to_string())),
                ("total_clicks".to_string(), ParamValue::Int(3)),
            ],
            dry_run: true,
        };

        let event = cmd.build_event();
        assert_eq!(event.name.as_str(), "button_click");
        assert_eq!(event.params.get("timestamp").and_then(ParamValue::as_str), Some("fixed"));
        assert_eq!(event.params.get("total_clicks"), Some(&ParamValue::Int(3)));
    }

    #[tokio::test]
    async fn test_send_event_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mp/collect"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let settings = AnalyticsSettings {
            endpoint: server.uri(),
            measurement_id: "G-TEST".to_string(),
            api_secret: "wrong".to_string(),
        };
        let err = send_event(&settings, &Event::new("ping", EventParams::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CliError::Dispatch(beacon_sdk::DispatchError::Status { status: 403, .. })
        ));
    }
}
