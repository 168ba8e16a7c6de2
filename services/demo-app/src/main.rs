//! beacon demo
//!
//! Runs a scripted visit through the todo, event, and infinite list pages,
//! reporting events to the configured analytics backend and reading the
//! button color experiment from remote config. Without backend settings the
//! visit still runs and events are only logged.

use std::time::Duration;

use anyhow::{Context, Result};
use beacon_demo::{run_session, App, SessionPlan};
use beacon_sdk::BeaconConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "beacon-demo", version, about = "Scripted demo visit for the beacon client")]
struct Args {
    /// Seconds spent on the event page.
    #[arg(long, default_value_t = 2)]
    dwell_secs: u64,

    /// Simulated latency of each list page load, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    load_delay_ms: u64,

    /// Spacing between scroll samples, in milliseconds.
    #[arg(long, default_value_t = 50)]
    scroll_interval_ms: u64,

    /// Text of the todo added during the visit.
    #[arg(long, default_value = "Buy milk")]
    todo: String,

    /// Grace period for in-flight analytics requests before exit, in milliseconds.
    #[arg(long, default_value_t = 500)]
    flush_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = BeaconConfig::from_env().context("invalid beacon configuration")?;

    // JSON logs in production, compact lines in development
    let production = config.environment.is_production();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(production.then(|| fmt::layer().json()))
        .with((!production).then(|| fmt::layer().compact()))
        .init();

    info!(environment = %config.environment, ?config, "Starting beacon demo");

    let app = App::from_config(&config);
    let plan = SessionPlan {
        dwell: Duration::from_secs(args.dwell_secs),
        load_delay: Duration::from_millis(args.load_delay_ms),
        scroll_interval: Duration::from_millis(args.scroll_interval_ms),
        new_todo: args.todo,
    };

    let summary = run_session(&app, &plan).await;
    info!(
        remote_config_activated = summary.remote_config_activated,
        button_color = %summary.button_color,
        todos = summary.todos,
        completed_todos = summary.completed_todos,
        clicks = summary.clicks,
        seconds_on_event_page = summary.seconds_on_event_page,
        list_items = summary.list_items,
        list_loads = summary.list_loads,
        "Session complete"
    );

    if app.tracker().is_enabled() {
        tokio::time::sleep(Duration::from_millis(args.flush_ms)).await;
    }

    info!("Beacon demo finished");
    Ok(())
}
