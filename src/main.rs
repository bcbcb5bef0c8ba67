//! # Daily Reminder
//!
//! Posts the team's daily reminder to a chat room. The reminder lives in a
//! shared document whose bullet list is split into sections (joke of the day,
//! QA tip, important reminders, metrics goals), optionally with per-weekday
//! entries such as `(Monday) sprint review`.
//!
//! ## Usage
//!
//! ```sh
//! CHIME_WEBHOOK_URL=... QUIP_API_TOKEN=... QUIP_DOC_ID=... daily_reminder
//! ```
//!
//! ## Pipeline
//!
//! 1. **Gate**: skip unless the clock is inside a target send window
//! 2. **Fetch**: read the document's rendered markup
//! 3. **Extract**: pick out the sections (and today's entries)
//! 4. **Format**: render the chat message
//! 5. **Notify**: POST it to the webhook
//!
//! Only configuration errors end the process with a non-zero status; anything
//! that goes wrong later is logged and the next scheduled run tries again.

use std::fmt;
use std::process::ExitCode;

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use clap::Parser;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod error;
mod extract;
mod models;
mod outputs;
#[cfg(test)]
mod test_support;
mod time_gate;
mod utils;

use api::{DocumentSource, QuipClient};
use cli::{Cli, Config};
use error::ReminderError;
use extract::{ExtractOptions, extract};
use outputs::message::format_message;
use outputs::webhook::{NotifyOutcome, Webhook};
use time_gate::{FileStateStore, StateStore, TimeGate};

/// Where a run currently is; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Gated,
    Fetching,
    Extracting,
    Formatting,
    Notifying,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Gated => "gated",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Formatting => "formatting",
            Stage::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

/// How a run that did not hit an error ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunOutcome {
    /// Outside every send window, or this window was already served.
    NotTime,
    /// The document had no recognisable sections.
    NoContent,
    /// The message was printed instead of posted.
    DryRun(String),
    Sent,
}

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_reminder starting up");

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        webhook_url_len = config.webhook_url.len(),
        api_token_len = config.api_token.len(),
        doc_id = %config.doc_id,
        timezone = %config.timezone,
        force = config.force,
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    let client = match Client::builder()
        .user_agent(concat!("daily_reminder/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let gate = TimeGate::new(config.timezone, config.targets.clone(), config.window);
    let source = QuipClient::new(client.clone(), &config.api_base_url, &config.api_token);
    let webhook = Webhook::new(client, &config.webhook_url);
    let store = FileStateStore::new(&config.state_file);

    let result = run(&config, &gate, &source, &store, &webhook, gate.now()).await;
    let elapsed = start_time.elapsed();
    match result {
        Ok(RunOutcome::DryRun(message)) => {
            println!("{message}");
            info!(?elapsed, "Dry run complete");
        }
        Ok(outcome) => info!(?outcome, ?elapsed, "Execution complete"),
        Err(e) if e.is_fatal() => {
            error!(error = %e, ?elapsed, "Run aborted");
            return ExitCode::FAILURE;
        }
        Err(e) => error!(error = %e, ?elapsed, "Run failed; will retry on next schedule"),
    }
    ExitCode::SUCCESS
}

/// One pass through gate, fetch, extract, format and notify.
#[instrument(level = "info", skip_all, fields(doc_id = %config.doc_id, now = %now.to_rfc3339()))]
async fn run<D, S>(
    config: &Config,
    gate: &TimeGate,
    source: &D,
    store: &S,
    webhook: &Webhook,
    now: DateTime<Tz>,
) -> Result<RunOutcome, ReminderError>
where
    D: DocumentSource,
    S: StateStore,
{
    debug!(stage = %Stage::Gated);
    let last_run = store.load();
    if !gate.should_run(now, last_run, config.force) {
        return Ok(RunOutcome::NotTime);
    }
    if !config.dry_run {
        if let Err(e) = store.save(now.fixed_offset()) {
            warn!(error = %e, "Could not record this run; continuing");
        }
    }

    debug!(stage = %Stage::Fetching);
    let markup = source.fetch_document(&config.doc_id).await?;

    debug!(stage = %Stage::Extracting);
    let sections = extract(
        &markup,
        ExtractOptions {
            day_aware: config.day_aware,
        },
    );
    if sections.is_empty() {
        info!("No content found in the document; nothing to send");
        return Ok(RunOutcome::NoContent);
    }

    debug!(stage = %Stage::Formatting);
    let today = config.day_aware.then(|| now.weekday());
    let message = format_message(&sections, today);
    debug!(message = %message, "Formatted message");

    if config.dry_run {
        return Ok(RunOutcome::DryRun(message));
    }

    debug!(stage = %Stage::Notifying);
    match webhook.notify(&message).await {
        NotifyOutcome::Delivered => Ok(RunOutcome::Sent),
        NotifyOutcome::Failed(e) => Err(e),
    }
}
