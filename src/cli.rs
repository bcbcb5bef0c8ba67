//! Command-line interface and runtime configuration.
//!
//! Every option can also come from the environment, which is how the
//! scheduler (cron, a Lambda trigger, ...) normally supplies it. The parsed
//! [`Cli`] is validated once into a [`Config`] that the rest of the program
//! borrows.

use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use clap::builder::BoolishValueParser;
use url::Url;

use crate::error::ReminderError;
use crate::time_gate::{TargetTime, Window, parse_targets};

pub const DEFAULT_API_BASE: &str = "https://platform.quip-amazon.com/1";

/// Command-line arguments for the daily reminder.
///
/// Switches read from the environment accept the usual spellings
/// (`1`/`0`, `yes`/`no`, `on`/`off`, `true`/`false`).
///
/// # Examples
///
/// ```sh
/// # Everything from the environment, as the scheduler runs it
/// CHIME_WEBHOOK_URL=... QUIP_API_TOKEN=... QUIP_DOC_ID=... daily_reminder
///
/// # Preview today's message without posting it
/// daily_reminder --force --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Incoming webhook URL the message is posted to
    #[arg(long, env = "CHIME_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Bearer token for the document service
    #[arg(long, env = "QUIP_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Identifier of the reminder document
    #[arg(long, env = "QUIP_DOC_ID")]
    pub doc_id: Option<String>,

    /// Send regardless of the time gate
    #[arg(long, env = "FORCE_SEND", value_parser = BoolishValueParser::new())]
    pub force: bool,

    /// Base URL of the document service API
    #[arg(long, env = "QUIP_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base_url: String,

    /// IANA timezone the target times are expressed in
    #[arg(long, env = "REMINDER_TIMEZONE", default_value = "America/Los_Angeles")]
    pub timezone: String,

    /// Comma-separated HH:MM send times
    #[arg(long, env = "REMINDER_TARGET_TIMES", default_value = "10:00,14:00")]
    pub target_times: String,

    /// Minutes after each target time that still count; 0 means the exact minute
    #[arg(long, env = "REMINDER_WINDOW_MINUTES", default_value_t = 5)]
    pub window_minutes: u32,

    /// File holding the last-run timestamp
    #[arg(long, env = "REMINDER_STATE_FILE", default_value = "last_run.txt")]
    pub state_file: PathBuf,

    /// Render every entry instead of only today's
    #[arg(long, env = "REMINDER_NO_DAY_FILTER", value_parser = BoolishValueParser::new())]
    pub no_day_filter: bool,

    /// Print the message instead of posting it
    #[arg(long, env = "REMINDER_DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub api_token: String,
    pub doc_id: String,
    pub force: bool,
    pub api_base_url: String,
    pub timezone: Tz,
    pub targets: Vec<TargetTime>,
    pub window: Window,
    pub state_file: PathBuf,
    pub day_aware: bool,
    pub dry_run: bool,
}

fn required(value: Option<String>, name: &str) -> Result<String, ReminderError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReminderError::config(format!("{name} is not set")))
}

fn http_url(value: &str, name: &str) -> Result<(), ReminderError> {
    let url = Url::parse(value).map_err(|e| ReminderError::config(format!("{name}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ReminderError::config(format!(
            "{name}: unsupported scheme {other:?}"
        ))),
    }
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ReminderError> {
        let webhook_url = required(self.webhook_url, "CHIME_WEBHOOK_URL")?;
        let api_token = required(self.api_token, "QUIP_API_TOKEN")?;
        let doc_id = required(self.doc_id, "QUIP_DOC_ID")?;
        http_url(&webhook_url, "CHIME_WEBHOOK_URL")?;
        http_url(&self.api_base_url, "QUIP_BASE_URL")?;

        let timezone: Tz = self.timezone.trim().parse().map_err(|_| {
            ReminderError::config(format!("unknown timezone {:?}", self.timezone))
        })?;
        let targets = parse_targets(&self.target_times)?;

        Ok(Config {
            webhook_url,
            api_token,
            doc_id,
            force: self.force,
            api_base_url: self.api_base_url,
            timezone,
            targets,
            window: Window::from_minutes(self.window_minutes),
            state_file: self.state_file,
            day_aware: !self.no_day_filter,
            dry_run: self.dry_run,
        })
    }
}
