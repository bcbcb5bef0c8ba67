//! Send-time gate and last-run bookkeeping.
//!
//! The process is started by an external scheduler, usually more often than
//! we want to post. The gate lets a run through only when the wall clock in
//! the configured timezone sits inside the window of one of the target times,
//! and only once per window: the last qualifying run is persisted through a
//! [`StateStore`] and a second run inside the same window on the same date is
//! turned away.
//!
//! | Window | Matches when |
//! |--------|--------------|
//! | `ExactMinute` | hour and minute equal the target |
//! | `Minutes(n)` | `target <= now < target + n minutes` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;
use tracing::{debug, info, instrument, warn};

use crate::error::ReminderError;

/// A target send time, wall-clock in the gate's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTime {
    pub hour: u32,
    pub minute: u32,
}

impl TargetTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    fn as_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TargetTime {
    type Err = ReminderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ReminderError::config(format!("invalid target time {s:?}, expected HH:MM"));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour = h.trim().parse().map_err(|_| bad())?;
        let minute = m.trim().parse().map_err(|_| bad())?;
        TargetTime::new(hour, minute).ok_or_else(bad)
    }
}

impl fmt::Display for TargetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a comma-separated list such as `"10:00, 14:00"`.
pub fn parse_targets(s: &str) -> Result<Vec<TargetTime>, ReminderError> {
    let targets = s
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(TargetTime::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if targets.is_empty() {
        return Err(ReminderError::config("no target times configured"));
    }
    Ok(targets)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    ExactMinute,
    Minutes(u32),
}

impl Window {
    /// `0` means the exact minute.
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes == 0 {
            Self::ExactMinute
        } else {
            Self::Minutes(minutes)
        }
    }

    fn contains(self, target: TargetTime, time: NaiveTime) -> bool {
        match self {
            Self::ExactMinute => time.hour() == target.hour && time.minute() == target.minute,
            Self::Minutes(n) => {
                let start = target.as_naive();
                let offset = time.signed_duration_since(start);
                offset >= TimeDelta::zero() && offset < TimeDelta::minutes(i64::from(n))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeGate {
    pub tz: Tz,
    pub targets: Vec<TargetTime>,
    pub window: Window,
}

impl TimeGate {
    pub fn new(tz: Tz, targets: Vec<TargetTime>, window: Window) -> Self {
        Self { tz, targets, window }
    }

    /// Current wall-clock time in the gate's timezone.
    pub fn now(&self) -> DateTime<Tz> {
        chrono::Utc::now().with_timezone(&self.tz)
    }

    /// The first target whose window contains `now`.
    pub fn matching_target<T: TimeZone>(&self, now: &DateTime<T>) -> Option<TargetTime> {
        let local = now.with_timezone(&self.tz).time();
        self.targets
            .iter()
            .copied()
            .find(|t| self.window.contains(*t, local))
    }

    /// Decide whether this invocation should send.
    ///
    /// `force` wins outright. Otherwise `now` must fall inside a target window
    /// and `last_run` must not already sit inside that same window on the same
    /// date.
    ///
    /// # Arguments
    ///
    /// * `now` - Current wall-clock time in the gate's timezone
    /// * `last_run` - The previously recorded run, in any offset
    /// * `force` - Bypass both the window check and de-duplication
    ///
    /// # Returns
    ///
    /// `true` when this invocation should go on to fetch and send.
    #[instrument(level = "info", skip(self), fields(window = ?self.window))]
    pub fn should_run(
        &self,
        now: DateTime<Tz>,
        last_run: Option<DateTime<FixedOffset>>,
        force: bool,
    ) -> bool {
        if force {
            info!("Force send enabled; bypassing time gate");
            return true;
        }

        let Some(target) = self.matching_target(&now) else {
            info!(time = %now.format("%H:%M"), "Not a scheduled send time");
            return false;
        };

        if let Some(last) = last_run {
            let last_local = last.with_timezone(&self.tz);
            let same_date = last_local.date_naive() == now.date_naive();
            let same_slot = self.window.contains(target, last_local.time());
            if same_date && same_slot {
                info!(%target, last_run = %last.to_rfc3339(), "Already ran in this slot");
                return false;
            }
        }

        debug!(%target, weekday = %now.weekday(), "Inside send window");
        true
    }
}

/// Persisted last-run marker.
pub trait StateStore {
    /// The last recorded run; `None` when absent or unreadable.
    fn load(&self) -> Option<DateTime<FixedOffset>>;
    fn save(&self, at: DateTime<FixedOffset>) -> Result<(), ReminderError>;
}

/// Keeps the marker as a single RFC 3339 line in a file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<DateTime<FixedOffset>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No last-run marker");
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt last-run marker");
                None
            }
        }
    }

    fn save(&self, at: DateTime<FixedOffset>) -> Result<(), ReminderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ReminderError::State(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(&self.path, format!("{}\n", at.to_rfc3339()))
            .map_err(|e| ReminderError::State(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), at = %at.to_rfc3339(), "Recorded last run");
        Ok(())
    }
}
