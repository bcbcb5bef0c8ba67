//! Error taxonomy for a reminder run.
//!
//! Only [`ReminderError::Configuration`] is fatal: it means the process was
//! started without what it needs and should exit non-zero. Everything else is
//! logged at the entry point and the run ends cleanly, since the external
//! scheduler will invoke us again on its next cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    /// A required option is missing or unparseable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document service returned a non-success status or an unusable body.
    #[error("document fetch failed (status {status:?}): {reason}")]
    RemoteFetch { status: Option<u16>, reason: String },

    /// The webhook POST did not return HTTP 200.
    #[error("webhook delivery failed (status {status:?}): {reason}")]
    Notify { status: Option<u16>, reason: String },

    /// The last-run marker could not be written.
    #[error("run state error: {0}")]
    State(String),
}

impl ReminderError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn fetch(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            status,
            reason: reason.into(),
        }
    }

    /// Whether the process should exit non-zero for this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
