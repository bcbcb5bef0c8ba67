//! Incoming-webhook delivery.
//!
//! One POST of `{"Content": text}`. Only HTTP 200 counts as delivered; any
//! other status or a transport failure is logged and reported as
//! [`NotifyOutcome::Failed`]. Nothing is retried.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::ReminderError;
use crate::utils::truncate_for_log;

#[derive(Debug, Serialize)]
struct Payload<'a> {
    #[serde(rename = "Content")]
    content: &'a str,
}

#[derive(Debug)]
pub enum NotifyOutcome {
    Delivered,
    Failed(ReminderError),
}

#[derive(Debug, Clone)]
pub struct Webhook {
    client: Client,
    url: String,
}

impl Webhook {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Post `text` to the webhook once.
    ///
    /// # Arguments
    ///
    /// * `text` - The fully formatted message, sent as the `Content` field
    ///
    /// # Returns
    ///
    /// [`NotifyOutcome::Delivered`] on HTTP 200. Any other status, or a
    /// request that never got a response, yields [`NotifyOutcome::Failed`]
    /// carrying a [`ReminderError::Notify`]. Failures are logged here, so
    /// callers only need to branch on the outcome.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let hook = Webhook::new(Client::new(), &config.webhook_url);
    /// if let NotifyOutcome::Failed(e) = hook.notify(&message).await {
    ///     warn!(error = %e, "Reminder not delivered");
    /// }
    /// ```
    #[instrument(level = "info", skip_all, fields(bytes = text.len()))]
    pub async fn notify(&self, text: &str) -> NotifyOutcome {
        let payload = Payload { content: text };
        let response = match self.client.post(&self.url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Webhook request failed");
                return NotifyOutcome::Failed(ReminderError::Notify {
                    status: None,
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::OK {
            info!(status = status.as_u16(), "Reminder sent successfully");
            NotifyOutcome::Delivered
        } else {
            error!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Failed to send reminder"
            );
            NotifyOutcome::Failed(ReminderError::Notify {
                status: Some(status.as_u16()),
                reason: truncate_for_log(&body, 300),
            })
        }
    }
}
