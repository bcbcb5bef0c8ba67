//! Document service client.
//!
//! # Architecture
//!
//! - [`DocumentSource`]: what the pipeline needs, the rendered markup of one
//!   document
//! - [`QuipClient`]: the `threads` endpoint implementation, authenticated
//!   with a static bearer token
//!
//! A single GET per run; no retry, no pagination, reqwest's default timeout.

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ReminderError;
use crate::utils::truncate_for_log;

/// Anything that can hand back a document's rendered markup.
pub trait DocumentSource {
    /// Fetch the rendered markup of document `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the document (the thread id for Quip)
    ///
    /// # Returns
    ///
    /// The markup as an HTML string, possibly empty. Transport failures,
    /// non-success statuses and responses without markup are
    /// [`ReminderError::RemoteFetch`].
    async fn fetch_document(&self, id: &str) -> Result<String, ReminderError>;
}

/// Shape of a `GET /threads/{id}` response; only the markup fields matter.
#[derive(Debug, Deserialize)]
struct ThreadResponse {
    html: Option<String>,
    thread: Option<ThreadBody>,
}

#[derive(Debug, Deserialize)]
struct ThreadBody {
    html: Option<String>,
}

impl ThreadResponse {
    /// Top-level `html`, falling back to `thread.html`.
    fn into_markup(self) -> Option<String> {
        self.html.or_else(|| self.thread.and_then(|t| t.html))
    }
}

#[derive(Debug, Clone)]
pub struct QuipClient {
    client: Client,
    base_url: String,
    token: String,
}

impl QuipClient {
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn thread_url(&self, id: &str) -> String {
        format!("{}/threads/{}", self.base_url, id)
    }
}

impl DocumentSource for QuipClient {
    #[instrument(level = "info", skip(self), fields(doc_id = %id))]
    async fn fetch_document(&self, id: &str) -> Result<String, ReminderError> {
        let url = self.thread_url(id);
        info!(%url, "Fetching document");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Document request failed");
                ReminderError::fetch(None, e.to_string())
            })?;

        let status = response.status();
        info!(status = status.as_u16(), "Document service responded");
        let body = response
            .text()
            .await
            .map_err(|e| ReminderError::fetch(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Document service returned an error"
            );
            return Err(ReminderError::fetch(
                Some(status.as_u16()),
                truncate_for_log(&body, 300),
            ));
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %truncate_for_log(&body, 300), "Response is not JSON");
            ReminderError::fetch(Some(status.as_u16()), format!("invalid JSON: {e}"))
        })?;
        if let Some(obj) = value.as_object() {
            debug!(keys = ?obj.keys().collect::<Vec<_>>(), "Response keys");
        }
        if value.get("html").is_none() {
            warn!("No top-level html; trying thread.html");
        }

        let parsed: ThreadResponse = serde_json::from_value(value).map_err(|e| {
            ReminderError::fetch(Some(status.as_u16()), format!("unexpected response shape: {e}"))
        })?;
        let markup = parsed.into_markup().ok_or_else(|| {
            error!("Response carries no html field");
            ReminderError::fetch(Some(status.as_u16()), "response has no html field")
        })?;

        info!(bytes = markup.len(), "Fetched document markup");
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubResponse, StubServer};
    use serde_json::json;

    fn client_for(server: &StubServer) -> QuipClient {
        QuipClient::new(Client::new(), server.url("/1/"), "secret-token")
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_and_reads_html() {
        let server = StubServer::spawn(|_| {
            StubResponse::json(200, json!({ "html": "<ul><li>hi</li></ul>", "thread": {} }))
        });
        let markup = client_for(&server).fetch_document("abc123").await.unwrap();
        assert_eq!(markup, "<ul><li>hi</li></ul>");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "/1/threads/abc123");
        assert_eq!(requests[0].header("Authorization"), Some("Bearer secret-token"));
        assert_eq!(requests[0].header("Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_thread_html() {
        let server = StubServer::spawn(|_| {
            StubResponse::json(200, json!({ "thread": { "id": "x", "html": "<p>nested</p>" } }))
        });
        let markup = client_for(&server).fetch_document("x").await.unwrap();
        assert_eq!(markup, "<p>nested</p>");
    }

    #[tokio::test]
    async fn test_fetch_missing_html_is_error() {
        let server = StubServer::spawn(|_| StubResponse::json(200, json!({ "thread": { "id": "x" } })));
        let err = client_for(&server).fetch_document("x").await.unwrap_err();
        assert!(matches!(err, ReminderError::RemoteFetch { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = StubServer::spawn(|_| StubResponse::text(401, "bad token"));
        match client_for(&server).fetch_document("x").await {
            Err(ReminderError::RemoteFetch { status, reason }) => {
                assert_eq!(status, Some(401));
                assert_eq!(reason, "bad token");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_error() {
        let server = StubServer::spawn(|_| StubResponse::text(200, "<html>not json</html>"));
        let err = client_for(&server).fetch_document("x").await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_thread_url_trims_trailing_slash() {
        let client = QuipClient::new(Client::new(), "https://platform.example.com/1/", "t");
        assert_eq!(client.thread_url("doc"), "https://platform.example.com/1/threads/doc");
    }
}
