//! Best-effort webhook notification.
//!
//! [`WebhookDispatcher`] makes exactly one delivery attempt per
//! notification. A failed delivery is logged and dropped: the owning
//! task is already in a terminal state by the time a webhook fires, and
//! nothing here may alter that. There is no replay queue.

use std::time::Duration;

use pixelift_core::types::TaskId;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Seam over outbound webhook delivery.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a completed result to `url`. The body is the raw result
    /// bytes with an `image/jpeg` content type.
    async fn notify_completed(
        &self,
        url: &str,
        task_id: TaskId,
        result: &[u8],
    ) -> Result<(), WebhookError>;

    /// Deliver a failure notice to `url` as a small JSON document.
    async fn notify_failed(
        &self,
        url: &str,
        task_id: TaskId,
        reason: &str,
    ) -> Result<(), WebhookError>;
}

// ---------------------------------------------------------------------------
// WebhookDispatcher
// ---------------------------------------------------------------------------

/// Delivers task outcomes to caller-supplied webhook URLs.
pub struct WebhookDispatcher {
    client: reqwest::Client,
}

impl WebhookDispatcher {
    /// Create a new dispatcher with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    fn check(response: reqwest::Response) -> Result<(), WebhookError> {
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookDispatcher {
    async fn notify_completed(
        &self,
        url: &str,
        task_id: TaskId,
        result: &[u8],
    ) -> Result<(), WebhookError> {
        tracing::info!(%task_id, url, bytes = result.len(), "Delivering completion webhook");
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(result.to_vec())
            .send()
            .await?;
        Self::check(response)
    }

    async fn notify_failed(
        &self,
        url: &str,
        task_id: TaskId,
        reason: &str,
    ) -> Result<(), WebhookError> {
        tracing::info!(%task_id, url, "Delivering failure webhook");
        let payload = serde_json::json!({
            "task_id": task_id,
            "status": "failed",
            "reason": reason,
        });
        let response = self.client.post(url).json(&payload).send().await?;
        Self::check(response)
    }
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _dispatcher = WebhookDispatcher::new();
    }

    #[test]
    fn webhook_error_display_http_status() {
        let err = WebhookError::HttpStatus(500);
        assert_eq!(err.to_string(), "Webhook returned HTTP 500");
    }

    #[test]
    fn webhook_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = WebhookError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }

    #[tokio::test]
    async fn unreachable_listener_is_request_error() {
        let dispatcher = WebhookDispatcher::new();
        let err = dispatcher
            .notify_completed("http://127.0.0.1:1/hook", uuid::Uuid::new_v4(), &[1, 2])
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::Request(_)), "got {err:?}");
    }
}
