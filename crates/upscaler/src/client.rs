//! The reqwest-backed [`Upscaler`] implementation.

use std::time::Duration;

use crate::{UpscaleError, Upscaler};

/// Content type forwarded when the caller supplied a blank one.
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection configuration for the upscaling backend.
#[derive(Debug, Clone)]
pub struct UpscalerConfig {
    /// Base HTTP URL of the backend (e.g. `http://esrgan:8001`).
    pub base_url: String,
    /// Deadline for a single transform request, in seconds. The backend
    /// enforces no timeout of its own, so this is the only bound.
    pub timeout_secs: u64,
}

impl UpscalerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default               |
    /// |------------------------|-----------------------|
    /// | `UPSCALER_URL`         | `http://esrgan:8001`  |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                 |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("UPSCALER_URL").unwrap_or_else(|_| "http://esrgan:8001".into());

        let timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// UpscaleClient
// ---------------------------------------------------------------------------

/// HTTP client for one upscaling backend.
///
/// Holds a pre-built `reqwest::Client` with the transform deadline baked
/// in; cheap to clone and safe to share across in-flight requests.
#[derive(Clone)]
pub struct UpscaleClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl UpscaleClient {
    /// Build a client from the given configuration.
    pub fn new(config: &UpscalerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Base HTTP URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Upscaler for UpscaleClient {
    async fn transform(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Vec<u8>, UpscaleError> {
        let content_type = if content_type.is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            content_type
        };
        let url = format!("{}/upscale", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpscaleError::Timeout(self.timeout_secs)
                } else {
                    UpscaleError::UpstreamFailure(format!(
                        "Failed to reach upscaling backend at {url}: {e}"
                    ))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await.map_err(|e| {
                UpscaleError::UpstreamFailure(format!("Failed to read backend response: {e}"))
            })?;
            return Ok(body.to_vec());
        }

        let detail = response.text().await.unwrap_or_default();
        match status.as_u16() {
            400 => Err(UpscaleError::InvalidInput(detail)),
            413 => Err(UpscaleError::TooLarge(detail)),
            other => Err(UpscaleError::UpstreamFailure(format!(
                "Backend returned HTTP {other}: {detail}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = UpscaleClient::new(&UpscalerConfig {
            base_url: "http://localhost:8001/".into(),
            timeout_secs: 300,
        });
        assert_eq!(client.base_url(), "http://localhost:8001");
    }

    #[test]
    fn error_display_carries_detail() {
        let err = UpscaleError::TooLarge("image exceeds maximum size".into());
        assert_eq!(err.to_string(), "Image too large: image exceeds maximum size");

        let err = UpscaleError::Timeout(300);
        assert_eq!(err.to_string(), "Upscale request timed out after 300 seconds");
    }

    #[tokio::test]
    async fn unreachable_backend_is_upstream_failure() {
        // Nothing listens on this port; connection is refused immediately.
        let client = UpscaleClient::new(&UpscalerConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 5,
        });

        let err = client.transform(vec![0xFF], "image/jpeg").await.unwrap_err();
        assert!(matches!(err, UpscaleError::UpstreamFailure(_)), "got {err:?}");
    }
}
