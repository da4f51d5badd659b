//! HTTP client for the external upscaling backend.
//!
//! The backend is an opaque collaborator: raw image bytes go in over a
//! POST, transformed JPEG bytes come back. [`Upscaler`] is the seam the
//! lifecycle manager and the sync passthrough depend on;
//! [`client::UpscaleClient`] is the real implementation.

pub mod client;

pub use client::{UpscaleClient, UpscalerConfig};

/// Errors a transform attempt can produce.
///
/// The client makes exactly one attempt per call; retrying is a policy
/// decision that belongs to the caller (and nothing in this system
/// currently retries).
#[derive(Debug, thiserror::Error)]
pub enum UpscaleError {
    /// The backend rejected the payload as malformed or unsupported.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The image exceeds the backend's pixel-area ceiling.
    #[error("Image too large: {0}")]
    TooLarge(String),

    /// The backend was unreachable or returned an unexpected status.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// The configured deadline elapsed before the backend responded.
    #[error("Upscale request timed out after {0} seconds")]
    Timeout(u64),
}

/// Seam over the external transform backend.
#[async_trait::async_trait]
pub trait Upscaler: Send + Sync {
    /// Submit image bytes for upscaling and wait for the transformed
    /// bytes. Single attempt, bounded by the configured timeout.
    async fn transform(&self, bytes: Vec<u8>, content_type: &str)
        -> Result<Vec<u8>, UpscaleError>;
}
