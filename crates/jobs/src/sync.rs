//! The synchronous passthrough: no task, no persisted state.

use std::sync::Arc;

use pixelift_upscaler::{UpscaleError, Upscaler};

/// Stateless delegation to the upscale client.
///
/// The caller blocks for the full duration of the transform, bounded
/// only by the client's own timeout.
#[derive(Clone)]
pub struct SyncFacade {
    upscaler: Arc<dyn Upscaler>,
}

impl SyncFacade {
    pub fn new(upscaler: Arc<dyn Upscaler>) -> Self {
        Self { upscaler }
    }

    /// Transform image bytes and return the output directly.
    pub async fn upscale_now(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Vec<u8>, UpscaleError> {
        self.upscaler.transform(bytes, content_type).await
    }
}
