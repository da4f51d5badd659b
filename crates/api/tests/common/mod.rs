//! Shared helpers for API integration tests.
//!
//! [`build_test_app`] mirrors the dependency wiring in `main.rs` with
//! the upscale backend replaced by a stub, so tests exercise the same
//! router and middleware stack production uses without a live backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use pixelift_api::config::ServerConfig;
use pixelift_api::router::build_app_router;
use pixelift_api::state::AppState;
use pixelift_jobs::{LifecycleManager, LifecycleOptions, QueryService, SyncFacade};
use pixelift_notify::WebhookDispatcher;
use pixelift_store::{MemoryStore, TaskStore};
use pixelift_upscaler::{UpscaleError, Upscaler};

pub const BOUNDARY: &str = "pixelift-test-boundary";

// ---------------------------------------------------------------------------
// Stub upscaler
// ---------------------------------------------------------------------------

/// Canned behaviour for the stubbed upscale backend.
pub enum StubBehaviour {
    /// Return these bytes as the transformed image.
    Respond(Vec<u8>),
    /// Reject the image as exceeding the pixel-area ceiling (backend 413).
    RejectTooLarge,
    /// Reject the image as malformed (backend 400).
    RejectInvalid,
    /// Fail as if the backend were unreachable.
    FailUpstream,
}

pub struct StubUpscaler(pub StubBehaviour);

#[async_trait::async_trait]
impl Upscaler for StubUpscaler {
    async fn transform(
        &self,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<Vec<u8>, UpscaleError> {
        match &self.0 {
            StubBehaviour::Respond(bytes) => Ok(bytes.clone()),
            StubBehaviour::RejectTooLarge => Err(UpscaleError::TooLarge(
                "image exceeds the pixel-area ceiling".into(),
            )),
            StubBehaviour::RejectInvalid => {
                Err(UpscaleError::InvalidInput("corrupt image data".into()))
            }
            StubBehaviour::FailUpstream => {
                Err(UpscaleError::UpstreamFailure("backend unreachable".into()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        task_ttl_secs: 86_400,
        notify_on_failure: false,
    }
}

/// Build the full application router around a stubbed upscale backend.
pub fn build_test_app(behaviour: StubBehaviour) -> Router {
    let store: Arc<dyn TaskStore> = Arc::new(MemoryStore::new());
    build_test_app_with_store(behaviour, store)
}

/// As [`build_test_app`], but over a caller-supplied store so tests can
/// inspect or pre-seed task state directly.
pub fn build_test_app_with_store(behaviour: StubBehaviour, store: Arc<dyn TaskStore>) -> Router {
    let config = test_config();
    let upscaler: Arc<dyn Upscaler> = Arc::new(StubUpscaler(behaviour));
    let notifier = Arc::new(WebhookDispatcher::new());

    let state = AppState {
        lifecycle: LifecycleManager::new(
            Arc::clone(&store),
            Arc::clone(&upscaler),
            notifier,
            LifecycleOptions::default(),
        ),
        query: QueryService::new(store),
        sync: SyncFacade::new(upscaler),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Build a multipart upload request for `uri`.
///
/// `content_type: None` omits the part's Content-Type header entirely,
/// which the API must reject.
pub fn upload_request(uri: &str, content_type: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"bird.jpg\"\r\n",
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Poll `GET /status/{id}` until the task reaches a terminal status,
/// returning the final status string.
pub async fn poll_until_terminal(app: &Router, task_id: &str) -> String {
    for _ in 0..100 {
        let response = get(app.clone(), &format!("/status/{task_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let status = json["status"].as_str().unwrap().to_string();
        if status == "completed" || status == "failed" {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never reached a terminal status");
}
