use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelift_api::config::ServerConfig;
use pixelift_api::router::build_app_router;
use pixelift_api::state::AppState;
use pixelift_jobs::{LifecycleManager, LifecycleOptions, QueryService, SyncFacade};
use pixelift_notify::WebhookDispatcher;
use pixelift_store::{MemoryStore, TaskStore};
use pixelift_upscaler::{UpscaleClient, Upscaler, UpscalerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelift=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let upscaler_config = UpscalerConfig::from_env();
    tracing::info!(
        backend = %upscaler_config.base_url,
        timeout_secs = upscaler_config.timeout_secs,
        "Upscale backend configured"
    );

    // --- Task store + expiry sweeper ---
    let store = MemoryStore::with_ttl(Duration::from_secs(config.task_ttl_secs));
    let sweeper_cancel = tokio_util::sync::CancellationToken::new();
    let sweeper_handle = store.start_sweeper(sweeper_cancel.clone());
    tracing::info!(ttl_secs = config.task_ttl_secs, "Task store created");

    // --- Injected dependencies ---
    let store: Arc<dyn TaskStore> = Arc::new(store);
    let upscaler: Arc<dyn Upscaler> = Arc::new(UpscaleClient::new(&upscaler_config));
    let notifier = Arc::new(WebhookDispatcher::new());

    let lifecycle = LifecycleManager::new(
        Arc::clone(&store),
        Arc::clone(&upscaler),
        notifier,
        LifecycleOptions {
            notify_on_failure: config.notify_on_failure,
        },
    );
    let query = QueryService::new(Arc::clone(&store));
    let sync = SyncFacade::new(upscaler);

    // --- App state + router ---
    let state = AppState {
        lifecycle,
        query,
        sync,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;
    tracing::info!("Task store sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
