/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `330`). Must exceed the
    /// upscale client's deadline so the synchronous passthrough is cut
    /// off by the client timeout, not by the HTTP layer.
    pub request_timeout_secs: u64,
    /// Retention window for task records and results, in seconds
    /// (default: 24 hours).
    pub task_ttl_secs: u64,
    /// Whether failed tasks also notify their webhook URL (default: off).
    pub notify_on_failure: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `HTTP_TIMEOUT_SECS`    | `330`                      |
    /// | `TASK_TTL_SECS`        | `86400`                    |
    /// | `NOTIFY_ON_FAILURE`    | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "330".into())
            .parse()
            .expect("HTTP_TIMEOUT_SECS must be a valid u64");

        let task_ttl_secs: u64 = std::env::var("TASK_TTL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("TASK_TTL_SECS must be a valid u64");

        let notify_on_failure = std::env::var("NOTIFY_ON_FAILURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "t"))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            task_ttl_secs,
            notify_on_failure,
        }
    }
}
