use pixelift_jobs::{LifecycleManager, QueryService, SyncFacade};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Every dependency is constructed at startup and injected here; nothing
/// in the service reaches for ambient globals. Server configuration is
/// consumed at construction time (router layers, lifecycle options) and
/// does not travel with the state. Cheaply cloneable (inner data is
/// behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// The only writer of task state.
    pub lifecycle: LifecycleManager,
    /// Read-only projections over the task store.
    pub query: QueryService,
    /// Synchronous passthrough to the upscale backend.
    pub sync: SyncFacade,
}
