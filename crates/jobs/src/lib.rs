//! Job lifecycle, read-only queries, and the synchronous passthrough.
//!
//! [`lifecycle::LifecycleManager`] is the only writer of task state;
//! [`query::QueryService`] never mutates anything; [`sync::SyncFacade`]
//! bypasses the store entirely.

pub mod lifecycle;
pub mod query;
pub mod sync;

pub use lifecycle::{LifecycleManager, LifecycleOptions, SubmitError};
pub use query::{QueryError, QueryService};
pub use sync::SyncFacade;
