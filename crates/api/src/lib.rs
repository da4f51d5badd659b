//! HTTP surface of the pixelift upscaling service.
//!
//! Route modules live under [`routes`]; [`router::build_app_router`] is
//! shared by the production binary and the integration tests so both
//! exercise the same middleware stack.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
