//! Shared domain types for the pixelift upscaling service.
//!
//! This crate has no internal dependencies and holds the vocabulary the
//! rest of the workspace speaks: task identifiers, the [`task::Task`]
//! record, and the [`task::TaskStatus`] state machine.

pub mod task;
pub mod types;
