//! Deterministic, pure planning logic for `runiac deploy`.
//!
//! Core modules must be free of I/O side effects. They turn a request plus
//! already-gathered inputs (persisted config, ambient env, working directory)
//! into argument vectors suitable for tests.

pub mod build_plan;
pub mod forward;
pub mod identity;
pub mod resolve;
pub mod runtime_plan;
pub mod types;
