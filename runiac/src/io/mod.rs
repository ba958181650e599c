//! I/O helpers for runiac commands.

pub mod config;
pub mod engine;
pub mod process;
pub mod progress;
pub mod tee;
pub mod username;
