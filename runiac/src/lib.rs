//! Deploy orchestration for runiac projects.
//!
//! `runiac deploy` builds the project's deploy image and then runs it with an
//! assembled environment: identity, forwarded credentials, persisted volumes.
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic planning (config precedence, identity,
//!   env forwarding, build and run argument vectors). No I/O.
//! - **[`io`]**: Side-effecting adapters (config file, engine processes,
//!   username lookup, spinner). Behind traits where tests need fakes.
//!
//! [`deploy`] sequences core planning with I/O to implement the command.

pub mod core;
pub mod deploy;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
