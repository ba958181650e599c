//! Tracing setup for the CLI.
//!
//! Engine command lines and stage progress are logged at `info`; set
//! `RUST_LOG` to change verbosity. This is unrelated to `--log-level`, which is
//! forwarded to the deploy container as `RUNIAC_LOG_LEVEL`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,runiac=info";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn,runiac=info` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=runiac=debug runiac deploy --local
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
