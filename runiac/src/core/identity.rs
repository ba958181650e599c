//! Namespace and deployment ring selection.
//!
//! Three modes produce an [`Identity`], checked in order: local mode, pull
//! request mode, then whatever ring the invoker passed directly.

use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

use crate::core::types::Identity;

pub const LOCAL_RING: &str = "local";
pub const PULL_REQUEST_RING: &str = "pr";

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]").expect("static regex"));

/// One way of discovering the current OS user.
pub trait UsernameSource {
    /// Short label used in diagnostics.
    fn label(&self) -> &str;
    /// The user name, or `None` when this source has nothing to offer.
    fn username(&self) -> Option<String>;
}

/// Trim and replace every character outside `[a-zA-Z0-9]` with `_`.
pub fn sanitize_machine_name(raw: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(raw.trim(), "_")
        .into_owned()
}

/// First non-empty user name from `sources`, sanitized.
pub fn machine_name(sources: &[Box<dyn UsernameSource>]) -> Result<String> {
    for source in sources {
        match source.username() {
            Some(name) if !name.trim().is_empty() => return Ok(sanitize_machine_name(&name)),
            _ => tracing::debug!(source = source.label(), "username source unavailable"),
        }
    }
    let tried: Vec<&str> = sources.iter().map(|source| source.label()).collect();
    Err(anyhow!(
        "unable to determine machine name (tried {})",
        tried.join(", ")
    ))
}

/// Resolve the identity for this run.
///
/// Local mode wins over a pull request id. With neither, the namespace stays
/// empty and `deployment_ring` is used verbatim.
pub fn resolve_identity(
    local: bool,
    pull_request: &str,
    deployment_ring: &str,
    sources: &[Box<dyn UsernameSource>],
) -> Result<Identity> {
    if local {
        return Ok(Identity {
            namespace: machine_name(sources)?,
            ring: LOCAL_RING.to_string(),
        });
    }
    if !pull_request.is_empty() {
        return Ok(Identity {
            namespace: pull_request.to_string(),
            ring: PULL_REQUEST_RING.to_string(),
        });
    }
    Ok(Identity {
        namespace: String::new(),
        ring: deployment_ring.to_string(),
    })
}
