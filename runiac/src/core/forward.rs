//! Ambient environment passthrough.
//!
//! Variables whose name starts with a forwarding prefix are handed to the
//! container as-is. This is a coarse credential passthrough, not a secrecy
//! filter: anything under these prefixes reaches the deploy container.

use crate::core::types::ForwardedVar;

pub const FORWARD_PREFIXES: [&str; 4] = ["TF_VAR_", "ARM_", "RUNIAC_", "AWS_"];

pub fn is_forwardable(name: &str) -> bool {
    FORWARD_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Keep forwardable variables, in input order.
pub fn select_forwardable<I>(ambient: I) -> Vec<ForwardedVar>
where
    I: IntoIterator<Item = (String, String)>,
{
    ambient
        .into_iter()
        .filter(|(name, _)| is_forwardable(name))
        .map(|(name, value)| ForwardedVar {
            assignment: format!("{name}={value}"),
            name,
        })
        .collect()
}
