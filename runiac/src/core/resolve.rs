//! Precedence between command-line flags and persisted configuration.
//!
//! A flag given on the command line always wins. A flag left unset falls back
//! to the persisted value for its key, and then to the flag default.

use crate::core::types::{
    DEFAULT_CONTAINER, DEFAULT_CONTAINER_ENGINE, DEFAULT_DOCKERFILE, DeploymentRequest,
    ResolvedConfig,
};

pub const CONTAINER_ENGINE_KEY: &str = "container_engine";
pub const CONTAINER_KEY: &str = "container";
pub const DOCKERFILE_KEY: &str = "dockerfile";

/// Pick the effective value for one config-backed flag.
///
/// Empty persisted values count as absent.
pub fn resolve_value(cli: Option<&str>, persisted: Option<&str>, default: &str) -> String {
    if let Some(value) = cli {
        return value.to_string();
    }
    match persisted {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Resolve every config-backed field of `request`.
///
/// `lookup` maps a persisted config key to its value, if any.
pub fn resolve_config<F>(request: &DeploymentRequest, lookup: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    let field = |cli: &Option<String>, key: &str, default: &str| {
        resolve_value(cli.as_deref(), lookup(key).as_deref(), default)
    };

    ResolvedConfig {
        container_engine: field(
            &request.container_engine,
            CONTAINER_ENGINE_KEY,
            DEFAULT_CONTAINER_ENGINE,
        ),
        container: field(&request.container, CONTAINER_KEY, DEFAULT_CONTAINER),
        dockerfile: field(&request.dockerfile, DOCKERFILE_KEY, DEFAULT_DOCKERFILE),
        version: request.version.clone(),
        environment: request.environment.clone(),
        account: request.account.clone(),
        primary_regions: request.primary_regions.clone(),
        regional_regions: request.regional_regions.clone(),
        dry_run: request.dry_run,
        self_destroy: request.self_destroy,
        log_level: request.log_level.clone(),
        interactive: request.interactive,
        deployment_ring: request.deployment_ring.clone(),
        local: request.local,
        pull_request: request.pull_request.clone(),
        runner: request.runner.clone(),
        step_whitelist: request.step_whitelist.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn persisted(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn cli_value_wins_over_persisted() {
        assert_eq!(resolve_value(Some("podman"), Some("docker"), "x"), "podman");
    }

    #[test]
    fn explicit_empty_cli_value_is_kept() {
        assert_eq!(resolve_value(Some(""), Some(".runiac/Other"), "d"), "");
    }

    #[test]
    fn persisted_value_used_when_cli_unset() {
        assert_eq!(resolve_value(None, Some("podman"), "docker"), "podman");
    }

    #[test]
    fn empty_persisted_value_falls_through_to_default() {
        assert_eq!(resolve_value(None, Some(""), "docker"), "docker");
        assert_eq!(resolve_value(None, None, "docker"), "docker");
    }

    #[test]
    fn resolve_config_applies_precedence_per_field() {
        let config = persisted(&[
            ("container_engine", "podman"),
            ("container", "registry.local/deploy:1"),
            ("dockerfile", "ops/Dockerfile"),
        ]);
        let request = DeploymentRequest {
            container: Some("cli/image:2".to_string()),
            ..DeploymentRequest::default()
        };

        let resolved = resolve_config(&request, |key| config.get(key).cloned());
        assert_eq!(resolved.container, "cli/image:2");
        assert_eq!(resolved.container_engine, "podman");
        assert_eq!(resolved.dockerfile, "ops/Dockerfile");
    }

    #[test]
    fn resolve_config_defaults_without_persisted_values() {
        let resolved = resolve_config(&DeploymentRequest::default(), |_| None);
        assert_eq!(resolved.container_engine, DEFAULT_CONTAINER_ENGINE);
        assert_eq!(resolved.container, DEFAULT_CONTAINER);
        assert_eq!(resolved.dockerfile, DEFAULT_DOCKERFILE);
    }

    #[test]
    fn cli_values_survive_any_persisted_content() {
        let noisy = persisted(&[
            ("container_engine", "nerdctl"),
            ("container", "other"),
            ("dockerfile", "other"),
        ]);
        let request = DeploymentRequest {
            container_engine: Some("docker".to_string()),
            container: Some("mine".to_string()),
            dockerfile: Some("Dockerfile".to_string()),
            ..DeploymentRequest::default()
        };

        for lookup_enabled in [true, false] {
            let resolved = resolve_config(&request, |key| {
                lookup_enabled.then(|| noisy.get(key).cloned()).flatten()
            });
            assert_eq!(resolved.container_engine, "docker");
            assert_eq!(resolved.container, "mine");
            assert_eq!(resolved.dockerfile, "Dockerfile");
        }
    }
}
