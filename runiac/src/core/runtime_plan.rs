//! Container run planning.
//!
//! Env flags follow a fixed order for readable logs; engines treat `-e` flags
//! as a set, so the order carries no meaning.

use std::path::Path;

use crate::core::types::{
    BuildPlan, EnvFlag, ForwardedVar, Identity, ResolvedConfig, RuntimePlan, VolumeMount,
};

/// Host paths (relative to the working directory) persisted across runs.
pub const VOLUME_BINDINGS: [(&str, &str); 4] = [
    // azure cli
    (".runiac/.azure", "/root/.azure"),
    // gcloud cli
    (".runiac/.config/gcloud", "/root/.config/gcloud"),
    // aws cli
    (".runiac/.aws", "/root/.aws"),
    // local terraform state
    (".runiac/tfstate", "/runiac/tfstate"),
];

/// Env flags for the run, skipping empty values.
///
/// Only the first primary region is emitted; the container reads a single
/// `RUNIAC_PRIMARY_REGION`.
pub fn env_flags(config: &ResolvedConfig, identity: &Identity) -> Vec<EnvFlag> {
    let candidates = [
        ("DEPLOYMENT_RING", identity.ring.clone()),
        ("RUNNER", config.runner.clone()),
        ("NAMESPACE", identity.namespace.clone()),
        ("VERSION", config.version.clone()),
        ("ENVIRONMENT", config.environment.clone()),
        ("DRY_RUN", config.dry_run.to_string()),
        ("SELF_DESTROY", config.self_destroy.to_string()),
        ("STEP_WHITELIST", config.step_whitelist.join(",")),
        (
            "PRIMARY_REGION",
            config.primary_regions.first().cloned().unwrap_or_default(),
        ),
        ("REGIONAL_REGIONS", config.regional_regions.join(",")),
        ("ACCOUNT_ID", config.account.clone()),
        ("LOG_LEVEL", config.log_level.clone()),
    ];

    candidates
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| EnvFlag { name, value })
        .collect()
}

pub fn volume_mounts(workdir: &Path) -> Vec<VolumeMount> {
    VOLUME_BINDINGS
        .into_iter()
        .map(|(host, container)| VolumeMount {
            host: workdir.join(host),
            container,
        })
        .collect()
}

/// Derive the run invocation. The image tag is always the built one.
pub fn plan_runtime(
    config: &ResolvedConfig,
    identity: &Identity,
    forwarded: Vec<ForwardedVar>,
    workdir: &Path,
    build: &BuildPlan,
) -> RuntimePlan {
    RuntimePlan {
        env_flags: env_flags(config, identity),
        forwarded_env: forwarded,
        volume_mounts: volume_mounts(workdir),
        interactive: config.interactive,
        image_tag: build.image_tag.clone(),
    }
}
