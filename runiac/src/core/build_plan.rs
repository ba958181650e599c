//! Image build planning.

use crate::core::types::{BuildPlan, ResolvedConfig};

/// Build context passed to the engine; must stay the final argument.
pub const BUILD_CONTEXT: &str = ".";

/// Derive the build invocation for `config`.
///
/// `project_tag` comes from persisted project configuration and becomes the
/// image tag. A configured container reference is passed as the
/// `RUNIAC_CONTAINER` build arg right before the context.
pub fn plan_build(config: &ResolvedConfig, project_tag: &str) -> BuildPlan {
    let mut build_args = Vec::new();
    if !config.container.is_empty() {
        build_args.push("--build-arg".to_string());
        build_args.push(format!("RUNIAC_CONTAINER={}", config.container));
    }
    build_args.push(BUILD_CONTEXT.to_string());

    BuildPlan {
        image_tag: project_tag.to_string(),
        dockerfile_path: config.dockerfile.clone(),
        build_args,
    }
}
