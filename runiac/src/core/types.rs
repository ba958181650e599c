//! Shared deterministic types for deploy planning.
//!
//! Every value here is built fresh for one orchestration and dropped once the
//! container run returns. Nothing is shared between runs.

use std::path::PathBuf;

use serde::Serialize;

/// Published deploy image used as the base when `--container` is unset.
pub const DEFAULT_CONTAINER: &str = "docker.io/runiac/deploy:latest-alpine-full";
/// In-project Dockerfile generated by `runiac init`.
pub const DEFAULT_DOCKERFILE: &str = ".runiac/Dockerfile";
pub const DEFAULT_CONTAINER_ENGINE: &str = "docker";
pub const DEFAULT_RUNNER: &str = "terraform";

/// Raw options supplied by the invoker for a single deploy.
///
/// Config-backed fields are `None` when the flag was not given on the command
/// line, so persisted configuration can fill them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub version: String,
    pub environment: String,
    pub account: String,
    pub primary_regions: Vec<String>,
    pub regional_regions: Vec<String>,
    pub dry_run: bool,
    pub self_destroy: bool,
    pub log_level: String,
    pub interactive: bool,
    pub container: Option<String>,
    pub dockerfile: Option<String>,
    pub container_engine: Option<String>,
    pub deployment_ring: String,
    pub local: bool,
    pub pull_request: String,
    pub runner: String,
    pub step_whitelist: Vec<String>,
}

/// A request whose config-backed fields have been settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub version: String,
    pub environment: String,
    pub account: String,
    pub primary_regions: Vec<String>,
    pub regional_regions: Vec<String>,
    pub dry_run: bool,
    pub self_destroy: bool,
    pub log_level: String,
    pub interactive: bool,
    pub container: String,
    pub dockerfile: String,
    pub container_engine: String,
    pub deployment_ring: String,
    pub local: bool,
    pub pull_request: String,
    pub runner: String,
    pub step_whitelist: Vec<String>,
}

/// Isolation scope for one run.
///
/// Empty strings mean "not set"; the matching env flag is then omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub namespace: String,
    pub ring: String,
}

/// Arguments for the image build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub image_tag: String,
    pub dockerfile_path: String,
    /// Trailing build arguments; always ends with the `.` build context.
    pub build_args: Vec<String>,
}

impl BuildPlan {
    /// Full argument vector passed to the engine program.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string(), "-t".to_string(), self.image_tag.clone()];
        if !self.dockerfile_path.is_empty() {
            args.push("-f".to_string());
            args.push(self.dockerfile_path.clone());
        }
        args.extend(self.build_args.iter().cloned());
        args
    }

    /// Streamed builds show engine output live; quiet builds show a spinner.
    pub fn streams_output(&self) -> bool {
        !self.dockerfile_path.is_empty()
    }
}

/// One `-e RUNIAC_<NAME>=<value>` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFlag {
    pub name: &'static str,
    pub value: String,
}

impl EnvFlag {
    pub fn assignment(&self) -> String {
        format!("RUNIAC_{}={}", self.name, self.value)
    }
}

/// An ambient variable passed through to the container unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedVar {
    pub name: String,
    /// `NAME=value` as it appeared in the environment.
    pub assignment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host: PathBuf,
    pub container: &'static str,
}

impl VolumeMount {
    pub fn binding(&self) -> String {
        format!("{}:{}", self.host.display(), self.container)
    }
}

/// Arguments for the container run invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePlan {
    pub env_flags: Vec<EnvFlag>,
    pub forwarded_env: Vec<ForwardedVar>,
    pub volume_mounts: Vec<VolumeMount>,
    pub interactive: bool,
    pub image_tag: String,
}

impl RuntimePlan {
    /// Full argument vector passed to the engine program.
    pub fn args(&self) -> Vec<String> {
        self.render(|var| var.assignment.clone())
    }

    /// Argument vector safe for logs: forwarded values are masked.
    pub fn display_args(&self) -> Vec<String> {
        self.render(|var| format!("{}=***", var.name))
    }

    fn render(&self, forwarded: impl Fn(&ForwardedVar) -> String) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];
        for flag in &self.env_flags {
            args.push("-e".to_string());
            args.push(flag.assignment());
        }
        if self.interactive {
            args.push("-it".to_string());
        }
        for var in &self.forwarded_env {
            args.push("-e".to_string());
            args.push(forwarded(var));
        }
        for mount in &self.volume_mounts {
            args.push("-v".to_string());
            args.push(mount.binding());
        }
        args.push(self.image_tag.clone());
        args
    }
}
