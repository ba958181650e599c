//! Orchestration for `runiac deploy`.
//!
//! A deploy is two blocking engine invocations: build the project image, then
//! run it with the assembled runtime environment. Any failure ends the deploy;
//! nothing is retried and the run stage is never planned after a failed build.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::build_plan::plan_build;
use crate::core::forward::select_forwardable;
use crate::core::identity::{UsernameSource, resolve_identity};
use crate::core::resolve::resolve_config;
use crate::core::runtime_plan::plan_runtime;
use crate::core::types::{DeploymentRequest, Identity, ResolvedConfig};
use crate::io::config::{CONFIG_FILE, ProjectConfig, load_config};
use crate::io::engine::{ContainerEngine, check_engine_on_path};
use crate::io::username::default_sources;

pub const UNINITIALIZED_MESSAGE: &str =
    "You need to run 'runiac init' before you can use the CLI in this directory";

/// Deploy progress. `Failed` is terminal and reachable from the config load
/// and from any stage that spawns a process or resolves identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ConfigResolved,
    ImageBuilding,
    ImageBuilt,
    IdentityResolved,
    ContainerRunning,
    Done,
    Failed,
}

/// Process surroundings a deploy reads from.
pub struct Workspace {
    /// Working directory; volume mounts are rooted here.
    pub workdir: PathBuf,
    pub config_path: PathBuf,
    /// Snapshot of the ambient environment, in process order.
    pub ambient_env: Vec<(String, String)>,
    pub username_sources: Vec<Box<dyn UsernameSource>>,
}

impl Workspace {
    /// Workspace for the current process.
    pub fn from_process(config_path: Option<PathBuf>) -> Result<Self> {
        let workdir = std::env::current_dir().context("read working directory")?;
        let config_path = config_path.unwrap_or_else(|| workdir.join(CONFIG_FILE));
        let ambient_env = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Ok(Self {
            workdir,
            config_path,
            ambient_env,
            username_sources: default_sources(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Stop after resolving configuration; nothing is spawned.
    pub resolve_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// `resolve_only` was set.
    Resolved(ResolvedConfig),
    /// No `runiac.toml` with a project; nothing was spawned.
    Uninitialized,
    /// Build and run both exited zero.
    Completed { identity: Identity },
}

/// Tracks the deploy phase and logs each transition.
struct Orchestrator {
    phase: Phase,
}

impl Orchestrator {
    fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    fn advance(&mut self, next: Phase) {
        debug!(from = ?self.phase, to = ?next, "deploy phase");
        self.phase = next;
    }

    /// Mark the deploy failed if `result` is an error.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.advance(Phase::Failed);
        }
        result
    }
}

/// Resolve configuration, build, then run.
///
/// `make_engine` receives the resolved configuration so the engine program
/// honours `--container-engine` and persisted `container_engine`.
#[instrument(skip_all, fields(workdir = %workspace.workdir.display()))]
pub fn deploy<E, F>(
    request: &DeploymentRequest,
    workspace: &Workspace,
    options: &DeployOptions,
    make_engine: F,
) -> Result<DeployOutcome>
where
    E: ContainerEngine,
    F: FnOnce(&ResolvedConfig) -> E,
{
    let mut orchestrator = Orchestrator::new();

    let loaded = load_config(&workspace.config_path);
    let project = orchestrator.guard(loaded)?;
    let persisted = project.clone().unwrap_or_default();
    let resolved = resolve_config(request, |key| persisted.get(key));
    orchestrator.advance(Phase::ConfigResolved);
    debug!(
        engine = %resolved.container_engine,
        container = %resolved.container,
        dockerfile = %resolved.dockerfile,
        "configuration resolved"
    );

    if options.resolve_only {
        return Ok(DeployOutcome::Resolved(resolved));
    }

    check_engine_on_path(&resolved.container_engine);

    let Some(project) = project.filter(ProjectConfig::is_initialized) else {
        println!("{UNINITIALIZED_MESSAGE}");
        return Ok(DeployOutcome::Uninitialized);
    };

    let engine = make_engine(&resolved);

    let build = plan_build(&resolved, &project.project);
    orchestrator.advance(Phase::ImageBuilding);
    let built = engine.build(&build);
    orchestrator.guard(built)?;
    orchestrator.advance(Phase::ImageBuilt);
    info!("Completed build, lets run!");

    let identity = resolve_identity(
        resolved.local,
        &resolved.pull_request,
        &resolved.deployment_ring,
        &workspace.username_sources,
    );
    let identity = orchestrator.guard(identity)?;
    orchestrator.advance(Phase::IdentityResolved);
    debug!(namespace = %identity.namespace, ring = %identity.ring, "identity resolved");

    let forwarded = select_forwardable(workspace.ambient_env.iter().cloned());
    let runtime = plan_runtime(&resolved, &identity, forwarded, &workspace.workdir, &build);
    orchestrator.advance(Phase::ContainerRunning);
    let ran = engine.run(&runtime);
    orchestrator.guard(ran)?;
    orchestrator.advance(Phase::Done);

    Ok(DeployOutcome::Completed { identity })
}
