//! Test-only helpers: scripted engines, fixed user names, scratch workspaces.

use std::cell::RefCell;
use std::fs;

use anyhow::{Result, anyhow};

use crate::core::identity::UsernameSource;
use crate::core::types::{
    BuildPlan, DEFAULT_CONTAINER, DEFAULT_CONTAINER_ENGINE, DEFAULT_DOCKERFILE, DEFAULT_RUNNER,
    ResolvedConfig, RuntimePlan,
};
use crate::deploy::Workspace;
use crate::error::{Stage, StageFailure};
use crate::io::config::CONFIG_FILE;
use crate::io::engine::ContainerEngine;

/// Resolved config with defaults and every optional value empty.
pub fn resolved_config() -> ResolvedConfig {
    ResolvedConfig {
        version: String::new(),
        environment: String::new(),
        account: String::new(),
        primary_regions: Vec::new(),
        regional_regions: Vec::new(),
        dry_run: false,
        self_destroy: false,
        log_level: String::new(),
        interactive: false,
        container: DEFAULT_CONTAINER.to_string(),
        dockerfile: DEFAULT_DOCKERFILE.to_string(),
        container_engine: DEFAULT_CONTAINER_ENGINE.to_string(),
        deployment_ring: String::new(),
        local: false,
        pull_request: String::new(),
        runner: DEFAULT_RUNNER.to_string(),
        step_whitelist: Vec::new(),
    }
}

/// Username source returning a fixed answer.
pub struct FixedUsername {
    label: String,
    name: Option<String>,
}

impl FixedUsername {
    pub fn new(label: &str, name: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            name: name.map(str::to_string),
        }
    }
}

impl UsernameSource for FixedUsername {
    fn label(&self) -> &str {
        &self.label
    }

    fn username(&self) -> Option<String> {
        self.name.clone()
    }
}

/// A recorded engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Build(BuildPlan),
    Run(RuntimePlan),
}

/// Engine returning scripted results and recording every call.
///
/// `Err(code)` turns into a [`StageFailure`] with that exit code.
pub struct ScriptedEngine {
    build: Result<(), Option<i32>>,
    run: Result<(), Option<i32>>,
    calls: RefCell<Vec<EngineCall>>,
}

impl ScriptedEngine {
    pub fn new(build: Result<(), Option<i32>>, run: Result<(), Option<i32>>) -> Self {
        Self {
            build,
            run,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Ok(()), Ok(()))
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    pub fn run_plan(&self) -> Option<RuntimePlan> {
        self.calls.borrow().iter().find_map(|call| match call {
            EngineCall::Run(plan) => Some(plan.clone()),
            EngineCall::Build(_) => None,
        })
    }
}

impl ContainerEngine for ScriptedEngine {
    fn build(&self, plan: &BuildPlan) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Build(plan.clone()));
        self.build
            .map_err(|code| anyhow!(StageFailure::new(Stage::Build, code)))
    }

    fn run(&self, plan: &RuntimePlan) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Run(plan.clone()));
        self.run
            .map_err(|code| anyhow!(StageFailure::new(Stage::Run, code)))
    }
}

/// Scratch workspace rooted in a temp directory.
///
/// The directory lives as long as this value.
pub struct TestWorkspace {
    _temp: tempfile::TempDir,
    pub workspace: Workspace,
}

impl TestWorkspace {
    /// Workspace with no `runiac.toml`.
    pub fn empty() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let workdir = temp.path().to_path_buf();
        let workspace = Workspace {
            config_path: workdir.join(CONFIG_FILE),
            workdir,
            ambient_env: Vec::new(),
            username_sources: vec![Box::new(FixedUsername::new("fixed", Some("tester")))],
        };
        Ok(Self {
            _temp: temp,
            workspace,
        })
    }

    /// Workspace whose `runiac.toml` names `project`.
    pub fn initialized(project: &str) -> Result<Self> {
        Self::with_config(&format!("project = \"{project}\"\n"))
    }

    /// Workspace with arbitrary `runiac.toml` contents.
    pub fn with_config(contents: &str) -> Result<Self> {
        let ws = Self::empty()?;
        fs::write(&ws.workspace.config_path, contents)?;
        Ok(ws)
    }
}
