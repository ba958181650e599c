//! Container engine abstraction.
//!
//! The [`ContainerEngine`] trait decouples deploy orchestration from the engine
//! binary (`docker`, `podman`, ...). Tests use scripted engines that record
//! invocations without spawning processes.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::{error, info, instrument, warn};

use crate::core::types::{BuildPlan, RuntimePlan};
use crate::error::{Stage, StageFailure};
use crate::io::process::{StdinMode, run_captured, run_streamed};
use crate::io::progress::Spinner;

const BUILDKIT_ENV: (&str, &str) = ("DOCKER_BUILDKIT", "1");

/// The two engine invocations a deploy needs.
///
/// Both block until the child exits. A non-zero exit or launch failure must be
/// reported as an error carrying a [`StageFailure`].
pub trait ContainerEngine {
    fn build(&self, plan: &BuildPlan) -> Result<()>;
    fn run(&self, plan: &RuntimePlan) -> Result<()>;
}

impl<T: ContainerEngine + ?Sized> ContainerEngine for &T {
    fn build(&self, plan: &BuildPlan) -> Result<()> {
        (**self).build(plan)
    }

    fn run(&self, plan: &RuntimePlan) -> Result<()> {
        (**self).run(plan)
    }
}

/// Engine driven through its command line.
pub struct CliEngine {
    program: String,
    workdir: PathBuf,
    output_limit_bytes: usize,
}

impl CliEngine {
    pub fn new(
        program: impl Into<String>,
        workdir: impl Into<PathBuf>,
        output_limit_bytes: usize,
    ) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            output_limit_bytes,
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(&self.workdir)
            .env(BUILDKIT_ENV.0, BUILDKIT_ENV.1);
        cmd
    }
}

impl ContainerEngine for CliEngine {
    #[instrument(skip_all, fields(engine = %self.program, tag = %plan.image_tag, streaming = plan.streams_output()))]
    fn build(&self, plan: &BuildPlan) -> Result<()> {
        let args = plan.args();
        info!("{} {}", self.program, args.join(" "));
        let cmd = self.command(&args);

        if plan.streams_output() {
            let output = run_streamed(cmd, StdinMode::Null, self.output_limit_bytes)
                .context(StageFailure::new(Stage::Build, None))?;
            if !output.status.success() {
                error!(dockerfile = %plan.dockerfile_path, "failed to build");
                return Err(anyhow!(StageFailure::new(Stage::Build, output.status.code())));
            }
            return Ok(());
        }

        let spinner = Spinner::start("Building project container...");
        let result = run_captured(cmd, self.output_limit_bytes);
        spinner.stop();
        let output = result.context(StageFailure::new(Stage::Build, None))?;
        if !output.status.success() {
            error!("{}", output.combined_lossy());
            return Err(anyhow!(StageFailure::new(Stage::Build, output.status.code())));
        }
        Ok(())
    }

    #[instrument(skip_all, fields(engine = %self.program, tag = %plan.image_tag))]
    fn run(&self, plan: &RuntimePlan) -> Result<()> {
        info!("{} {}", self.program, plan.display_args().join(" "));
        let cmd = self.command(&plan.args());

        let output = run_streamed(cmd, StdinMode::Inherit, self.output_limit_bytes)
            .context(StageFailure::new(Stage::Run, None))?;
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "deploy container failed");
            return Err(anyhow!(StageFailure::new(Stage::Run, output.status.code())));
        }
        Ok(())
    }
}

/// Locate `program` the way the OS would on `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return is_executable_file(direct).then(|| direct.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        candidate_names(program)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| is_executable_file(candidate))
    })
}

/// Warn when the engine binary cannot be found. Never fails: the build step
/// surfaces the real problem.
pub fn check_engine_on_path(program: &str) {
    if find_on_path(program).is_none() {
        println!("please add '{program}' to the path");
        warn!(engine = program, "container engine not found on PATH");
    }
}

fn candidate_names(program: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(program).extension().is_none() {
        vec![format!("{program}.exe"), program.to_string()]
    } else {
        vec![program.to_string()]
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
