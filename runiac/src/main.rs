//! runiac command line.
//!
//! `runiac deploy` builds the project deploy image and runs it. Flags map onto
//! a single [`DeploymentRequest`]; config-backed flags stay `None` when not
//! given so `runiac.toml` can fill them in.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use runiac::core::types::{DEFAULT_RUNNER, DeploymentRequest};
use runiac::deploy::{DeployOptions, DeployOutcome, Workspace, deploy};
use runiac::error::{Stage, stage_failure};
use runiac::exit_codes;
use runiac::io::engine::CliEngine;
use runiac::io::process::DEFAULT_OUTPUT_LIMIT_BYTES;
use runiac::logging;

#[derive(Parser)]
#[command(
    name = "runiac",
    version,
    about = "Run infrastructure deploys inside a container"
)]
struct Cli {
    /// Project config file (defaults to `runiac.toml` in the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the project container and execute the deploy action for each step.
    Deploy(DeployArgs),
}

#[derive(Args, Debug)]
struct DeployArgs {
    /// Version of the iac code.
    #[arg(short = 'v', long = "version", default_value = "")]
    app_version: String,

    /// Targeted environment.
    #[arg(short, long, default_value = "")]
    environment: String,

    /// Targeted cloud account (azure subscription, gcp project or aws account).
    #[arg(short, long, default_value = "")]
    account: String,

    /// Primary regions. Only the first is passed to the deploy container.
    #[arg(short, long = "primary-regions")]
    primary_regions: Vec<String>,

    /// Regions the ./regional directory is deployed across concurrently.
    #[arg(short, long = "regional-regions")]
    regional_regions: Vec<String>,

    #[arg(long)]
    dry_run: bool,

    /// Teardown after running deploy.
    #[arg(long)]
    self_destroy: bool,

    #[arg(long, default_value = "")]
    log_level: String,

    /// Run the deploy container in interactive mode.
    #[arg(long)]
    interactive: bool,

    /// Base deploy container [default: docker.io/runiac/deploy:latest-alpine-full].
    #[arg(short, long)]
    container: Option<String>,

    /// The deployment ring to configure.
    #[arg(short, long, default_value = "")]
    deployment_ring: String,

    /// Isolate the deploy to the executing machine (ring `local`).
    #[arg(long)]
    local: bool,

    /// The deployment tool used inside the container.
    #[arg(long, default_value = DEFAULT_RUNNER)]
    runner: String,

    /// Only run these steps (`track/step`), comma separated.
    #[arg(short, long = "steps", value_delimiter = ',')]
    steps: Vec<String>,

    /// Isolate the deploy to a pull request (ring `pr`).
    #[arg(long, default_value = "")]
    pull_request: String,

    /// Dockerfile to build, deriving from runiac/deploy [default: .runiac/Dockerfile].
    #[arg(short = 'f', long)]
    dockerfile: Option<String>,

    /// Container engine, e.g. podman or docker [default: docker].
    #[arg(long)]
    container_engine: Option<String>,

    /// Resolve configuration, print it, and exit without building.
    #[arg(long, hide = true)]
    test: bool,
}

impl DeployArgs {
    fn into_request(self) -> (DeploymentRequest, bool) {
        let request = DeploymentRequest {
            version: self.app_version,
            environment: self.environment,
            account: self.account,
            primary_regions: self.primary_regions,
            regional_regions: self.regional_regions,
            dry_run: self.dry_run,
            self_destroy: self.self_destroy,
            log_level: self.log_level,
            interactive: self.interactive,
            container: self.container,
            dockerfile: self.dockerfile,
            container_engine: self.container_engine,
            deployment_ring: self.deployment_ring,
            local: self.local,
            pull_request: self.pull_request,
            runner: self.runner,
            step_whitelist: self.steps,
        };
        (request, self.test)
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Deploy(args) => cmd_deploy(args, cli.config),
    }
}

fn cmd_deploy(args: DeployArgs, config: Option<PathBuf>) -> Result<()> {
    let (request, resolve_only) = args.into_request();
    let workspace = Workspace::from_process(config)?;
    let options = DeployOptions { resolve_only };

    let outcome = deploy(&request, &workspace, &options, |resolved| {
        CliEngine::new(
            resolved.container_engine.clone(),
            workspace.workdir.clone(),
            DEFAULT_OUTPUT_LIMIT_BYTES,
        )
    })?;

    if let DeployOutcome::Resolved(resolved) = outcome {
        let payload = serde_json::to_string_pretty(&resolved).context("serialize resolved config")?;
        println!("{payload}");
    }
    Ok(())
}

/// Map a fatal error to the process exit code.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match stage_failure(err) {
        Some(failure) if failure.stage == Stage::Build => exit_codes::BUILD_FAILED,
        Some(failure) => match failure.code {
            Some(code) if code != 0 => code,
            _ => exit_codes::RUN_FAILED,
        },
        None => exit_codes::INVALID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use runiac::error::StageFailure;

    fn parse_deploy(args: &[&str]) -> DeployArgs {
        let cli = Cli::parse_from(["runiac", "deploy"].iter().chain(args));
        match cli.command {
            Command::Deploy(args) => args,
        }
    }

    #[test]
    fn config_backed_flags_default_to_unset() {
        let (request, test) = parse_deploy(&[]).into_request();
        assert_eq!(request.container, None);
        assert_eq!(request.dockerfile, None);
        assert_eq!(request.container_engine, None);
        assert_eq!(request.runner, "terraform");
        assert!(!test);
    }

    #[test]
    fn short_flags_map_to_request_fields() {
        let (request, _) = parse_deploy(&[
            "-v", "1.2.3", "-e", "prod", "-a", "42", "-p", "us-east-1", "-p", "us-west-2", "-r",
            "eu-west-1", "-c", "my/image", "-d", "canary", "-s", "t/a,t/b", "-f", "Dockerfile",
        ])
        .into_request();

        assert_eq!(request.version, "1.2.3");
        assert_eq!(request.environment, "prod");
        assert_eq!(request.account, "42");
        assert_eq!(request.primary_regions, vec!["us-east-1", "us-west-2"]);
        assert_eq!(request.regional_regions, vec!["eu-west-1"]);
        assert_eq!(request.container.as_deref(), Some("my/image"));
        assert_eq!(request.deployment_ring, "canary");
        assert_eq!(request.step_whitelist, vec!["t/a", "t/b"]);
        assert_eq!(request.dockerfile.as_deref(), Some("Dockerfile"));
    }

    #[test]
    fn long_flags_and_hidden_test() {
        let (request, test) = parse_deploy(&[
            "--local",
            "--pull-request",
            "482",
            "--dry-run",
            "--self-destroy",
            "--interactive",
            "--container-engine",
            "podman",
            "--runner",
            "pulumi",
            "--log-level",
            "debug",
            "--test",
        ])
        .into_request();

        assert!(request.local && request.dry_run && request.self_destroy && request.interactive);
        assert_eq!(request.pull_request, "482");
        assert_eq!(request.container_engine.as_deref(), Some("podman"));
        assert_eq!(request.runner, "pulumi");
        assert_eq!(request.log_level, "debug");
        assert!(test);
    }

    #[test]
    fn exit_codes_follow_failing_stage() {
        let build = anyhow!(StageFailure::new(Stage::Build, Some(1)));
        assert_eq!(exit_code_for(&build), exit_codes::BUILD_FAILED);

        let run = anyhow!(StageFailure::new(Stage::Run, Some(17)));
        assert_eq!(exit_code_for(&run), 17);

        let killed = anyhow!(StageFailure::new(Stage::Run, None));
        assert_eq!(exit_code_for(&killed), exit_codes::RUN_FAILED);

        assert_eq!(exit_code_for(&anyhow!("bad config")), exit_codes::INVALID);
    }
}
