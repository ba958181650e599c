//! CLI tests for `runiac deploy`.
//!
//! Spawns the runiac binary in scratch directories. A shell script stands in
//! for the container engine and records every invocation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use runiac::deploy::UNINITIALIZED_MESSAGE;
use runiac::exit_codes;
use serde_json::Value;

fn deploy_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_runiac"));
    cmd.current_dir(dir)
        .arg("deploy")
        .args(args)
        .env_remove("RUST_LOG");
    cmd
}

fn runiac(dir: &Path, args: &[&str]) -> Output {
    deploy_command(dir, args)
        .stdin(Stdio::null())
        .output()
        .expect("run runiac")
}

/// Run with `input` piped to the binary's stdin.
fn runiac_with_stdin(dir: &Path, args: &[&str], input: &[u8]) -> Output {
    let mut child = deploy_command(dir, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn runiac");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("wait runiac")
}

fn resolved(dir: &Path, args: &[&str]) -> Value {
    let mut all = vec!["--test"];
    all.extend_from_slice(args);
    let output = runiac(dir, &all);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("resolved json")
}

#[test]
fn test_flag_prints_defaults_without_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let value = resolved(temp.path(), &[]);

    assert_eq!(value["container_engine"], "docker");
    assert_eq!(value["container"], "docker.io/runiac/deploy:latest-alpine-full");
    assert_eq!(value["dockerfile"], ".runiac/Dockerfile");
    assert_eq!(value["runner"], "terraform");
}

#[test]
fn persisted_config_fills_unset_flags_only() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("runiac.toml"),
        "project = \"acme\"\ncontainer_engine = \"podman\"\ncontainer = \"cfg/image\"\ndockerfile = \"cfg/Dockerfile\"\n",
    )
    .expect("write config");

    let value = resolved(temp.path(), &["-c", "cli/image", "--steps", "a/x,b/y"]);
    assert_eq!(value["container"], "cli/image");
    assert_eq!(value["container_engine"], "podman");
    assert_eq!(value["dockerfile"], "cfg/Dockerfile");
    assert_eq!(value["step_whitelist"], serde_json::json!(["a/x", "b/y"]));
}

#[test]
fn uninitialized_project_prints_hint_and_exits_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = runiac(temp.path(), &["--container-engine", "/definitely/not/here/docker"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("please add '/definitely/not/here/docker' to the path"));
    assert!(stdout.contains(UNINITIALIZED_MESSAGE));
}

#[cfg(unix)]
mod with_fake_engine {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Engine script: logs `$*` per call, exits `build_exit` for builds.
    fn install(dir: &Path, build_exit: i32) -> (PathBuf, PathBuf) {
        install_with(dir, &format!("if [ \"$1\" = build ]; then exit {build_exit}; fi"))
    }

    /// Engine script: logs `$*` per call, then runs `body`, then exits 0.
    fn install_with(dir: &Path, body: &str) -> (PathBuf, PathBuf) {
        let log = dir.join("engine.log");
        let script = dir.join("fake-engine");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$*\" >> {log}\n{body}\nexit 0\n",
                log = log.display()
            ),
        )
        .expect("write engine");
        let mut perms = fs::metadata(&script).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).expect("chmod");

        fs::write(
            dir.join("runiac.toml"),
            format!(
                "project = \"acme-infra\"\ncontainer_engine = \"{}\"\n",
                script.display()
            ),
        )
        .expect("write config");
        (script, log)
    }

    fn calls(log: &Path) -> Vec<String> {
        fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn pull_request_deploy_builds_then_runs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (_, log) = install(temp.path(), 0);

        let output = runiac(
            temp.path(),
            &["--pull-request", "482", "-p", "us-east-1", "-p", "us-west-2"],
        );
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

        let calls = calls(&log);
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            "build -t acme-infra -f .runiac/Dockerfile --build-arg RUNIAC_CONTAINER=docker.io/runiac/deploy:latest-alpine-full ."
        );
        let run = &calls[1];
        assert!(run.starts_with(
            "run --rm -e RUNIAC_DEPLOYMENT_RING=pr -e RUNIAC_RUNNER=terraform -e RUNIAC_NAMESPACE=482"
        ));
        assert!(run.contains("RUNIAC_PRIMARY_REGION=us-east-1"));
        assert!(!run.contains("RUNIAC_PRIMARY_REGION=us-west-2"));
        assert!(run.ends_with("/.runiac/tfstate:/runiac/tfstate acme-infra"));
    }

    #[test]
    fn failed_build_never_runs_container() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (_, log) = install(temp.path(), 5);

        let output = runiac(temp.path(), &[]);
        assert_eq!(output.status.code(), Some(exit_codes::BUILD_FAILED));
        let calls = calls(&log);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("build "));
    }

    #[test]
    fn quiet_build_failure_logs_captured_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        install_with(
            temp.path(),
            "if [ \"$1\" = build ]; then echo layer-7-missing-dep >&2; exit 2; fi",
        );

        let output = runiac(temp.path(), &["--dockerfile", ""]);
        assert_eq!(output.status.code(), Some(exit_codes::BUILD_FAILED));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!stdout.contains("layer-7-missing-dep"));
        assert!(stderr.contains("layer-7-missing-dep"), "stderr: {stderr}");
    }

    #[test]
    fn run_stage_receives_caller_stdin() {
        let temp = tempfile::tempdir().expect("tempdir");
        let received = temp.path().join("stdin.txt");
        install_with(
            temp.path(),
            &format!(
                "if [ \"$1\" = run ]; then cat > {}; fi",
                received.display()
            ),
        );

        let output = runiac_with_stdin(temp.path(), &[], b"terraform-approve");
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(fs::read_to_string(&received).expect("read stdin copy"), "terraform-approve");
    }
}
