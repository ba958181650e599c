//! Helpers for running engine child processes with bounded output capture.
//!
//! Both helpers block until the child exits; there is no timeout. An interrupt
//! reaches the child through the shared process group.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

use crate::io::tee::{CaptureBuffer, Tee};

pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
}

impl CommandOutput {
    /// Stdout followed by stderr, lossily decoded, with truncation notices.
    pub fn combined_lossy(&self) -> String {
        let mut buf = String::from_utf8_lossy(&self.stdout).into_owned();
        if self.stdout_truncated > 0 {
            buf.push_str(&format!("\n[stdout truncated {} bytes]\n", self.stdout_truncated));
        }
        buf.push_str(&String::from_utf8_lossy(&self.stderr));
        if self.stderr_truncated > 0 {
            buf.push_str(&format!("\n[stderr truncated {} bytes]\n", self.stderr_truncated));
        }
        buf
    }
}

/// Where the child's stdin comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinMode {
    Inherit,
    Null,
}

/// Run a command, mirroring stdout/stderr to the console while capturing them.
///
/// Each stream is pumped by its own reader thread into a [`Tee`] of the
/// console and a [`CaptureBuffer`] bounded by `output_limit_bytes`.
#[instrument(skip_all, fields(output_limit_bytes, stdin = ?stdin))]
pub fn run_streamed(
    mut cmd: Command,
    stdin: StdinMode,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(match stdin {
        StdinMode::Inherit => Stdio::inherit(),
        StdinMode::Null => Stdio::null(),
    });
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle =
        thread::spawn(move || pump_tee(stdout, io::stdout(), output_limit_bytes));
    let stderr_handle =
        thread::spawn(move || pump_tee(stderr, io::stderr(), output_limit_bytes));

    let status = child.wait().context("wait for command")?;
    finish(status, stdout_handle, stderr_handle)
}

/// Run a command without console output, capturing stdout/stderr.
#[instrument(skip_all, fields(output_limit_bytes))]
pub fn run_captured(mut cmd: Command, output_limit_bytes: usize) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || pump_capture(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || pump_capture(stderr, output_limit_bytes));

    let status = child.wait().context("wait for command")?;
    finish(status, stdout_handle, stderr_handle)
}

type PumpHandle = thread::JoinHandle<Result<(Vec<u8>, usize)>>;

fn finish(
    status: ExitStatus,
    stdout_handle: PumpHandle,
    stderr_handle: PumpHandle,
) -> Result<CommandOutput> {
    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "captured output truncated");
    }

    debug!(exit_code = ?status.code(), "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
    })
}

fn join_output(handle: PumpHandle) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn pump_tee<R: Read, W: Write>(
    mut reader: R,
    mut console: W,
    limit: usize,
) -> Result<(Vec<u8>, usize)> {
    let mut capture = CaptureBuffer::new(limit);
    {
        let mut tee = Tee::new(vec![&mut console as &mut dyn Write, &mut capture]);
        io::copy(&mut reader, &mut tee).context("stream output")?;
    }
    Ok(capture.into_parts())
}

fn pump_capture<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut capture = CaptureBuffer::new(limit);
    io::copy(&mut reader, &mut capture).context("read output")?;
    Ok(capture.into_parts())
}
