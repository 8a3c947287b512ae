// src/exec/shell.rs

//! Shell process runner.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` to completion on behalf of `owner` (a task or hook name).
///
/// stdout is logged at info, stderr at debug. A non-zero exit status is an
/// error carrying the exit code.
pub fn run_shell(owner: &str, cmd: &str) -> Result<()> {
    info!(task = %owner, cmd = %cmd, "starting process");

    let mut child = shell_command(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning process for '{owner}'"))?;

    // Always consume stderr so buffers don't fill.
    let stderr_reader = child.stderr.take().map(|stderr| {
        let owner = owner.to_string();
        thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                debug!(task = %owner, "stderr: {}", line);
            }
        })
    });

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
            info!(task = %owner, "{}", line);
        }
    }

    let status = child
        .wait()
        .with_context(|| format!("waiting for process of '{owner}'"))?;

    if let Some(handle) = stderr_reader {
        if handle.join().is_err() {
            warn!(task = %owner, "stderr reader panicked");
        }
    }

    let code = status.code().unwrap_or(-1);
    info!(task = %owner, exit_code = code, success = status.success(), "process exited");

    if !status.success() {
        bail!("command `{cmd}` of '{owner}' exited with status {code}");
    }
    Ok(())
}
