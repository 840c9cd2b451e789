//! External program execution with stdin feeding and timeout.

use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;
use verity_core::{CommandLine, CompareError, ExecutionSpec, InputSource, StdinHandle, METRICS};

/// Run `spec` with a fresh handle from `input` as stdin and return its stdout.
///
/// - Argument vectors are executed directly; shell strings go through
///   `sh -c` (`cmd /C` on Windows).
/// - On timeout the child and every process in its group are killed and
///   `ExecutionTimeout` is returned.
/// - Launch failure or a nonzero exit status yields `Execution`.
///
/// Stdout is decoded lossily as UTF-8 with `\r\n` folded to `\n`.
pub async fn execute(spec: &ExecutionSpec, input: &dyn InputSource) -> Result<String, CompareError> {
    let label = spec.label();

    let stdin = input.open_stdin().map_err(|e| CompareError::Execution {
        command: label.clone(),
        cause: format!("failed to open input {}: {}", input.describe(), e),
    })?;

    let mut cmd = build_command(&spec.command).ok_or_else(|| CompareError::Execution {
        command: label.clone(),
        cause: "empty command".to_string(),
    })?;
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a timeout reaches everything a shell started.
    #[cfg(unix)]
    cmd.process_group(0);

    let payload = match stdin {
        StdinHandle::File(file) => {
            cmd.stdin(Stdio::from(file));
            None
        }
        StdinHandle::Bytes(bytes) => {
            cmd.stdin(Stdio::piped());
            Some(bytes)
        }
    };

    let mut child = cmd.spawn().map_err(|e| CompareError::Execution {
        command: label.clone(),
        cause: format!("failed to launch: {}", e),
    })?;
    METRICS.inc_processes_spawned();
    let pid = child.id();
    debug!(command = %label, pid = ?pid, "Spawned process");

    // Write from a separate task so a large input cannot block on a full
    // stdout pipe. Dropping the pipe closes the child's stdin.
    let writer = match (payload, child.stdin.take()) {
        (Some(bytes), Some(mut pipe)) => {
            let command = label.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = pipe.write_all(&bytes).await {
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        debug!(command = %command, error = %e, "Failed to write stdin");
                    }
                }
            }))
        }
        _ => None,
    };

    let wait = child.wait_with_output();
    let output = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                // kill_on_drop took the direct child with the dropped future.
                if let Some(pid) = pid {
                    kill_process_group(&label, pid);
                }
                if let Some(writer) = writer {
                    writer.abort();
                }
                METRICS.inc_timeouts();
                return Err(CompareError::ExecutionTimeout {
                    command: label,
                    timeout: limit,
                });
            }
        },
        None => wait.await,
    }
    .map_err(|e| CompareError::Execution {
        command: label.clone(),
        cause: format!("failed to collect output: {}", e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CompareError::Execution {
            command: label,
            cause: describe_exit(output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n"))
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(command: &str, pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => {
            tracing::warn!(command = %command, pid = pid, error = %e, "Failed to kill process group")
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_command: &str, _pid: u32) {}

fn build_command(command: &CommandLine) -> Option<Command> {
    match command {
        CommandLine::Argv(args) => {
            let (exe, rest) = args.split_first()?;
            let mut cmd = Command::new(exe);
            cmd.args(rest);
            Some(cmd)
        }
        CommandLine::Shell(line) => {
            if line.trim().is_empty() {
                return None;
            }
            let mut cmd = shell();
            cmd.arg(line);
            Some(cmd)
        }
    }
}

#[cfg(windows)]
fn shell() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C");
    cmd
}

#[cfg(not(windows))]
fn shell() -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd
}

fn describe_exit(status: ExitStatus, stderr: &str) -> String {
    if stderr.is_empty() {
        format!("{}", status)
    } else {
        format!("{}: {}", status, stderr)
    }
}
