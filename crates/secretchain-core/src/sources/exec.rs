//! Subprocess execution honoring a cancellation token

use std::ffi::OsStr;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::types::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where the child's stderr goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stderr {
    Inherit,
    Discard,
}

#[derive(Error, Debug)]
pub(crate) enum ExecError {
    #[error("{command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: {status}")]
    Failed { command: String, status: ExitStatus },

    #[error("{command}: cancelled")]
    Cancelled { command: String },
}

/// Run `program` with `args` and return its stdout
///
/// The child runs in its own process group. The whole group is killed as
/// soon as `ctx` is cancelled or its deadline passes, so background
/// commands it started go down with it. stdin is closed.
pub(crate) fn run<S: AsRef<OsStr>>(
    ctx: &CancellationToken,
    program: impl AsRef<OsStr>,
    args: &[S],
    stderr: Stderr,
) -> Result<Vec<u8>, ExecError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(match stderr {
            Stderr::Inherit => Stdio::inherit(),
            Stderr::Discard => Stdio::null(),
        });
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let command = format!("{:?}", cmd);

    crate::debug_log!("executing command: {}", command);

    if ctx.is_cancelled() {
        return Err(ExecError::Cancelled { command });
    }

    let mut child = cmd.spawn().map_err(|source| ExecError::Io {
        command: command.clone(),
        source,
    })?;

    let mut stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => {
            kill(&mut child);
            return Err(ExecError::Io {
                command,
                source: io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"),
            });
        }
    };

    // Drain stdout concurrently so a chatty child cannot block on a full pipe
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let output = reader
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdout reader panicked")))
                    .map_err(|source| ExecError::Io {
                        command: command.clone(),
                        source,
                    })?;
                if !status.success() {
                    return Err(ExecError::Failed { command, status });
                }
                return Ok(output);
            }
            Ok(None) => {}
            Err(source) => {
                kill(&mut child);
                return Err(ExecError::Io { command, source });
            }
        }

        if ctx.is_cancelled() {
            kill(&mut child);
            // Not joined: a descendant that left the process group may still
            // hold the pipe open.
            return Err(ExecError::Cancelled { command });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child's process group, then the child itself, and reap it
fn kill(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain syscall; a negative pid addresses the group the child leads
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
