//! External-process script execution.
//!
//! Scripts are never interpreted in-process: the runner launches the
//! external `mongo`/`mongosh` binary with a deterministic command line
//! and streams its output back to the caller.
//!
//! The caller owns a [`ScriptExecution`] handle: an output-event channel,
//! a cancellation token, and the execution id. A supervisor task owns the
//! child itself, so the process is reaped on every exit path — normal
//! exit, cancellation, or the handle being dropped mid-run.

pub mod command;
mod shutdown;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use command::CommandLine;

use crate::config::ShellConfig;
use crate::error::{LaunchError, Result};
use crate::profile::ConnectionProfile;

/// One output notification from a running execution.
///
/// Lines arrive strictly in order within their stream; `Exited` is always
/// the final event and carries the exit code, or `None` when the process
/// was killed by a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    Stdout(String),
    Stderr(String),
    Exited(Option<i32>),
}

/// Launches shell processes for script files.
pub struct ScriptRunner {
    shell: ShellConfig,
}

impl ScriptRunner {
    /// Create a runner using the given shell configuration.
    pub fn new(shell: ShellConfig) -> Self {
        Self { shell }
    }

    /// Resolve the shell executable at call time.
    ///
    /// A configured path must exist; otherwise the binary name is looked
    /// up on PATH. Nothing is ever hard-coded.
    pub fn resolve_shell(&self) -> Result<PathBuf> {
        match &self.shell.path {
            Some(path) => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    Err(LaunchError::ExecutableNotFound(path.display().to_string()).into())
                }
            }
            None => which::which(&self.shell.binary)
                .map_err(|_| LaunchError::ExecutableNotFound(self.shell.binary.clone()).into()),
        }
    }

    /// Run `script` against the server described by `profile`.
    ///
    /// Validates the script path and resolves the executable before
    /// spawning; both failures are `LaunchError`s. A non-zero exit of the
    /// spawned process is NOT an error — it arrives as
    /// [`ExecutionEvent::Exited`] like any other terminal state.
    pub fn run(&self, profile: &ConnectionProfile, script: &Path) -> Result<ScriptExecution> {
        if !script.is_file() {
            return Err(LaunchError::ScriptNotFound(script.display().to_string()).into());
        }

        let shell = self.resolve_shell()?;
        let command = CommandLine::build(&shell, profile, script)?;
        info!(command = %command.rendered_sanitized(), "launching shell");

        ScriptExecution::spawn(command)
    }
}

/// A live script execution owned by the caller.
///
/// Dropping the handle does not kill the process; the supervisor task
/// keeps running until the child exits and is reaped. Use
/// [`terminate`](Self::terminate) to stop it early.
#[derive(Debug)]
pub struct ScriptExecution {
    id: Uuid,
    command: CommandLine,
    events: mpsc::UnboundedReceiver<ExecutionEvent>,
    cancel: CancellationToken,
}

impl ScriptExecution {
    fn spawn(command: CommandLine) -> Result<Self> {
        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    LaunchError::ExecutableNotFound(command.program.display().to_string())
                }
                _ => LaunchError::SpawnFailed(e.to_string()),
            })?;

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let stdout_task = spawn_line_reader(
            child.stdout.take().expect("stdout was piped"),
            tx.clone(),
            ExecutionEvent::Stdout,
        );
        let stderr_task = spawn_line_reader(
            child.stderr.take().expect("stderr was piped"),
            tx.clone(),
            ExecutionEvent::Stderr,
        );

        let cancel = CancellationToken::new();
        let supervisor_cancel = cancel.clone();

        // The supervisor owns the child: it reaps on normal exit and on
        // cancellation, waits for both pipes to drain, then emits the
        // terminal event. Output lines can therefore never arrive after
        // `Exited`.
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = supervisor_cancel.cancelled() => {
                    debug!(id = %id, "termination requested");
                    shutdown::terminate_child(&mut child).await
                }
            };

            let _ = stdout_task.await;
            let _ = stderr_task.await;

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(id = %id, error = %e, "failed to reap shell process");
                    None
                }
            };
            debug!(id = %id, code = ?code, "execution finished");
            let _ = tx.send(ExecutionEvent::Exited(code));
        });

        Ok(Self {
            id,
            command,
            events: rx,
            cancel,
        })
    }

    /// Unique id of this execution.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The exact command line this execution was spawned with.
    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    /// Token that stops the execution when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request termination of the running process.
    ///
    /// Returns immediately; the terminal [`ExecutionEvent::Exited`] event
    /// arrives once the process has actually been stopped and reaped.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// Receive the next output notification, `None` after the terminal
    /// event has been consumed.
    pub async fn next_event(&mut self) -> Option<ExecutionEvent> {
        self.events.recv().await
    }

    /// Discard remaining output and return the exit code.
    pub async fn wait(mut self) -> Option<i32> {
        while let Some(event) = self.events.recv().await {
            if let ExecutionEvent::Exited(code) = event {
                return code;
            }
        }
        None
    }
}

/// Forward lines from one pipe as events, in arrival order.
fn spawn_line_reader<R>(
    pipe: R,
    tx: mpsc::UnboundedSender<ExecutionEvent>,
    wrap: fn(String) -> ExecutionEvent,
) -> tokio::task::JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}
