//! Forcible shutdown for the spawned shell process.
//!
//! SIGTERM first so the shell can flush and close its connection, SIGKILL
//! when it ignores the request. The child is always reaped, so no zombie
//! survives a cancelled run.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;

#[cfg(unix)]
use std::time::Duration;
#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Grace period between SIGTERM and SIGKILL.
#[cfg(unix)]
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Stop a running child and wait for it to be reaped.
///
/// Unix: SIGTERM, wait up to [`TERM_GRACE`], then SIGKILL. Elsewhere the
/// only available operation is an immediate kill.
pub async fn terminate_child(child: &mut Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        terminate_unix(child).await
    }

    #[cfg(not(unix))]
    {
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn terminate_unix(child: &mut Child) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return child.wait().await;
    };

    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            // Exited between id() and kill(); just reap.
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(status) = timeout(TERM_GRACE, child.wait()).await {
        return status;
    }

    // Ignored SIGTERM; escalate.
    child.kill().await?;
    child.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;

    #[tokio::test]
    #[cfg(unix)]
    async fn test_terminate_interrupts_long_running_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = terminate_child(&mut child).await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_terminate_handles_already_exited_child() {
        let mut child = Command::new("echo")
            .arg("done")
            .spawn()
            .expect("failed to spawn echo");

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(terminate_child(&mut child).await.is_ok());
    }
}
