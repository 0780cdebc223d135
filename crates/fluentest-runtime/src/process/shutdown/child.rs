//! Graceful shutdown for `tokio::process::Child` with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use super::GRACE_PERIOD;

/// Shut down a launched server and reap it.
///
/// # Strategy
/// 1. Send SIGTERM to the child's process group and wait up to [`GRACE_PERIOD`]
/// 2. If still running, send SIGKILL to the group
/// 3. Wait for reaping (required to avoid zombies)
///
/// # Platform behavior
/// - Unix: signals the whole process group via `killpg`
/// - Other: calls `Child::kill` immediately (no graceful shutdown available)
pub async fn shutdown_child(child: &mut Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child).await
    }

    #[cfg(not(unix))]
    {
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child) -> io::Result<ExitStatus> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::unistd::Pid;

    // No id means the child has already been reaped.
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let group = Pid::from_raw(
        i32::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?,
    );

    // Phase 1: SIGTERM with grace period. A child outside its own group
    // only gets the signal itself.
    match killpg(group, Signal::SIGTERM).or_else(|e| match e {
        Errno::ESRCH => kill(group, Signal::SIGTERM),
        other => Err(other),
    }) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return child.wait().await,
        Err(e) => return Err(io::Error::other(e)),
    }

    if let Ok(result) = timeout(GRACE_PERIOD, child.wait()).await {
        return result;
    }

    // Phase 2: SIGKILL the group; fall back to the leader alone.
    if killpg(group, Signal::SIGKILL).is_err() {
        child.start_kill()?;
    }

    // Phase 3: Wait for reaping (should be fast after SIGKILL)
    child.wait().await
}
