//! Kill processes by PID without reaping (no `Child` handle available).

use std::io;

use tokio::time::sleep;
use tracing::debug;

use super::{EXIT_POLL_INTERVAL, GRACE_PERIOD};
use crate::process::liveness::is_alive;

/// Kill a process (and its group, if it leads one) with SIGTERM → SIGKILL escalation.
///
/// # Strategy
/// 1. Send SIGTERM
/// 2. Poll for up to [`GRACE_PERIOD`] to verify exit
/// 3. If still alive, send SIGKILL
/// 4. Poll again for up to [`GRACE_PERIOD`]
///
/// # Returns
/// - `Ok(())` if the process was killed or already gone
/// - `Err` if signalling fails (excluding ESRCH) or the process survives SIGKILL
pub async fn kill_process_tree(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        kill_unix(pid).await
    }

    #[cfg(not(unix))]
    {
        kill_sysinfo(pid).await
    }
}

#[cfg(unix)]
async fn kill_unix(pid: u32) -> io::Result<()> {
    use nix::sys::signal::Signal;

    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;
    let group = leads_group(raw);

    // Phase 1: SIGTERM
    if !signal(raw, group, Signal::SIGTERM)? {
        return Ok(());
    }
    if wait_for_exit(pid).await {
        return Ok(());
    }

    // Phase 2: SIGKILL
    debug!(pid, "Process ignored SIGTERM, sending SIGKILL");
    if !signal(raw, group, Signal::SIGKILL)? {
        return Ok(());
    }
    if wait_for_exit(pid).await {
        return Ok(());
    }

    Err(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process {pid} did not exit after SIGKILL"),
    ))
}

/// Whether `pid` is the leader of its own process group.
#[cfg(unix)]
fn leads_group(raw: i32) -> bool {
    use nix::unistd::{Pid, getpgid};

    getpgid(Some(Pid::from_raw(raw))).is_ok_and(|pgid| pgid.as_raw() == raw)
}

/// Deliver `sig` to the process or its group. Returns `false` if it is already gone.
#[cfg(unix)]
fn signal(raw: i32, group: bool, sig: nix::sys::signal::Signal) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, killpg};
    use nix::unistd::Pid;

    let target = Pid::from_raw(raw);
    let result = if group {
        killpg(target, sig)
    } else {
        kill(target, sig)
    };

    match result {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
async fn kill_sysinfo(pid: u32) -> io::Result<()> {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let sys_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);

    let Some(process) = system.process(sys_pid) else {
        return Ok(());
    };
    if !process.kill() {
        return Err(io::Error::other(format!("failed to terminate process {pid}")));
    }
    if wait_for_exit(pid).await {
        return Ok(());
    }

    Err(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process {pid} did not exit after termination"),
    ))
}

/// Poll until the process is gone or the grace period ends.
async fn wait_for_exit(pid: u32) -> bool {
    let attempts = GRACE_PERIOD.as_millis() / EXIT_POLL_INTERVAL.as_millis();
    for _ in 0..attempts {
        sleep(EXIT_POLL_INTERVAL).await;
        if !is_alive(pid) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::liveness::pid_exists;
    use tokio::process::Command;

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_handles_already_gone() {
        assert!(kill_process_tree(999_999).await.is_ok());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_terminates_process() {
        let mut child = Command::new("sleep")
            .arg("60")
            .spawn()
            .expect("failed to spawn sleep");
        let pid = child.id().expect("no PID");

        kill_process_tree(pid).await.expect("kill failed");

        // Reap the zombie; in real use the launching run (or init) does this.
        let _ = child.wait().await;
        assert!(!pid_exists(pid));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_takes_down_the_whole_group() {
        let mut child = Command::new("sh")
            .args(["-c", "sleep 60 & echo $!; wait"])
            .process_group(0)
            .stdout(std::process::Stdio::piped())
            .spawn()
            .expect("failed to spawn sh");
        let pid = child.id().expect("no PID");

        let stdout = child.stdout.take().expect("no stdout");
        let mut lines = tokio::io::AsyncBufReadExt::lines(tokio::io::BufReader::new(stdout));
        let grandchild: u32 = lines
            .next_line()
            .await
            .unwrap()
            .expect("no grandchild pid")
            .trim()
            .parse()
            .unwrap();

        kill_process_tree(pid).await.expect("kill failed");
        let _ = child.wait().await;

        // The grandchild is reparented to init, which reaps it.
        for _ in 0..50 {
            if !is_alive(grandchild) {
                break;
            }
            sleep(EXIT_POLL_INTERVAL).await;
        }
        assert!(!is_alive(grandchild));
    }
}
