//! Process liveness checks by PID.

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Check if a PID exists.
///
/// Uses `kill` with the null signal, which checks existence without
/// delivering anything. Exited-but-unreaped processes still count.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid as NixPid;

    // 0 and values past i32::MAX would address process groups instead.
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    match signal::kill(NixPid::from_raw(raw), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false, // No such process
        Err(_) => true,                         // Exists but we lack permission
    }
}

#[cfg(not(unix))]
pub fn pid_exists(pid: u32) -> bool {
    inspect(pid).is_some()
}

/// Check if a PID belongs to a running (non-zombie) process.
///
/// A killed child that has not been reaped yet is reported as gone.
pub fn is_alive(pid: u32) -> bool {
    pid_exists(pid) && inspect(pid) != Some(ProcessStatus::Zombie)
}

/// Slack between a process's start and the time its registry entry was written.
///
/// Start times are whole seconds derived from boot time and clock ticks.
pub const START_TIME_TOLERANCE_SECS: i64 = 2;

/// Check that `pid` is alive and is still the process recorded at `recorded_at`
/// (Unix seconds).
///
/// Registry entries are written after the server passed its readiness probe,
/// so a process that started later reused the PID. When the start time cannot
/// be read the PID is not trusted.
pub fn is_recorded_process(pid: u32, recorded_at: i64) -> bool {
    if !is_alive(pid) {
        return false;
    }
    let Some(started) = start_time(pid).and_then(|secs| i64::try_from(secs).ok()) else {
        return false;
    };
    started <= recorded_at.saturating_add(START_TIME_TOLERANCE_SECS)
}

/// Start time of a process in seconds since the Unix epoch.
pub fn start_time(pid: u32) -> Option<u64> {
    refresh(pid, sysinfo::Process::start_time)
}

fn inspect(pid: u32) -> Option<ProcessStatus> {
    refresh(pid, sysinfo::Process::status)
}

fn refresh<T>(pid: u32, read: impl FnOnce(&sysinfo::Process) -> T) -> Option<T> {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map(read)
}
