//! Process-tree shutdown for server processes.
//!
//! Provides two shutdown strategies:
//! - `shutdown_child`: for processes launched by this run (includes reaping)
//! - `kill_process_tree`: for servers known only by PID (no reaping)
//!
//! On Unix, launched servers lead their own process group, so signals go to
//! the whole group and wrappers such as `npm run` take their children down
//! with them.

use std::time::Duration;

mod child;
mod pid;

pub use child::shutdown_child;
pub use pid::kill_process_tree;

/// How long a process gets to exit after SIGTERM before SIGKILL.
pub const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Interval between liveness checks while waiting for exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);
