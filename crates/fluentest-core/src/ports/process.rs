//! Process launcher and process handle ports.
//!
//! The handle wraps an OS process behind a minimal interface so orchestration
//! can be tested with fake processes instead of spawning real ones.

use async_trait::async_trait;

use super::ProcessError;
use crate::domain::LaunchPlan;

/// A live (or recently exited) OS process.
///
/// Dropping a handle releases it without terminating the process; servers
/// outlive the test run that launched them so the next run can reuse them.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id.
    fn id(&self) -> u32;

    /// Whether the process has exited (non-blocking).
    fn has_exited(&mut self) -> bool;

    /// Exit code, once the process has exited normally.
    fn exit_code(&mut self) -> Option<i32>;

    /// Terminate the process and everything it spawned.
    async fn kill(&mut self) -> Result<(), ProcessError>;

    /// Wait until the process exits, returning its exit code if it has one.
    async fn wait_for_exit(&mut self) -> Option<i32>;
}

/// Starts server processes from launch plans.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the process described by `plan`.
    ///
    /// A live process exists once this returns; the caller owns its lifetime.
    /// Fails with [`ProcessError::StartFailed`] naming the attempted command line.
    async fn start(&self, plan: &LaunchPlan) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}
