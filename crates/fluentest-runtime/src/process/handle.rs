//! [`ProcessHandle`] over a `tokio::process::Child`.

use std::process::ExitStatus;

use async_trait::async_trait;
use fluentest_core::{ProcessError, ProcessHandle};
use tokio::process::Child;
use tracing::debug;

use super::shutdown::shutdown_child;

/// A server process spawned by [`TokioProcessLauncher`](super::TokioProcessLauncher).
///
/// Dropping the handle does not kill the process.
#[derive(Debug)]
pub struct ChildProcessHandle {
    child: Child,
    pid: u32,
    exit: Option<Option<i32>>,
}

impl ChildProcessHandle {
    pub(crate) const fn new(child: Child, pid: u32) -> Self {
        Self {
            child,
            pid,
            exit: None,
        }
    }

    fn record(&mut self, status: ExitStatus) -> Option<i32> {
        let code = status.code();
        self.exit = Some(code);
        code
    }

    fn poll(&mut self) {
        if self.exit.is_none() {
            if let Ok(Some(status)) = self.child.try_wait() {
                self.record(status);
            }
        }
    }
}

#[async_trait]
impl ProcessHandle for ChildProcessHandle {
    fn id(&self) -> u32 {
        self.pid
    }

    fn has_exited(&mut self) -> bool {
        self.poll();
        self.exit.is_some()
    }

    fn exit_code(&mut self) -> Option<i32> {
        self.poll();
        self.exit.flatten()
    }

    async fn kill(&mut self) -> Result<(), ProcessError> {
        if self.has_exited() {
            return Ok(());
        }

        let status = shutdown_child(&mut self.child)
            .await
            .map_err(|e| ProcessError::StopFailed {
                pid: self.pid,
                reason: e.to_string(),
            })?;
        debug!(pid = self.pid, %status, "Server process terminated");
        self.record(status);
        Ok(())
    }

    async fn wait_for_exit(&mut self) -> Option<i32> {
        if let Some(code) = self.exit {
            return code;
        }

        match self.child.wait().await {
            Ok(status) => self.record(status),
            Err(e) => {
                debug!(pid = self.pid, error = %e, "Failed to wait for server process");
                self.exit = Some(None);
                None
            }
        }
    }
}
