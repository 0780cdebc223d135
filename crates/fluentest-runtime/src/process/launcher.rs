//! Spawning server processes from launch plans.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use fluentest_core::{LaunchPlan, PlanError, ProcessError, ProcessHandle, ProcessLauncher};
use tokio::process::Command;
use tracing::{debug, info};

use super::handle::ChildProcessHandle;
use super::stream::{OutputStream, spawn_output_forwarder};

/// Launches plans as `tokio` child processes.
///
/// On Unix each server leads a new process group so shutdown reaches every
/// process the launch command spawns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub const fn new() -> Self {
        Self
    }
}

/// Make a working directory absolute against the current directory.
///
/// The child runs inside this directory, so paths derived from it must not
/// be relative a second time.
pub(crate) fn absolute_working_directory(dir: &Path) -> Result<PathBuf, String> {
    std::path::absolute(dir)
        .map_err(|e| format!("invalid working directory {}: {e}", dir.display()))
}

/// Resolve the plan's executable to a program path.
///
/// Bare names go through `PATH` lookup (which also finds `npm.cmd` on
/// Windows); relative paths resolve against the (absolute) working directory.
pub(crate) fn resolve_executable(
    executable: &str,
    working_directory: Option<&Path>,
) -> Result<PathBuf, String> {
    let path = Path::new(executable);

    if path.components().count() > 1 || path.is_absolute() {
        let resolved = match working_directory {
            Some(dir) if path.is_relative() => absolute_working_directory(dir)?.join(path),
            _ => path.to_path_buf(),
        };
        return Ok(resolved);
    }

    which::which(executable).map_err(|e| format!("`{executable}` not found on PATH: {e}"))
}

fn build_command(plan: &LaunchPlan, program: &Path, working_directory: Option<&Path>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(&plan.arguments)
        .envs(&plan.environment)
        .stdin(Stdio::null())
        .kill_on_drop(false);

    if let Some(dir) = working_directory {
        cmd.current_dir(dir);
    }

    if plan.stream_process_output {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    #[cfg(unix)]
    cmd.process_group(0);

    cmd
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn start(&self, plan: &LaunchPlan) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        if plan.executable.trim().is_empty() {
            return Err(PlanError::EmptyExecutable.into());
        }

        let command = plan.command_line();
        let start_failed = |reason: String| ProcessError::StartFailed {
            command: command.clone(),
            reason,
        };

        let working_directory = plan
            .working_directory
            .as_deref()
            .map(absolute_working_directory)
            .transpose()
            .map_err(start_failed)?;
        let program = resolve_executable(&plan.executable, working_directory.as_deref())
            .map_err(start_failed)?;
        debug!(program = %program.display(), "Resolved server executable");

        let mut child = build_command(plan, &program, working_directory.as_deref())
            .spawn()
            .map_err(|e| start_failed(e.to_string()))?;

        let pid = child
            .id()
            .ok_or_else(|| start_failed("process exited before its id could be read".to_string()))?;

        if plan.stream_process_output {
            if let Some(stdout) = child.stdout.take() {
                spawn_output_forwarder(stdout, pid, OutputStream::Stdout);
            }
            if let Some(stderr) = child.stderr.take() {
                spawn_output_forwarder(stderr, pid, OutputStream::Stderr);
            }
        }

        info!(pid, command = %command, "Started server process");
        Ok(Box::new(ChildProcessHandle::new(child, pid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bare_names_are_looked_up_on_path() {
        let resolved = resolve_executable("sh", None);

        #[cfg(unix)]
        assert!(resolved.unwrap().is_absolute());
        #[cfg(not(unix))]
        let _ = resolved;
    }

    #[test]
    fn relative_paths_resolve_against_working_directory() {
        let resolved =
            resolve_executable("./bin/server", Some(Path::new("/srv/app"))).unwrap();

        assert_eq!(resolved, Path::new("/srv/app").join("./bin/server"));
    }

    #[test]
    fn relative_working_directory_is_made_absolute_once() {
        let resolved = resolve_executable("./bin/server", Some(Path::new("web"))).unwrap();

        let expected = std::env::current_dir()
            .unwrap()
            .join("web")
            .join("./bin/server");
        assert!(resolved.is_absolute());
        assert_eq!(resolved, expected);
    }

    #[test]
    fn unknown_bare_name_is_an_error() {
        let err = resolve_executable("fluentest-definitely-missing", None).unwrap_err();

        assert!(err.contains("fluentest-definitely-missing"));
    }

    #[tokio::test]
    async fn start_failure_names_the_command_line() {
        let plan = LaunchPlan::new("fluentest-definitely-missing").with_args(["run", "--port 80"]);

        let Err(err) = TokioProcessLauncher::new().start(&plan).await else {
            panic!("missing executable should not start");
        };

        match err {
            ProcessError::StartFailed { command, .. } => {
                assert_eq!(command, "fluentest-definitely-missing run \"--port 80\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_executable_is_rejected() {
        let Err(err) = TokioProcessLauncher::new()
            .start(&LaunchPlan::new("  "))
            .await
        else {
            panic!("blank executable should be rejected");
        };

        assert!(matches!(
            err,
            ProcessError::InvalidPlan(PlanError::EmptyExecutable)
        ));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn exit_code_is_reported() {
        let plan = LaunchPlan::new("sh").with_args(["-c", "exit 3"]);

        let mut handle = TokioProcessLauncher::new().start(&plan).await.unwrap();

        assert_eq!(handle.wait_for_exit().await, Some(3));
        assert!(handle.has_exited());
        assert_eq!(handle.exit_code(), Some(3));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn environment_and_working_directory_are_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let plan = LaunchPlan::new("sh")
            .with_args(["-c", "test \"$FLUENTEST_PROBE\" = yes && test -f marker"])
            .with_working_directory(dir.path())
            .with_env("FLUENTEST_PROBE", "yes");
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let mut handle = TokioProcessLauncher::new().start(&plan).await.unwrap();

        assert_eq!(handle.wait_for_exit().await, Some(0));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn relative_executable_runs_from_relative_working_directory() {
        // Created under the crate directory so its path stays relative.
        let dir = tempfile::TempDir::new_in(".").unwrap();
        assert!(dir.path().is_relative());
        let bin = dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        std::os::unix::fs::symlink("/bin/sh", bin.join("server")).unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let plan = LaunchPlan::new("./bin/server")
            .with_args(["-c", "test -f marker"])
            .with_working_directory(dir.path());
        let mut handle = TokioProcessLauncher::new().start(&plan).await.unwrap();

        assert_eq!(handle.wait_for_exit().await, Some(0));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_stops_a_running_server() {
        let plan = LaunchPlan::new("sleep")
            .with_arg("30")
            .with_streamed_output(true);

        let mut handle = TokioProcessLauncher::new().start(&plan).await.unwrap();
        assert!(!handle.has_exited());

        tokio::time::timeout(Duration::from_secs(10), handle.kill())
            .await
            .expect("kill timed out")
            .expect("kill failed");

        assert!(handle.has_exited());
        assert_eq!(handle.exit_code(), None);
        // Killing twice is harmless.
        handle.kill().await.unwrap();
    }
}
