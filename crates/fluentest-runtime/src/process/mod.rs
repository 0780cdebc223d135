//! OS process adapters: launching, liveness and shutdown.

mod handle;
mod launcher;
pub mod liveness;
pub mod shutdown;
mod stream;

pub use handle::ChildProcessHandle;
pub use launcher::TokioProcessLauncher;
pub use liveness::{is_alive, is_recorded_process, pid_exists};
pub use shutdown::{kill_process_tree, shutdown_child};
pub use stream::{OutputStream, spawn_output_forwarder};
