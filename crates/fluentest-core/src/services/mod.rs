//! Services that orchestrate the ports.

mod server_manager;

pub use server_manager::{ManagerState, ServerManager, ServerManagerError};
