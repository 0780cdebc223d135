//! Domain types for the server-under-test lifecycle.

mod config_hash;
pub mod duration_ms;
mod launch_plan;
mod server_status;

pub use config_hash::ConfigHash;
pub use launch_plan::{LaunchPlan, PlanError};
pub use server_status::ServerStatus;
