pub mod action;
pub mod config;
pub mod error;
pub mod host;
pub mod runner;
pub mod store;

pub use action::{Action, ActionResult};
pub use config::{ResolvedRun, RunConfig};
pub use error::RunError;
pub use host::{GithubHost, Host};
pub use runner::{run, run_action, RunStatus};

/// Returns the crate version baked in at compile time.
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
