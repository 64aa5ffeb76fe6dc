//! Session worker processes.
//!
//! The agent runs each capability's worker as a child process fed through
//! its stdin ([`process`]); the child side runs [`host::run_worker_loop`].

pub mod host;
pub mod process;

pub use host::run_worker_loop;
pub use process::ProcessSupervisor;

/// Subcommand a worker binary is started with.
pub const WORKER_COMMAND: &str = "worker";
/// Flag carrying the capability id the worker serves.
pub const CAPABILITY_FLAG: &str = "--capability";
