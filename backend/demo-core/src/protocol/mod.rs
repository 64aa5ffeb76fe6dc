//! The session control protocol, one module per process role.
//!
//! - [`Controller`] starts and stops sessions across machines and tracks
//!   which machines are still viewing.
//! - [`Agent`] runs on every managed machine; it is the trust boundary that
//!   validates requests and rewrites the source address before anything
//!   reaches a worker.
//! - [`SessionWorker`] owns the live broadcast source and viewer objects.
//!
//! Roles never share memory. All coordination happens through
//! [`SessionMessage`](models::SessionMessage)s, and every handler reports a
//! plain handled/unhandled `bool` to its caller.

pub mod agent;
pub mod controller;
pub mod session_workers;
pub mod worker;

pub use agent::Agent;
pub use controller::Controller;
pub use worker::SessionWorker;

/// Lifecycle state of one capability at the worker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

impl SessionState {
    fn of<T>(slot: &Option<T>) -> Self {
        match slot {
            Some(_) => SessionState::Active,
            None => SessionState::Idle,
        }
    }
}
