//! Session control for screen-broadcast demos across managed machines.
//!
//! A controller starts a broadcast source on its own machine and viewers on
//! a set of target machines, then stops the source once the last viewer is
//! gone. See [`protocol`] for the three roles and [`collaborators`] for the
//! contracts they depend on.

pub mod collaborators;
pub mod config;
pub mod credentials;
pub mod error;
pub mod log_policy;
pub mod membership;
pub mod protocol;
pub mod supervisor;
pub mod token;
pub mod transport;
pub mod wire;

#[cfg(test)]
mod tests;

pub use collaborators::{
    Connection, CredentialKind, CredentialStore, EngineFactory, LogLevelPolicy,
    ScreenBroadcastEngine, ScreenViewerEngine, TransportLink, WorkerProcessSupervisor,
};
pub use protocol::{Agent, Controller, SessionState, SessionWorker};
