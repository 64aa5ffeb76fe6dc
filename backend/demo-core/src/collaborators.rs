//! Contracts for everything the session protocol consumes but does not own.
//!
//! The roles in [`crate::protocol`] only ever talk to these traits. The
//! workspace ships production implementations for transport, supervision,
//! credentials and log policy; screen capture and rendering engines are
//! provided by the host.

use crate::error::supervisor::SupervisorError;

use common::RedactedToken;
use models::{Machine, SessionMessage};

use std::net::IpAddr;

use log::LevelFilter;
use uuid::Uuid;

/// Outbound message delivery to a machine's agent.
///
/// Fire-and-forget: implementations must not block on delivery and report
/// nothing back. Failures surface only as the absence of later effects.
pub trait TransportLink: Send + Sync {
    fn send(&self, message: &SessionMessage, destination: &Machine);
}

/// The transport connection an inbound message arrived on.
pub trait Connection: Send + Sync {
    /// Peer address of the connection, `None` if it can no longer be determined.
    fn peer_address(&self) -> Option<IpAddr>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Pre-shared token presented when connecting to another machine's services.
    Token,
}

/// Process-local authentication credentials.
pub trait CredentialStore: Send + Sync {
    fn has_credential(&self, kind: CredentialKind) -> bool;
    fn set_credential(&self, kind: CredentialKind, value: RedactedToken);
    fn credential(&self, kind: CredentialKind) -> Option<RedactedToken>;
}

/// Start, check and stop the session worker process serving one capability.
pub trait WorkerProcessSupervisor: Send + Sync {
    fn is_running(&self, capability_id: Uuid) -> bool;
    fn start(&self, capability_id: Uuid) -> Result<(), SupervisorError>;
    fn stop(&self, capability_id: Uuid) -> Result<(), SupervisorError>;
    /// Queue a message for the worker serving `message.capability_id()`.
    fn send_message(&self, message: &SessionMessage) -> Result<(), SupervisorError>;
}

/// Screen capture and encoding for a running broadcast source.
pub trait ScreenBroadcastEngine: Send {
    /// Stop serving viewers and release capture resources.
    fn shutdown(&mut self);
}

/// Connection to a broadcast source and on-screen rendering.
pub trait ScreenViewerEngine: Send {
    fn shutdown(&mut self);
}

/// Constructs the external engines on session start.
pub trait EngineFactory: Send + Sync {
    fn broadcast_engine(
        &self,
        source_token: &RedactedToken,
        viewer_access_token: &RedactedToken,
    ) -> Box<dyn ScreenBroadcastEngine>;

    fn viewer_engine(&self, source_host: &str, fullscreen: bool) -> Box<dyn ScreenViewerEngine>;
}

pub trait LogLevelPolicy: Send + Sync {
    fn current_level(&self) -> LevelFilter;
}
