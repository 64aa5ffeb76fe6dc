//! Per-machine agent role.

use crate::collaborators::{
    Connection, CredentialKind, CredentialStore, LogLevelPolicy, WorkerProcessSupervisor,
};

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, SessionMessage};

use std::sync::{Arc, Mutex};

use log::{LevelFilter, debug, error, warn};
use uuid::Uuid;

pub struct Agent {
    supervisor: Arc<dyn WorkerProcessSupervisor>,
    credentials: Arc<dyn CredentialStore>,
    log_policy: Arc<dyn LogLevelPolicy>,
    source_gate: Mutex<()>,
    viewer_gate: Mutex<()>,
}

impl Agent {
    pub fn new(
        supervisor: Arc<dyn WorkerProcessSupervisor>,
        credentials: Arc<dyn CredentialStore>,
        log_policy: Arc<dyn LogLevelPolicy>,
    ) -> Self {
        Self {
            supervisor,
            credentials,
            log_policy,
            source_gate: Mutex::new(()),
            viewer_gate: Mutex::new(()),
        }
    }

    /// Handle a message from the controller tier.
    ///
    /// `connection` is the transport connection the message arrived on; it is
    /// required for `StartViewer`, whose source host is taken from it.
    pub fn on_message(&self, message: &SessionMessage, connection: Option<&dyn Connection>) -> bool {
        let capability_id = message.capability_id();

        if BROADCAST_SOURCE == capability_id {
            let _gate = self.source_gate.lock().unwrap_or_else(|p| p.into_inner());
            self.handle_source(message)
        } else if BROADCAST_VIEWER == capability_id {
            let _gate = self.viewer_gate.lock().unwrap_or_else(|p| p.into_inner());
            self.handle_viewer(message, connection)
        } else {
            debug!("Agent ignoring message for unknown capability {capability_id}");
            false
        }
    }

    /// Stop any worker processes this agent started.
    pub fn shutdown(&self) {
        for capability_id in [BROADCAST_VIEWER.uid(), BROADCAST_SOURCE.uid()] {
            if self.supervisor.is_running(capability_id)
                && let Err(e) = self.supervisor.stop(capability_id)
            {
                warn!("Failed to stop worker for {capability_id}: {e}");
            }
        }
    }

    fn handle_source(&self, message: &SessionMessage) -> bool {
        if !self.ensure_worker(BROADCAST_SOURCE.uid()) {
            return false;
        }

        // First writer wins: a later controller cannot replace the source token
        if !self.credentials.has_credential(CredentialKind::Token)
            && let Some(source_token) = message.text(ArgumentKey::SourceToken)
        {
            self.credentials
                .set_credential(CredentialKind::Token, RedactedToken::new(source_token));
        }

        self.forward(message)
    }

    fn handle_viewer(&self, message: &SessionMessage, connection: Option<&dyn Connection>) -> bool {
        // A running source here usually means the operator targeted their own
        // machine; refuse unless debugging
        if self.supervisor.is_running(BROADCAST_SOURCE.uid())
            && self.log_policy.current_level() < LevelFilter::Debug
        {
            warn!("Refusing {} - broadcast source is running on this machine", message.command());
            return false;
        }

        if message.command() != Command::StartViewer {
            if !self.ensure_worker(BROADCAST_VIEWER.uid()) {
                return false;
            }
            return self.forward(message);
        }

        let Some(source_host) = connection.and_then(|connection| connection.peer_address()) else {
            error!("StartViewer rejected: no usable transport connection to derive the source host");
            return false;
        };

        if !self.ensure_worker(BROADCAST_VIEWER.uid()) {
            return false;
        }

        let mut start_viewer = SessionMessage::new(message.capability_id(), Command::StartViewer);
        if let Some(access_token) = message.argument(ArgumentKey::ViewerAccessToken) {
            start_viewer = start_viewer.with_argument(ArgumentKey::ViewerAccessToken, access_token.clone());
        }
        if let Some(fullscreen) = message.argument(ArgumentKey::ViewerIsFullscreen) {
            start_viewer = start_viewer.with_argument(ArgumentKey::ViewerIsFullscreen, fullscreen.clone());
        }
        let start_viewer =
            start_viewer.with_argument(ArgumentKey::SourceHostAddress, source_host.to_string());

        debug!("Forwarding StartViewer with source host {source_host}");
        self.forward(&start_viewer)
    }

    fn ensure_worker(&self, capability_id: Uuid) -> bool {
        if self.supervisor.is_running(capability_id) {
            return true;
        }

        match self.supervisor.start(capability_id) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to start worker for {capability_id}: {e}");
                false
            }
        }
    }

    fn forward(&self, message: &SessionMessage) -> bool {
        match self.supervisor.send_message(message) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to forward {} to worker: {e}", message.command());
                false
            }
        }
    }
}
