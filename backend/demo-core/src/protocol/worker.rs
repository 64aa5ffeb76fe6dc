//! Session worker role: owns the live broadcast objects.
//!
//! Every message reaching this role has already been validated and
//! rewritten by the agent, so the handlers only drive the Idle/Active
//! state machine of the addressed capability.

use crate::collaborators::{CredentialKind, CredentialStore, EngineFactory};
use crate::protocol::session_workers::{BroadcastSourceWorker, BroadcastViewerWorker};
use crate::protocol::SessionState;

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, SessionMessage};

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info};

pub struct SessionWorker {
    credentials: Arc<dyn CredentialStore>,
    engines: Arc<dyn EngineFactory>,
    source: Mutex<Option<BroadcastSourceWorker>>,
    viewer: Mutex<Option<BroadcastViewerWorker>>,
}

impl SessionWorker {
    pub fn new(credentials: Arc<dyn CredentialStore>, engines: Arc<dyn EngineFactory>) -> Self {
        Self {
            credentials,
            engines,
            source: Mutex::new(None),
            viewer: Mutex::new(None),
        }
    }

    /// Dispatch one message. Returns false if it was not handled.
    pub fn on_message(&self, message: &SessionMessage) -> bool {
        let capability_id = message.capability_id();

        if BROADCAST_SOURCE == capability_id {
            match message.command() {
                Command::StartSource => self.start_source(message),
                Command::StopSource => self.stop_source(),
                other => {
                    debug!("Source capability does not handle {other}");
                    false
                }
            }
        } else if BROADCAST_VIEWER == capability_id {
            match message.command() {
                Command::StartViewer => self.start_viewer(message),
                Command::StopViewer => self.stop_viewer(),
                other => {
                    debug!("Viewer capability does not handle {other}");
                    false
                }
            }
        } else {
            debug!("Worker ignoring message for unknown capability {capability_id}");
            false
        }
    }

    pub fn source_state(&self) -> SessionState {
        SessionState::of(&*lock(&self.source))
    }

    pub fn viewer_state(&self) -> SessionState {
        SessionState::of(&*lock(&self.viewer))
    }

    /// Source host of the running viewer, if any.
    pub fn viewer_source_host(&self) -> Option<String> {
        lock(&self.viewer)
            .as_ref()
            .map(|viewer| viewer.source_host().to_string())
    }

    /// Destroy every live session object. Used on process teardown.
    pub fn shutdown(&self) {
        self.stop_viewer();
        self.stop_source();
    }

    fn start_source(&self, message: &SessionMessage) -> bool {
        let mut source = lock(&self.source);
        if source.is_some() {
            debug!("Broadcast source already active");
            return true;
        }

        let (Some(source_token), Some(access_token)) = (
            message.text(ArgumentKey::SourceToken),
            message.text(ArgumentKey::ViewerAccessToken),
        ) else {
            error!("StartSource is missing its session tokens");
            return false;
        };

        let source_token = RedactedToken::new(source_token);
        let access_token = RedactedToken::new(access_token);

        self.credentials
            .set_credential(CredentialKind::Token, access_token.clone());
        *source = Some(BroadcastSourceWorker::new(
            self.engines.as_ref(),
            &source_token,
            &access_token,
        ));
        info!("Broadcast source is active");
        true
    }

    fn stop_source(&self) -> bool {
        if lock(&self.source).take().is_some() {
            info!("Broadcast source is idle");
        }
        true
    }

    fn start_viewer(&self, message: &SessionMessage) -> bool {
        let mut viewer = lock(&self.viewer);
        if viewer.is_some() {
            debug!("Broadcast viewer already active");
            return true;
        }

        let (Some(access_token), Some(source_host)) = (
            message.text(ArgumentKey::ViewerAccessToken),
            message.text(ArgumentKey::SourceHostAddress),
        ) else {
            error!("StartViewer is missing its access token or source host");
            return false;
        };
        let fullscreen = message
            .flag(ArgumentKey::ViewerIsFullscreen)
            .unwrap_or(false);

        self.credentials
            .set_credential(CredentialKind::Token, RedactedToken::new(access_token));
        *viewer = Some(BroadcastViewerWorker::new(
            self.engines.as_ref(),
            source_host,
            fullscreen,
        ));
        info!("Broadcast viewer is active");
        true
    }

    fn stop_viewer(&self) -> bool {
        if lock(&self.viewer).take().is_some() {
            info!("Broadcast viewer is idle");
        }
        true
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
