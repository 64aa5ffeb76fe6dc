//! Live session objects owned by the worker role.
//!
//! Each wraps one external engine and shuts it down when dropped, so
//! stopping a session is simply clearing the slot that owns it.

use crate::collaborators::{EngineFactory, ScreenBroadcastEngine, ScreenViewerEngine};

use common::RedactedToken;

use log::info;

pub struct BroadcastSourceWorker {
    engine: Box<dyn ScreenBroadcastEngine>,
}

impl BroadcastSourceWorker {
    pub fn new(
        engines: &dyn EngineFactory,
        source_token: &RedactedToken,
        viewer_access_token: &RedactedToken,
    ) -> Self {
        info!("Starting broadcast source");
        Self {
            engine: engines.broadcast_engine(source_token, viewer_access_token),
        }
    }
}

impl Drop for BroadcastSourceWorker {
    fn drop(&mut self) {
        info!("Stopping broadcast source");
        self.engine.shutdown();
    }
}

pub struct BroadcastViewerWorker {
    source_host: String,
    engine: Box<dyn ScreenViewerEngine>,
}

impl BroadcastViewerWorker {
    pub fn new(engines: &dyn EngineFactory, source_host: &str, fullscreen: bool) -> Self {
        info!("Connecting viewer to broadcast source at {source_host} (fullscreen: {fullscreen})");
        Self {
            source_host: source_host.to_string(),
            engine: engines.viewer_engine(source_host, fullscreen),
        }
    }

    pub fn source_host(&self) -> &str {
        &self.source_host
    }
}

impl Drop for BroadcastViewerWorker {
    fn drop(&mut self) {
        info!("Disconnecting viewer from {}", self.source_host);
        self.engine.shutdown();
    }
}
