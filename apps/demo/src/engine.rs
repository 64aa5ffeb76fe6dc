//! Stand-in screen engines.
//!
//! Capture, encoding and rendering are platform work outside this
//! workspace. These engines only log their lifecycle so a worker process
//! can be driven end to end.

use demo_core::{EngineFactory, ScreenBroadcastEngine, ScreenViewerEngine};

use common::RedactedToken;

use log::info;

#[derive(Debug, Default)]
pub struct LoggingEngines;

impl EngineFactory for LoggingEngines {
    fn broadcast_engine(
        &self,
        source_token: &RedactedToken,
        viewer_access_token: &RedactedToken,
    ) -> Box<dyn ScreenBroadcastEngine> {
        info!(
            "Broadcast engine up (source token {source_token}, access token {} bytes)",
            viewer_access_token.len()
        );
        Box::new(LoggingBroadcast)
    }

    fn viewer_engine(&self, source_host: &str, fullscreen: bool) -> Box<dyn ScreenViewerEngine> {
        info!("Viewer engine up for {source_host} (fullscreen: {fullscreen})");
        Box::new(LoggingViewer {
            source_host: source_host.to_string(),
        })
    }
}

struct LoggingBroadcast;

impl ScreenBroadcastEngine for LoggingBroadcast {
    fn shutdown(&mut self) {
        info!("Broadcast engine down");
    }
}

struct LoggingViewer {
    source_host: String,
}

impl ScreenViewerEngine for LoggingViewer {
    fn shutdown(&mut self) {
        info!("Viewer engine for {} down", self.source_host);
    }
}
