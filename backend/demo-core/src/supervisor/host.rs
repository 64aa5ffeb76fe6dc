use crate::error::transport::TransportError;
use crate::protocol::SessionWorker;
use crate::transport::frame::read_frame;
use crate::wire::WireSessionMessage;

use models::SessionMessage;

use log::{debug, error, info, warn};
use prost::Message as ProstMessage;
use tokio::io::AsyncRead;

/// Serve a session worker from the agent's pipe until it closes.
///
/// Messages are dispatched one at a time, in arrival order. Frames that do
/// not decode to a session message are skipped without disturbing live
/// sessions. When the pipe closes or a frame cannot be read, every live
/// session object is torn down before returning.
pub async fn run_worker_loop<R>(mut reader: R, worker: &SessionWorker) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    info!("Worker loop started");

    let result = loop {
        let payload = match read_frame(&mut reader).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("Agent closed the worker pipe");
                break Ok(());
            }
            Err(e) => {
                error!("Worker pipe failed: {e}");
                break Err(e);
            }
        };

        let wire = match WireSessionMessage::decode(&payload[..]) {
            Ok(wire) => wire,
            Err(e) => {
                warn!("Skipping undecodable frame ({} bytes): {e}", payload.len());
                continue;
            }
        };

        let message = match SessionMessage::try_from(wire) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping malformed frame: {e}");
                continue;
            }
        };

        debug!("Worker received {message:?}");
        if !worker.on_message(&message) {
            debug!("Worker did not handle {}", message.command());
        }
    };

    worker.shutdown();
    result
}
