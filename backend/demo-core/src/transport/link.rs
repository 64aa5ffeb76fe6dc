//! Controller-side delivery of session messages to agents.

use crate::collaborators::TransportLink;
use crate::error::transport::TransportError;
use crate::wire::{WireEnvelope, wire_envelope};

use common::{ErrorLocation, RedactedToken};
use models::{Machine, SessionMessage};

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::panic::Location;
use std::sync::Mutex;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use prost::Message as ProstMessage;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep as TokioSleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

const CONNECT_MAX_ELAPSED: Duration = Duration::from_secs(10);
const CLOSE_GRACE: Duration = Duration::from_secs(2);

type AgentStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Link {
    queue: mpsc::UnboundedSender<SessionMessage>,
    task: JoinHandle<()>,
}

/// WebSocket [`TransportLink`] with one background connection per agent.
///
/// Messages to the same destination are delivered in the order they were
/// sent. A destination that cannot be reached within the connect window has
/// its queued messages dropped; the next send starts a fresh connection.
pub struct WsTransportLink {
    port: u16,
    auth_token: RedactedToken,
    runtime: Handle,
    links: Mutex<HashMap<String, Link>>,
}

impl WsTransportLink {
    /// Create a link that reaches agents on `port`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] when called outside a tokio runtime.
    #[track_caller]
    pub fn new(port: u16, auth_token: RedactedToken) -> Result<Self, TransportError> {
        let runtime = Handle::try_current().map_err(|e| TransportError::Io {
            message: format!("Transport link requires a tokio runtime: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            port,
            auth_token,
            runtime,
            links: Mutex::new(HashMap::new()),
        })
    }

    /// Close every agent connection after its queue drains.
    pub async fn close(&self) {
        let links: Vec<(String, Link)> = self
            .links
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain()
            .collect();

        for (address, link) in links {
            drop(link.queue);
            if timeout(CLOSE_GRACE, link.task).await.is_err() {
                warn!("Link to {address} did not drain within {CLOSE_GRACE:?}");
            }
        }
    }

    fn agent_url(&self, address: &str) -> String {
        if address.parse::<Ipv6Addr>().is_ok() {
            format!("ws://[{address}]:{}", self.port)
        } else {
            format!("ws://{address}:{}", self.port)
        }
    }
}

impl TransportLink for WsTransportLink {
    fn send(&self, message: &SessionMessage, destination: &Machine) {
        let mut links = self.links.lock().unwrap_or_else(|p| p.into_inner());

        let message = match links.get(&destination.address) {
            Some(link) => match link.queue.send(message.clone()) {
                Ok(()) => return,
                Err(mpsc::error::SendError(message)) => {
                    debug!("Link to {destination} is gone, reconnecting");
                    message
                }
            },
            None => message.clone(),
        };

        let (queue, receiver) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is alive until the task below ends
        let _ = queue.send(message);

        let url = self.agent_url(&destination.address);
        let task = self
            .runtime
            .spawn(run_link(url, self.auth_token.clone(), receiver));
        links.insert(destination.address.clone(), Link { queue, task });
    }
}

async fn run_link(
    url: String,
    auth_token: RedactedToken,
    mut queue: mpsc::UnboundedReceiver<SessionMessage>,
) {
    let mut stream = match connect_with_backoff(&url, &auth_token).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Giving up on {url}, dropping {} queued message(s): {e}", queue.len());
            return;
        }
    };

    while let Some(message) = queue.recv().await {
        let frame = WireEnvelope::session_message(&message).encode_to_vec();
        if let Err(e) = stream.send(Message::Binary(frame.into())).await {
            error!("Failed to deliver {} to {url}: {e}", message.command());
            return;
        }
        trace!("Delivered {message:?} to {url}");
    }

    let _ = stream.close(None).await;
    debug!("Link to {url} closed");
}

async fn connect_with_backoff(
    url: &str,
    auth_token: &RedactedToken,
) -> Result<AgentStream, TransportError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(CONNECT_MAX_ELAPSED),
        ..Default::default()
    };

    loop {
        match connect_and_authenticate(url, auth_token).await {
            Ok(stream) => {
                info!("Connected to agent at {url}");
                return Ok(stream);
            }
            Err(e @ TransportError::Auth { .. }) => return Err(e),
            Err(e) => match backoff.next_backoff() {
                Some(delay) => {
                    trace!("Agent at {url} not reachable ({e}), retrying after {delay:?}");
                    TokioSleep(delay).await;
                }
                None => {
                    return Err(TransportError::Connect {
                        message: format!(
                            "Agent at {url} not reachable within {CONNECT_MAX_ELAPSED:?}: {e}"
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
        }
    }
}

/// Open a connection and complete the auth handshake.
pub async fn connect_and_authenticate(
    url: &str,
    auth_token: &RedactedToken,
) -> Result<AgentStream, TransportError> {
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connect {
            message: format!("Failed to connect to {url}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let handshake = WireEnvelope::auth_handshake(auth_token.as_str()).encode_to_vec();
    stream.send(Message::Binary(handshake.into())).await?;

    let response = match stream.next().await {
        Some(Ok(Message::Binary(data))) => WireEnvelope::decode(&data[..])?,
        Some(Ok(other)) => {
            return Err(TransportError::Handshake {
                message: format!("Unexpected handshake reply from {url}: {other:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Some(Err(e)) => {
            return Err(TransportError::Read {
                message: format!("Failed to read handshake reply from {url}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        None => {
            return Err(TransportError::Handshake {
                message: format!("{url} closed the connection during handshake"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    match response.payload {
        Some(wire_envelope::Payload::AuthHandshakeResponse(reply)) if reply.success => Ok(stream),
        Some(wire_envelope::Payload::AuthHandshakeResponse(reply)) => Err(TransportError::Auth {
            message: reply
                .error
                .unwrap_or_else(|| String::from("Authentication rejected")),
            location: ErrorLocation::from(Location::caller()),
        }),
        _ => Err(TransportError::Handshake {
            message: format!("{url} replied to the handshake with an unexpected payload"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
