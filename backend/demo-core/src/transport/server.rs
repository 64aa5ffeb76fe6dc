//! Agent-side WebSocket listener.
//!
//! Controllers connect here to deliver session messages. The listener:
//!
//! - Requires an auth handshake carrying the pre-shared agent token as the
//!   first binary frame, and closes the connection otherwise
//! - Decodes every following binary frame as a [`WireEnvelope`]
//! - Hands session messages to [`Agent::on_message`] together with the
//!   connection they arrived on, so the agent can derive the source host
//!   from the socket rather than from the message
//!
//! Unlike the worker pipe, this listener faces the network; the token is
//! the only thing standing between an arbitrary peer and the agent.

use crate::collaborators::Connection;
use crate::config::AgentConfig;
use crate::error::transport::TransportError;
use crate::protocol::Agent;
use crate::transport::connection_state::ConnectionState;
use crate::transport::handle::AgentServerHandle;
use crate::wire::{WireEnvelope, wire_envelope};

use common::{ErrorLocation, RedactedToken};
use models::SessionMessage;

use std::net::{IpAddr, SocketAddr};
use std::panic::Location;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use prost::Message as ProstMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

type WsWrite = SplitSink<WebSocketStream<TcpStream>, Message>;

/// The TCP connection a controller message arrived on.
#[derive(Debug, Clone, Copy)]
pub struct PeerConnection {
    addr: SocketAddr,
}

impl PeerConnection {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl Connection for PeerConnection {
    fn peer_address(&self) -> Option<IpAddr> {
        let ip = self.addr.ip();
        if ip.is_unspecified() {
            return None;
        }
        // Dual-stack sockets report IPv4 peers as mapped IPv6 addresses
        Some(match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
            v4 => v4,
        })
    }
}

/// Bind the agent listener and serve controller connections in the background.
///
/// # Errors
///
/// Returns [`TransportError::Io`] if the address cannot be bound.
pub async fn start_agent_server(
    config: &AgentConfig,
    auth_token: RedactedToken,
    agent: Arc<Agent>,
) -> Result<AgentServerHandle, TransportError> {
    let address = format!("{}:{}", config.listen_address, config.port);
    let listener = TcpListener::bind(&address).await?;
    let local_addr = listener.local_addr()?;

    info!("Agent listening on {local_addr}");

    let accept_task = TokioSpawn(async move {
        while let Ok((stream, addr)) = listener.accept().await {
            debug!("Controller connecting from {addr}");
            let token = auth_token.clone();
            let agent = Arc::clone(&agent);
            TokioSpawn(async move {
                if let Err(e) = handle_connection(stream, addr, token, agent).await {
                    warn!("Connection from {addr} ended with error: {e}");
                }
            });
        }
    });

    Ok(AgentServerHandle::new(local_addr, accept_task))
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    auth_token: RedactedToken,
    agent: Arc<Agent>,
) -> Result<(), TransportError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| TransportError::Handshake {
            message: format!("WebSocket handshake with {addr} failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let (mut write, mut read) = ws_stream.split();
    let mut state = ConnectionState::new(auth_token);

    // First frame MUST be the auth handshake
    match read.next().await {
        Some(Ok(Message::Binary(data))) => {
            let envelope = WireEnvelope::decode(&data[..])?;
            match envelope.payload {
                Some(wire_envelope::Payload::AuthHandshake(auth)) => {
                    if state.validate_token(&auth.token) {
                        info!("Controller {addr} authenticated");
                        send_envelope(&mut write, &WireEnvelope::auth_response(true, None)).await?;
                    } else {
                        warn!("Controller {addr} auth failed: invalid token");
                        send_envelope(
                            &mut write,
                            &WireEnvelope::auth_response(false, Some("Invalid authentication token")),
                        )
                        .await?;
                        return Ok(());
                    }
                }
                _ => {
                    warn!("Controller {addr} auth failed: first message was not auth handshake");
                    return Ok(());
                }
            }
        }
        Some(Ok(_)) => {
            warn!("Controller {addr} sent non-binary first message");
            return Ok(());
        }
        Some(Err(e)) => {
            return Err(TransportError::Read {
                message: format!("Error reading first message from {addr}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        None => {
            debug!("Controller {addr} disconnected before sending auth");
            return Ok(());
        }
    }

    let peer = PeerConnection::new(addr);
    let connection: &dyn Connection = &peer;

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Binary(data)) if state.is_authenticated() => {
                let message = match decode_session_message(&data) {
                    Ok(message) => message,
                    Err(e) => {
                        error!("Dropping undecodable frame from {addr}: {e}");
                        continue;
                    }
                };

                debug!("Agent received {message:?} from {addr}");
                if !agent.on_message(&message, Some(connection)) {
                    debug!("Agent did not handle {} from {addr}", message.command());
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                debug!("Ignoring non-binary frame from {addr}");
            }
            Err(e) => {
                return Err(TransportError::Read {
                    message: format!("Error reading message from {addr}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }

    info!("Controller {addr} disconnected");
    Ok(())
}

fn decode_session_message(data: &[u8]) -> Result<SessionMessage, TransportError> {
    let envelope = WireEnvelope::decode(data)?;
    match envelope.payload {
        Some(wire_envelope::Payload::SessionMessage(wire)) => {
            SessionMessage::try_from(wire).map_err(|e| TransportError::ProtobufDecode {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
        }
        _ => Err(TransportError::ProtobufDecode {
            message: String::from("Envelope does not carry a session message"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

async fn send_envelope(write: &mut WsWrite, envelope: &WireEnvelope) -> Result<(), TransportError> {
    write
        .send(Message::Binary(envelope.encode_to_vec().into()))
        .await
        .map_err(|e| TransportError::Send {
            message: format!("Failed to send frame: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
