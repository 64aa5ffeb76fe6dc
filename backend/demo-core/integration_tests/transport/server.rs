use crate::helpers::{FakeSupervisor, eventually};

use demo_core::config::AgentConfig;
use demo_core::credentials::MemoryCredentialStore;
use demo_core::error::transport::TransportError;
use demo_core::log_policy::ConfiguredLevelPolicy;
use demo_core::transport::link::connect_and_authenticate;
use demo_core::transport::{AgentServerHandle, start_agent_server};
use demo_core::wire::WireEnvelope;
use demo_core::{Agent, Connection};

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_VIEWER, Command, SessionMessage};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use futures_util::SinkExt;
use log::LevelFilter;
use prost::Message as ProstMessage;
use tokio_tungstenite::tungstenite::Message;

const TEST_AUTH_TOKEN: &str = "test-token-12345";

async fn start_test_agent() -> (AgentServerHandle, Arc<FakeSupervisor>) {
    let supervisor = Arc::new(FakeSupervisor::default());
    let agent = Arc::new(Agent::new(
        supervisor.clone(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(ConfiguredLevelPolicy::new(LevelFilter::Info)),
    ));
    let config = AgentConfig {
        listen_address: String::from("127.0.0.1"),
        port: 0,
        auth_token: Some(TEST_AUTH_TOKEN.to_string()),
    };

    let handle = start_agent_server(&config, RedactedToken::new(TEST_AUTH_TOKEN), agent)
        .await
        .expect("agent listener should bind");
    (handle, supervisor)
}

/// **VALUE**: Verifies the agent listener end to end over a real WebSocket.
///
/// **WHY THIS MATTERS**: The source host a viewer connects to comes from the TCP peer
/// address of this connection. This test checks that the address survives the trip
/// through the listener into the agent.
#[tokio::test]
async fn given_authenticated_controller_when_start_viewer_sent_then_worker_gets_peer_address() {
    // GIVEN: A running agent listener and an authenticated connection
    let (handle, supervisor) = start_test_agent().await;
    let url = format!("ws://{}", handle.local_addr());
    let mut stream = connect_and_authenticate(&url, &RedactedToken::new(TEST_AUTH_TOKEN))
        .await
        .expect("authentication should succeed");

    // WHEN: Sending StartViewer
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
        .with_argument(ArgumentKey::ViewerIsFullscreen, false);
    let frame = WireEnvelope::session_message(&message).encode_to_vec();
    stream.send(Message::Binary(frame.into())).await.unwrap();

    // THEN: The worker receives it with the loopback address stamped
    assert!(eventually(|| supervisor.forwarded().len() == 1).await);
    let forwarded = supervisor.forwarded();
    assert_eq!(forwarded[0].text(ArgumentKey::SourceHostAddress), Some("127.0.0.1"));

    handle.shutdown();
}

#[tokio::test]
async fn given_wrong_token_when_connecting_then_auth_error_and_nothing_forwarded() {
    let (handle, supervisor) = start_test_agent().await;
    let url = format!("ws://{}", handle.local_addr());

    let result = connect_and_authenticate(&url, &RedactedToken::new("wrong-token")).await;

    assert!(matches!(result, Err(TransportError::Auth { .. })));
    assert!(supervisor.forwarded().is_empty());
    handle.shutdown();
}

#[test]
fn given_ipv4_mapped_peer_when_queried_then_plain_ipv4_is_returned() {
    let mapped = Ipv4Addr::new(203, 0, 113, 7).to_ipv6_mapped();
    let peer = demo_core::transport::PeerConnection::new(SocketAddr::new(IpAddr::V6(mapped), 4000));

    assert_eq!(
        peer.peer_address(),
        Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
    );
}

#[test]
fn given_unspecified_peer_when_queried_then_no_address() {
    let peer = demo_core::transport::PeerConnection::new(SocketAddr::new(
        IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        4000,
    ));

    assert_eq!(peer.peer_address(), None);
}
