use crate::helpers::{FakeSupervisor, eventually, machine};

use demo_core::config::AgentConfig;
use demo_core::credentials::MemoryCredentialStore;
use demo_core::log_policy::ConfiguredLevelPolicy;
use demo_core::transport::{WsTransportLink, start_agent_server};
use demo_core::{Agent, TransportLink};

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_VIEWER, Command, SessionMessage};

use std::sync::Arc;

use log::LevelFilter;

/// **VALUE**: Verifies that the controller-side link delivers messages in send order.
///
/// **BUG THIS CATCHES**: A StopViewer overtaking its StartViewer would leave a viewer
/// running on the target after the controller believes it stopped.
#[tokio::test]
async fn given_link_to_agent_when_start_then_stop_sent_then_agent_sees_both_in_order() {
    // GIVEN: An agent on an ephemeral loopback port
    let supervisor = Arc::new(FakeSupervisor::default());
    let agent = Arc::new(Agent::new(
        supervisor.clone(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(ConfiguredLevelPolicy::new(LevelFilter::Info)),
    ));
    let config = AgentConfig {
        listen_address: String::from("127.0.0.1"),
        port: 0,
        auth_token: Some(String::from("link-token")),
    };
    let handle = start_agent_server(&config, RedactedToken::new("link-token"), agent)
        .await
        .unwrap();
    let link = WsTransportLink::new(handle.local_addr().port(), RedactedToken::new("link-token"))
        .unwrap();

    // WHEN: Sending start and stop fire-and-forget
    let start = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");
    let stop = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopViewer);
    link.send(&start, &machine("127.0.0.1"));
    link.send(&stop, &machine("127.0.0.1"));
    link.close().await;

    // THEN: Both arrive, in order
    assert!(eventually(|| supervisor.forwarded().len() == 2).await);
    let commands: Vec<Command> = supervisor
        .forwarded()
        .iter()
        .map(SessionMessage::command)
        .collect();
    assert_eq!(commands, vec![Command::StartViewer, Command::StopViewer]);

    handle.shutdown();
}

#[test]
fn given_no_runtime_when_link_created_then_returns_error() {
    let result = WsTransportLink::new(11100, RedactedToken::new("token"));

    assert!(result.is_err());
}
