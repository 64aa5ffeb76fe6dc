use crate::helpers::{FakeSupervisor, FixedPeer};

use demo_core::credentials::MemoryCredentialStore;
use demo_core::log_policy::ConfiguredLevelPolicy;
use demo_core::{Agent, CredentialKind, CredentialStore, WorkerProcessSupervisor};

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, SessionMessage};

use std::net::IpAddr;
use std::sync::Arc;

use log::LevelFilter;
use uuid::Uuid;

struct Fixture {
    agent: Agent,
    supervisor: Arc<FakeSupervisor>,
    credentials: Arc<MemoryCredentialStore>,
}

fn fixture_with(supervisor: FakeSupervisor, level: LevelFilter) -> Fixture {
    let supervisor = Arc::new(supervisor);
    let credentials = Arc::new(MemoryCredentialStore::new());
    let agent = Agent::new(
        supervisor.clone(),
        credentials.clone(),
        Arc::new(ConfiguredLevelPolicy::new(level)),
    );
    Fixture {
        agent,
        supervisor,
        credentials,
    }
}

fn fixture() -> Fixture {
    fixture_with(FakeSupervisor::default(), LevelFilter::Info)
}

fn peer(address: &str) -> FixedPeer {
    FixedPeer(Some(address.parse::<IpAddr>().unwrap()))
}

fn start_viewer() -> SessionMessage {
    SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
        .with_argument(ArgumentKey::ViewerIsFullscreen, true)
}

/// **VALUE**: Verifies that the agent stamps the source host from the connection.
///
/// **WHY THIS MATTERS**: The agent is the trust boundary. A sender that puts its own
/// `SourceHostAddress` into StartViewer must not be able to point viewers anywhere
/// but at the machine the request actually came from.
///
/// **BUG THIS CATCHES**: Would catch forwarding the inbound arguments unchanged, or
/// keeping the first `SourceHostAddress` instead of replacing it.
#[test]
fn given_start_viewer_with_forged_source_host_when_handled_then_peer_address_is_forwarded() {
    // GIVEN: A StartViewer carrying a forged source host, arriving from 203.0.113.7
    let f = fixture();
    let message = start_viewer().with_argument(ArgumentKey::SourceHostAddress, "198.51.100.99");

    // WHEN: The agent handles it
    let handled = f.agent.on_message(&message, Some(&peer("203.0.113.7")));

    // THEN: The viewer worker is started and receives the connection's address
    assert!(handled);
    assert_eq!(f.supervisor.starts(), vec![BROADCAST_VIEWER.uid()]);

    let forwarded = f.supervisor.forwarded();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].command(), Command::StartViewer);
    assert_eq!(forwarded[0].text(ArgumentKey::SourceHostAddress), Some("203.0.113.7"));
    assert_eq!(forwarded[0].text(ArgumentKey::ViewerAccessToken), Some("YWNjZXNz"));
    assert_eq!(forwarded[0].flag(ArgumentKey::ViewerIsFullscreen), Some(true));
}

#[test]
fn given_start_viewer_without_connection_when_handled_then_rejected_before_worker_starts() {
    let f = fixture();

    assert!(!f.agent.on_message(&start_viewer(), None));
    assert!(!f.agent.on_message(&start_viewer(), Some(&FixedPeer(None))));

    assert!(f.supervisor.starts().is_empty());
    assert!(f.supervisor.forwarded().is_empty());
}

/// **VALUE**: Verifies the same-machine guard and its debug-mode exception.
///
/// **BUG THIS CATCHES**: Would catch a machine that is broadcasting also starting a
/// viewer on its own stream, or the guard comparing log levels the wrong way round.
#[test]
fn given_running_source_when_start_viewer_arrives_then_refused_unless_debugging() {
    // GIVEN: A source already running, normal log level
    let f = fixture();
    f.supervisor.mark_running(BROADCAST_SOURCE.uid());

    // WHEN/THEN: Refused, no viewer worker
    assert!(!f.agent.on_message(&start_viewer(), Some(&peer("203.0.113.7"))));
    assert!(f.supervisor.starts().is_empty());
    assert!(f.supervisor.forwarded().is_empty());

    // GIVEN: Same situation at debug level
    let f = fixture_with(FakeSupervisor::default(), LevelFilter::Debug);
    f.supervisor.mark_running(BROADCAST_SOURCE.uid());

    // WHEN/THEN: Accepted
    assert!(f.agent.on_message(&start_viewer(), Some(&peer("203.0.113.7"))));
    assert_eq!(f.supervisor.starts(), vec![BROADCAST_VIEWER.uid()]);
}

#[test]
fn given_start_source_when_handled_then_worker_started_and_token_credential_installed() {
    let f = fixture();
    let message = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl")
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");

    assert!(f.agent.on_message(&message, None));

    assert_eq!(f.supervisor.starts(), vec![BROADCAST_SOURCE.uid()]);
    assert_eq!(f.supervisor.forwarded(), vec![message]);
    assert_eq!(
        f.credentials.credential(CredentialKind::Token),
        Some(RedactedToken::new("c291cmNl"))
    );
}

#[test]
fn given_existing_credential_when_start_source_handled_then_credential_is_kept() {
    let f = fixture();
    f.credentials
        .set_credential(CredentialKind::Token, RedactedToken::new("configured"));
    let message = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl");

    assert!(f.agent.on_message(&message, None));

    assert_eq!(
        f.credentials.credential(CredentialKind::Token),
        Some(RedactedToken::new("configured"))
    );
}

#[test]
fn given_running_worker_when_stop_viewer_handled_then_forwarded_without_restart() {
    let f = fixture();
    f.supervisor.mark_running(BROADCAST_VIEWER.uid());
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopViewer);

    assert!(f.agent.on_message(&message, None));

    assert!(f.supervisor.starts().is_empty());
    assert_eq!(f.supervisor.forwarded(), vec![message]);
}

#[test]
fn given_worker_that_fails_to_start_when_message_handled_then_returns_false() {
    let f = fixture_with(FakeSupervisor::failing(), LevelFilter::Info);
    let message = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource);

    assert!(!f.agent.on_message(&message, None));
    assert!(f.supervisor.forwarded().is_empty());
}

#[test]
fn given_unknown_capability_when_handled_then_returns_false_without_side_effects() {
    let f = fixture();
    let message = SessionMessage::new(Uuid::new_v4(), Command::StartViewer)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl");

    assert!(!f.agent.on_message(&message, Some(&peer("203.0.113.7"))));

    assert!(f.supervisor.starts().is_empty());
    assert!(f.supervisor.forwarded().is_empty());
    assert!(!f.credentials.has_credential(CredentialKind::Token));
}

#[test]
fn given_running_workers_when_agent_shut_down_then_workers_are_stopped() {
    let f = fixture();
    f.supervisor.mark_running(BROADCAST_SOURCE.uid());
    f.supervisor.mark_running(BROADCAST_VIEWER.uid());

    f.agent.shutdown();

    assert!(!f.supervisor.is_running(BROADCAST_SOURCE.uid()));
    assert!(!f.supervisor.is_running(BROADCAST_VIEWER.uid()));
}
