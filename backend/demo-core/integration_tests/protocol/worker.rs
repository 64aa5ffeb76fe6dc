use crate::helpers::CountingEngines;

use demo_core::credentials::MemoryCredentialStore;
use demo_core::{CredentialKind, CredentialStore, SessionState, SessionWorker};

use common::RedactedToken;
use models::{ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, SessionMessage};

use std::sync::Arc;

use uuid::Uuid;

struct Fixture {
    worker: SessionWorker,
    engines: Arc<CountingEngines>,
    credentials: Arc<MemoryCredentialStore>,
}

fn fixture() -> Fixture {
    let engines = Arc::new(CountingEngines::default());
    let credentials = Arc::new(MemoryCredentialStore::new());
    Fixture {
        worker: SessionWorker::new(credentials.clone(), engines.clone()),
        engines,
        credentials,
    }
}

fn start_source() -> SessionMessage {
    SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl")
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
}

fn start_viewer() -> SessionMessage {
    SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
        .with_argument(ArgumentKey::ViewerIsFullscreen, true)
        .with_argument(ArgumentKey::SourceHostAddress, "203.0.113.7")
}

/// **VALUE**: Verifies that a repeated StartSource is a successful no-op.
///
/// **BUG THIS CATCHES**: Constructing a second broadcast engine while the first is live
/// would capture the screen twice and orphan the first engine.
#[test]
fn given_active_source_when_started_again_then_single_engine_and_true() {
    // GIVEN: An idle worker
    let f = fixture();
    assert_eq!(f.worker.source_state(), SessionState::Idle);

    // WHEN: Starting twice
    assert!(f.worker.on_message(&start_source()));
    assert!(f.worker.on_message(&start_source()));

    // THEN: Active, one engine
    assert_eq!(f.worker.source_state(), SessionState::Active);
    assert_eq!(f.engines.counters.broadcasts_started(), 1);
    assert_eq!(
        f.credentials.credential(CredentialKind::Token),
        Some(RedactedToken::new("YWNjZXNz"))
    );
}

#[test]
fn given_idle_viewer_when_stopped_then_returns_true() {
    let f = fixture();
    let stop = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopViewer);

    assert!(f.worker.on_message(&stop));
    assert!(f.worker.on_message(&stop));

    assert_eq!(f.worker.viewer_state(), SessionState::Idle);
    assert_eq!(f.engines.counters.viewers_stopped(), 0);
}

#[test]
fn given_start_viewer_when_handled_then_engine_gets_host_and_mode() {
    let f = fixture();

    assert!(f.worker.on_message(&start_viewer()));

    assert_eq!(f.worker.viewer_state(), SessionState::Active);
    assert_eq!(f.worker.viewer_source_host().as_deref(), Some("203.0.113.7"));
    assert_eq!(
        f.engines.counters.last_viewer(),
        Some((String::from("203.0.113.7"), true))
    );
}

#[test]
fn given_active_viewer_when_stopped_then_engine_is_shut_down_once() {
    let f = fixture();
    f.worker.on_message(&start_viewer());
    let stop = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopViewer);

    assert!(f.worker.on_message(&stop));
    assert!(f.worker.on_message(&stop));

    assert_eq!(f.worker.viewer_state(), SessionState::Idle);
    assert_eq!(f.engines.counters.viewers_stopped(), 1);
}

#[test]
fn given_start_viewer_without_source_host_when_handled_then_returns_false() {
    let f = fixture();
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");

    assert!(!f.worker.on_message(&message));
    assert_eq!(f.worker.viewer_state(), SessionState::Idle);
    assert_eq!(f.engines.counters.viewers_started(), 0);
}

#[test]
fn given_command_for_other_capability_when_handled_then_returns_false() {
    let f = fixture();

    let wrong_pairs = [
        SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartViewer),
        SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopViewer),
        SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartSource),
        SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopSource),
    ];

    for message in &wrong_pairs {
        assert!(!f.worker.on_message(message));
    }
    assert_eq!(f.worker.source_state(), SessionState::Idle);
    assert_eq!(f.worker.viewer_state(), SessionState::Idle);
}

#[test]
fn given_unknown_capability_when_handled_then_no_state_changes() {
    let f = fixture();
    let message = SessionMessage::new(Uuid::new_v4(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl")
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");

    assert!(!f.worker.on_message(&message));

    assert_eq!(f.worker.source_state(), SessionState::Idle);
    assert_eq!(f.engines.counters.broadcasts_started(), 0);
    assert!(!f.credentials.has_credential(CredentialKind::Token));
}

/// **VALUE**: Verifies that dropping the worker releases every live engine.
///
/// **WHY THIS MATTERS**: When the agent closes the pipe the worker process tears down;
/// a broadcast engine that survives teardown would keep capturing the screen.
#[test]
fn given_active_source_and_viewer_when_worker_dropped_then_both_engines_shut_down() {
    let f = fixture();
    f.worker.on_message(&start_source());
    f.worker.on_message(&start_viewer());
    let counters = Arc::clone(&f.engines.counters);

    drop(f);

    assert_eq!(counters.broadcasts_stopped(), 1);
    assert_eq!(counters.viewers_stopped(), 1);
}
