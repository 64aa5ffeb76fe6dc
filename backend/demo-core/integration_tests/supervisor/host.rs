use crate::helpers::{CountingEngines, eventually};

use demo_core::credentials::MemoryCredentialStore;
use demo_core::supervisor::run_worker_loop;
use demo_core::transport::frame::write_frame;
use demo_core::wire::{WireCommand, WireSessionMessage};
use demo_core::{SessionState, SessionWorker};

use models::{ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, SessionMessage};

use std::sync::Arc;

use tokio::io::duplex;

/// **VALUE**: Verifies the worker process loop against a pipe, the way the agent feeds it.
///
/// **WHY THIS MATTERS**: A malformed frame must not kill the worker, and closing the
/// pipe must tear the broadcast down; otherwise a crashed agent leaves a source running.
#[tokio::test]
async fn given_frames_then_eof_when_worker_loop_runs_then_dispatches_and_tears_down() {
    // GIVEN: A worker and a pipe carrying a malformed frame, then StartSource
    let engines = Arc::new(CountingEngines::default());
    let worker = SessionWorker::new(Arc::new(MemoryCredentialStore::new()), engines.clone());
    let (mut agent_side, worker_side) = duplex(4096);

    let malformed = WireSessionMessage {
        capability_id: String::from("not-a-uuid"),
        command: WireCommand::StartSource as i32,
        arguments: Vec::new(),
    };
    let start = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl")
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");

    write_frame(&mut agent_side, &malformed).await.unwrap();
    write_frame(&mut agent_side, &WireSessionMessage::from(&start)).await.unwrap();
    drop(agent_side);

    // WHEN: Running the loop to completion
    let result = run_worker_loop(worker_side, &worker).await;

    // THEN: Clean exit, source was started and then torn down
    assert!(result.is_ok());
    assert_eq!(engines.counters.broadcasts_started(), 1);
    assert_eq!(engines.counters.broadcasts_stopped(), 1);
    assert_eq!(worker.source_state(), SessionState::Idle);
}

#[tokio::test]
async fn given_truncated_frame_when_worker_loop_runs_then_returns_error() {
    use tokio::io::AsyncWriteExt;

    let worker = SessionWorker::new(
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(CountingEngines::default()),
    );
    let (mut agent_side, worker_side) = duplex(64);
    agent_side.write_u32(16).await.unwrap();
    agent_side.write_all(&[0, 1]).await.unwrap();
    drop(agent_side);

    assert!(run_worker_loop(worker_side, &worker).await.is_err());
}

/// **VALUE**: Verifies that a frame whose payload is not a protobuf message is skipped
/// while the pipe stays open.
///
/// **BUG THIS CATCHES**: Treating a decode failure like a read failure ends the loop and
/// tears down a running source even though the agent is still connected.
#[tokio::test]
async fn given_undecodable_frame_while_source_active_when_worker_loop_runs_then_source_survives() {
    use tokio::io::AsyncWriteExt;

    // GIVEN: A worker loop reading from a pipe the agent keeps open
    let engines = Arc::new(CountingEngines::default());
    let worker = SessionWorker::new(Arc::new(MemoryCredentialStore::new()), engines.clone());
    let (mut agent_side, worker_side) = duplex(4096);

    let start = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl")
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz");
    let viewer = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
        .with_argument(ArgumentKey::SourceHostAddress, "203.0.113.7");

    let agent = async {
        // WHEN: StartSource, a garbage frame, then StartViewer arrive
        write_frame(&mut agent_side, &WireSessionMessage::from(&start)).await.unwrap();
        agent_side.write_u32(3).await.unwrap();
        agent_side.write_all(&[0xff, 0xff, 0xff]).await.unwrap();
        agent_side.flush().await.unwrap();
        write_frame(&mut agent_side, &WireSessionMessage::from(&viewer)).await.unwrap();

        // THEN: The frame after the garbage is dispatched and the source is untouched
        assert!(eventually(|| engines.counters.viewers_started() == 1).await);
        assert_eq!(engines.counters.broadcasts_started(), 1);
        assert_eq!(engines.counters.broadcasts_stopped(), 0);
        assert_eq!(worker.source_state(), SessionState::Active);

        drop(agent_side);
    };

    let (result, ()) = tokio::join!(run_worker_loop(worker_side, &worker), agent);

    // THEN: Teardown only happens once the pipe closes
    assert!(result.is_ok());
    assert_eq!(engines.counters.broadcasts_stopped(), 1);
    assert_eq!(worker.source_state(), SessionState::Idle);
}
