use crate::helpers::eventually;

use demo_core::WorkerProcessSupervisor;
use demo_core::error::supervisor::SupervisorError;
use demo_core::supervisor::ProcessSupervisor;

use models::{ArgumentKey, BROADCAST_SOURCE, Command, SessionMessage};

use std::ffi::OsString;

/// A stand-in worker that drains its stdin until the pipe closes; the
/// supervisor's own arguments land in `$0..` and are ignored.
#[cfg(unix)]
fn draining_worker() -> ProcessSupervisor {
    ProcessSupervisor::new(
        "sh",
        vec![OsString::from("-c"), OsString::from("cat >/dev/null")],
    )
    .unwrap()
}

/// **VALUE**: Verifies that a missing worker binary surfaces as a spawn error.
///
/// **BUG THIS CATCHES**: Would catch the supervisor recording a worker as running when
/// the process never started, after which every message would vanish silently.
#[tokio::test]
async fn given_missing_binary_when_worker_started_then_spawn_error_and_not_running() {
    let supervisor = ProcessSupervisor::new("/nonexistent/demo-worker", Vec::new()).unwrap();

    let result = supervisor.start(BROADCAST_SOURCE.uid());

    assert!(matches!(result, Err(SupervisorError::Spawn { .. })));
    assert!(!supervisor.is_running(BROADCAST_SOURCE.uid()));
}

#[tokio::test]
async fn given_no_worker_when_message_sent_then_not_running_error() {
    let supervisor = ProcessSupervisor::new("/nonexistent/demo-worker", Vec::new()).unwrap();
    let message = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopSource);

    let result = supervisor.send_message(&message);

    assert!(matches!(
        result,
        Err(SupervisorError::NotRunning { capability_id, .. }) if capability_id == BROADCAST_SOURCE.uid()
    ));
}

#[tokio::test]
async fn given_no_worker_when_stopped_then_ok() {
    let supervisor = ProcessSupervisor::new("/nonexistent/demo-worker", Vec::new()).unwrap();

    assert!(supervisor.stop(BROADCAST_SOURCE.uid()).is_ok());
}

#[test]
fn given_no_runtime_when_supervisor_created_then_returns_spawn_error() {
    let result = ProcessSupervisor::new("/nonexistent/demo-worker", Vec::new());

    assert!(matches!(result, Err(SupervisorError::Spawn { .. })));
}

/// **VALUE**: Verifies the full start, send and stop cycle against a real child process.
///
/// **BUG THIS CATCHES**: Every other supervisor test fails before a child exists, so a
/// broken liveness check or writer task would only show up on a live agent.
#[cfg(unix)]
#[tokio::test]
async fn given_live_child_when_started_sent_and_stopped_then_lifecycle_is_tracked() {
    // GIVEN: A supervisor whose workers read their pipe until it closes
    let supervisor = draining_worker();
    let capability_id = BROADCAST_SOURCE.uid();

    // WHEN: Starting the worker, twice
    supervisor.start(capability_id).unwrap();
    assert!(supervisor.is_running(capability_id));
    supervisor.start(capability_id).unwrap();

    // THEN: The second start reuses the live child and messages reach its pipe
    assert!(supervisor.is_running(capability_id));
    let message = SessionMessage::new(capability_id, Command::StartSource)
        .with_argument(ArgumentKey::SourceToken, "c291cmNl");
    assert!(supervisor.send_message(&message).is_ok());

    // WHEN: Stopping it
    supervisor.stop(capability_id).unwrap();

    // THEN: The worker is gone and further messages are refused
    assert!(!supervisor.is_running(capability_id));
    assert!(matches!(
        supervisor.send_message(&message),
        Err(SupervisorError::NotRunning { .. })
    ));
}

/// **VALUE**: Verifies that a worker which exits on its own is reported as stopped.
///
/// **BUG THIS CATCHES**: A dead child left in the table would make the agent forward
/// messages into a closed pipe instead of starting a fresh worker.
#[cfg(unix)]
#[tokio::test]
async fn given_child_that_exits_when_polled_then_not_running_and_restartable() {
    let supervisor =
        ProcessSupervisor::new("sh", vec![OsString::from("-c"), OsString::from("exit 0")]).unwrap();
    let capability_id = BROADCAST_SOURCE.uid();

    supervisor.start(capability_id).unwrap();

    assert!(eventually(|| !supervisor.is_running(capability_id)).await);
    assert!(matches!(
        supervisor.send_message(&SessionMessage::new(capability_id, Command::StopSource)),
        Err(SupervisorError::NotRunning { .. })
    ));
    assert!(supervisor.start(capability_id).is_ok());
}
