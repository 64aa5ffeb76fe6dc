use demo::console::run_console;

use demo_core::{Controller, TransportLink};
use models::{
    BROADCAST_SOURCE, BROADCAST_VIEWER, Command, Machine, MachineBuilder, SessionMessage,
};

use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(SessionMessage, String)>>,
}

impl TransportLink for RecordingTransport {
    fn send(&self, message: &SessionMessage, destination: &Machine) {
        self.sent
            .lock()
            .unwrap()
            .push((message.clone(), destination.address.clone()));
    }
}

impl RecordingTransport {
    fn commands_to(&self, address: &str) -> Vec<(uuid::Uuid, Command)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, destination)| destination == address)
            .map(|(message, _)| (message.capability_id(), message.command()))
            .collect()
    }
}

fn own() -> Machine {
    MachineBuilder::default()
        .with_address("192.168.1.10")
        .build()
        .unwrap()
}

async fn run_script(script: &str, controller: &Controller) -> String {
    let mut output = Vec::new();
    run_console(script.as_bytes(), &mut output, controller, &own())
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

/// **VALUE**: Drives a whole session through the console as an operator would.
///
/// **WHY THIS MATTERS**: `stop` carries no mode; the console must reuse the mode of the
/// last `start`, or the controller rejects the stop and the source keeps running.
#[tokio::test]
async fn given_start_members_stop_script_when_run_then_session_starts_and_drains() {
    // GIVEN: A controller over a recording transport
    let transport = Arc::new(RecordingTransport::default());
    let controller = Controller::new(transport.clone());

    // WHEN: Running a scripted session
    let output = run_script(
        "start window 10.0.0.1 10.0.0.2\nmembers\nstop 10.0.0.1 10.0.0.2\nmembers\nquit\nmembers\n",
        &controller,
    )
    .await;

    // THEN: Replies for each command up to quit
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "start Window demo: ok",
            "members: 10.0.0.1 10.0.0.2",
            "stop Window demo: ok",
            "members: none",
        ]
    );

    // AND: The source was started and stopped on the own machine
    assert_eq!(
        transport.commands_to("192.168.1.10"),
        vec![
            (BROADCAST_SOURCE.uid(), Command::StartSource),
            (BROADCAST_SOURCE.uid(), Command::StopSource),
        ]
    );
    assert_eq!(
        transport.commands_to("10.0.0.1"),
        vec![
            (BROADCAST_VIEWER.uid(), Command::StartViewer),
            (BROADCAST_VIEWER.uid(), Command::StopViewer),
        ]
    );
}

#[tokio::test]
async fn given_bad_line_when_run_then_error_reported_and_console_continues() {
    let transport = Arc::new(RecordingTransport::default());
    let controller = Controller::new(transport.clone());

    let output = run_script("launch 10.0.0.1\nstart fullscreen 10.0.0.1\n", &controller).await;

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error: Console Error: Unknown command 'launch'"));
    assert_eq!(controller.members(), vec!["10.0.0.1"]);
}

#[tokio::test]
async fn given_unreachable_member_when_reconciled_then_source_is_stopped() {
    let transport = Arc::new(RecordingTransport::default());
    let controller = Controller::new(transport.clone());

    let output = run_script("start fullscreen 10.0.0.1\nreconcile\n", &controller).await;

    assert!(output.contains("reconcile: 1 member(s) dropped"));
    assert_eq!(
        transport.commands_to("192.168.1.10").last(),
        Some(&(BROADCAST_SOURCE.uid(), Command::StopSource))
    );
}
