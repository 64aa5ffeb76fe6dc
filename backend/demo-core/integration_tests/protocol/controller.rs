use crate::helpers::{RecordingTransport, machine, machines};

use demo_core::Controller;

use models::{
    ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Command, FULLSCREEN_DEMO, SessionMessage,
    WINDOW_DEMO,
};

use std::sync::Arc;

use uuid::Uuid;

const OWN: &str = "192.168.1.10";

fn controller() -> (Controller, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    (Controller::new(transport.clone()), transport)
}

fn commands(messages: &[SessionMessage]) -> Vec<Command> {
    messages.iter().map(SessionMessage::command).collect()
}

/// **VALUE**: Verifies the message fan-out of a fullscreen demo start.
///
/// **WHY THIS MATTERS**: The source on the controller's own machine must receive both
/// tokens, and every target must receive the access token with the fullscreen flag.
/// The controller must never stamp a source address; agents derive it themselves.
#[test]
fn given_two_targets_when_fullscreen_demo_started_then_source_and_viewers_are_started() {
    // GIVEN: A controller and two targets
    let (controller, transport) = controller();
    let targets = machines(&["10.0.0.1", "10.0.0.2"]);

    // WHEN: Starting a fullscreen demo
    let handled = controller.start_session(FULLSCREEN_DEMO.uid(), &targets, &machine(OWN));

    // THEN: StartSource to own machine, StartViewer to each target
    assert!(handled);
    let tokens = controller.current_tokens().expect("tokens stored after start");

    let to_own = transport.sent_to(OWN);
    assert_eq!(commands(&to_own), vec![Command::StartSource]);
    assert_eq!(to_own[0].capability_id(), BROADCAST_SOURCE.uid());
    assert_eq!(to_own[0].text(ArgumentKey::SourceToken), Some(tokens.source_token.as_str()));
    assert_eq!(
        to_own[0].text(ArgumentKey::ViewerAccessToken),
        Some(tokens.viewer_access_token.as_str())
    );

    for target in ["10.0.0.1", "10.0.0.2"] {
        let sent = transport.sent_to(target);
        assert_eq!(commands(&sent), vec![Command::StartViewer]);
        assert_eq!(sent[0].capability_id(), BROADCAST_VIEWER.uid());
        assert_eq!(
            sent[0].text(ArgumentKey::ViewerAccessToken),
            Some(tokens.viewer_access_token.as_str())
        );
        assert_eq!(sent[0].flag(ArgumentKey::ViewerIsFullscreen), Some(true));
        assert!(sent[0].argument(ArgumentKey::SourceHostAddress).is_none());
    }

    assert_eq!(controller.members(), vec!["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn given_window_demo_when_started_then_viewers_are_not_fullscreen() {
    let (controller, transport) = controller();

    controller.start_session(WINDOW_DEMO.uid(), &machines(&["10.0.0.1"]), &machine(OWN));

    let sent = transport.sent_to("10.0.0.1");
    assert_eq!(sent[0].flag(ArgumentKey::ViewerIsFullscreen), Some(false));
}

/// **VALUE**: Verifies that the source is stopped exactly once, after the last viewer.
///
/// **BUG THIS CATCHES**: Would catch stopping the source on the first acknowledgement
/// (cutting off the remaining viewer) or never stopping it (leaking the broadcast).
#[test]
fn given_two_members_when_stopped_one_at_a_time_then_stop_source_follows_second_only() {
    // GIVEN: A running session on A and B
    let (controller, transport) = controller();
    controller.start_session(FULLSCREEN_DEMO.uid(), &machines(&["10.0.0.1", "10.0.0.2"]), &machine(OWN));
    transport.clear();

    // WHEN: Stopping A
    assert!(controller.stop_session(FULLSCREEN_DEMO.uid(), &machines(&["10.0.0.1"]), &machine(OWN)));

    // THEN: No StopSource yet
    assert!(transport.sent_to(OWN).is_empty());
    assert_eq!(commands(&transport.sent_to("10.0.0.1")), vec![Command::StopViewer]);

    // WHEN: Stopping B
    assert!(controller.stop_session(FULLSCREEN_DEMO.uid(), &machines(&["10.0.0.2"]), &machine(OWN)));

    // THEN: Exactly one StopSource, and tokens are discarded
    let to_own = transport.sent_to(OWN);
    assert_eq!(commands(&to_own), vec![Command::StopSource]);
    assert_eq!(to_own[0].capability_id(), BROADCAST_SOURCE.uid());
    assert!(controller.members().is_empty());
    assert!(controller.current_tokens().is_none());
}

#[test]
fn given_no_session_when_stopped_then_stop_source_is_still_sent() {
    let (controller, transport) = controller();

    controller.stop_session(WINDOW_DEMO.uid(), &machines(&["10.0.0.1"]), &machine(OWN));

    assert_eq!(commands(&transport.sent_to(OWN)), vec![Command::StopSource]);
}

/// **VALUE**: Verifies that every session start issues a fresh, unrelated token pair.
///
/// **BUG THIS CATCHES**: Reusing tokens across sessions would let a viewer from an earlier
/// session connect to a later broadcast.
#[test]
fn given_two_starts_when_tokens_compared_then_no_value_is_shared() {
    let (controller, _transport) = controller();
    let targets = machines(&["10.0.0.1"]);

    controller.start_session(FULLSCREEN_DEMO.uid(), &targets, &machine(OWN));
    let first = controller.current_tokens().unwrap();
    controller.start_session(FULLSCREEN_DEMO.uid(), &targets, &machine(OWN));
    let second = controller.current_tokens().unwrap();

    let first = [first.source_token, first.viewer_access_token];
    let second = [second.source_token, second.viewer_access_token];
    for token in &first {
        assert!(!second.contains(token));
    }
}

#[test]
fn given_non_triggerable_or_unknown_capability_when_started_then_returns_false_without_sending() {
    let (controller, transport) = controller();
    let targets = machines(&["10.0.0.1"]);

    for capability_id in [BROADCAST_SOURCE.uid(), BROADCAST_VIEWER.uid(), Uuid::new_v4()] {
        assert!(!controller.start_session(capability_id, &targets, &machine(OWN)));
        assert!(!controller.stop_session(capability_id, &targets, &machine(OWN)));
    }

    assert!(transport.sent().is_empty());
    assert!(controller.members().is_empty());
    assert!(controller.current_tokens().is_none());
}

#[test]
fn given_no_targets_when_started_then_nothing_is_sent() {
    let (controller, transport) = controller();

    assert!(controller.start_session(FULLSCREEN_DEMO.uid(), &[], &machine(OWN)));

    assert!(transport.sent().is_empty());
    assert!(controller.current_tokens().is_none());
}

/// **VALUE**: Verifies that unreachable members are dropped and the source stopped.
///
/// **WHY THIS MATTERS**: A lost StopViewer would otherwise keep its machine in the
/// membership set forever and the source would never stop.
#[test]
fn given_members_when_reconciled_against_empty_reachable_set_then_source_is_stopped() {
    // GIVEN: A session on A and B
    let (controller, transport) = controller();
    controller.start_session(WINDOW_DEMO.uid(), &machines(&["10.0.0.1", "10.0.0.2"]), &machine(OWN));
    transport.clear();

    // WHEN: Only B is still reachable
    let removed = controller.reconcile(&machines(&["10.0.0.2"]), &machine(OWN));

    // THEN: A is dropped, source keeps running
    assert_eq!(removed, 1);
    assert_eq!(controller.members(), vec!["10.0.0.2"]);
    assert!(transport.sent_to(OWN).is_empty());

    // WHEN: Nothing is reachable
    let removed = controller.reconcile(&[], &machine(OWN));

    // THEN: Source is stopped
    assert_eq!(removed, 1);
    assert_eq!(commands(&transport.sent_to(OWN)), vec![Command::StopSource]);
}

#[test]
fn given_all_members_reachable_when_reconciled_then_nothing_happens() {
    let (controller, transport) = controller();
    controller.start_session(WINDOW_DEMO.uid(), &machines(&["10.0.0.1"]), &machine(OWN));
    transport.clear();

    assert_eq!(controller.reconcile(&machines(&["10.0.0.1"]), &machine(OWN)), 0);
    assert!(transport.sent().is_empty());
}

#[test]
fn given_any_message_when_received_from_worker_tier_then_controller_does_not_handle_it() {
    let (controller, _transport) = controller();
    let message = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopSource);

    assert!(!controller.on_message_from_worker_tier(&message));
}
