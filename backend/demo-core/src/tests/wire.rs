use crate::error::wire::WireError;
use crate::wire::{
    WireArgument, WireArgumentKey, WireCommand, WireSessionMessage, wire_argument,
};

use models::{ArgumentKey, BROADCAST_VIEWER, Command, SessionMessage};

use prost::Message as ProstMessage;
use uuid::Uuid;

#[test]
fn given_start_viewer_when_encoded_and_decoded_then_arguments_keep_order_and_kind() {
    // GIVEN: A StartViewer with text and flag arguments
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "YWNjZXNz")
        .with_argument(ArgumentKey::ViewerIsFullscreen, true);

    // WHEN: Going through protobuf bytes
    let bytes = WireSessionMessage::from(&message).encode_to_vec();
    let decoded = WireSessionMessage::decode(&bytes[..]).unwrap();
    let decoded = SessionMessage::try_from(decoded).unwrap();

    // THEN: Identical message
    assert_eq!(decoded, message);
    assert_eq!(decoded.flag(ArgumentKey::ViewerIsFullscreen), Some(true));
}

/// **VALUE**: Verifies that an unknown-but-valid capability id still decodes.
///
/// **WHY THIS MATTERS**: Routing, not decoding, decides what happens to unknown
/// capabilities: every role must see the message and answer "unhandled".
#[test]
fn given_unknown_capability_uuid_when_decoded_then_message_is_produced() {
    let unknown = Uuid::new_v4();
    let wire = WireSessionMessage {
        capability_id: unknown.to_string(),
        command: WireCommand::StopViewer as i32,
        arguments: Vec::new(),
    };

    let message = SessionMessage::try_from(wire).unwrap();

    assert_eq!(message.capability_id(), unknown);
}

#[test]
fn given_malformed_capability_id_when_decoded_then_returns_invalid_capability_error() {
    let wire = WireSessionMessage {
        capability_id: String::from("not-a-uuid"),
        command: WireCommand::StopViewer as i32,
        arguments: Vec::new(),
    };

    assert!(matches!(
        SessionMessage::try_from(wire),
        Err(WireError::InvalidCapabilityId { .. })
    ));
}

#[test]
fn given_unspecified_or_unknown_command_when_decoded_then_returns_unknown_command_error() {
    for command in [WireCommand::Unspecified as i32, 42] {
        let wire = WireSessionMessage {
            capability_id: BROADCAST_VIEWER.uid().to_string(),
            command,
            arguments: Vec::new(),
        };

        assert!(matches!(
            SessionMessage::try_from(wire),
            Err(WireError::UnknownCommand { value, .. }) if value == command
        ));
    }
}

#[test]
fn given_argument_without_value_when_decoded_then_returns_missing_value_error() {
    let wire = WireSessionMessage {
        capability_id: BROADCAST_VIEWER.uid().to_string(),
        command: WireCommand::StartViewer as i32,
        arguments: vec![WireArgument {
            key: WireArgumentKey::ViewerAccessToken as i32,
            value: None,
        }],
    };

    assert!(matches!(
        SessionMessage::try_from(wire),
        Err(WireError::MissingArgumentValue { .. })
    ));
}

#[test]
fn given_unknown_argument_key_when_decoded_then_returns_unknown_key_error() {
    let wire = WireSessionMessage {
        capability_id: BROADCAST_VIEWER.uid().to_string(),
        command: WireCommand::StartViewer as i32,
        arguments: vec![WireArgument {
            key: 99,
            value: Some(wire_argument::Value::Flag(true)),
        }],
    };

    assert!(matches!(
        SessionMessage::try_from(wire),
        Err(WireError::UnknownArgumentKey { value: 99, .. })
    ));
}
