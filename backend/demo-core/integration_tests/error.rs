use demo_core::error::CoreError;
use demo_core::error::supervisor::SupervisorError;
use demo_core::error::transport::TransportError;
use demo_core::wire::WireSessionMessage;

use common::ErrorLocation;
use models::SessionMessage;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

use uuid::Uuid;

/// **VALUE**: Verifies that `?` on an io error records where it was propagated.
///
/// **WHY THIS MATTERS**: Transport failures bubble up through several async layers; the
/// location in the message is the only pointer to the read or write that failed.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from the `From`
/// impl, which would make every io error report the same line inside the error module.
#[test]
fn given_io_error_when_converted_then_location_points_at_conversion_site() {
    // GIVEN: An io error
    let io_err = IoError::new(ErrorKind::BrokenPipe, "pipe closed");

    // WHEN: Converting it here
    let err: TransportError = io_err.into();

    // THEN: The location is this file
    let error_string = err.to_string();
    assert!(error_string.contains("IO Error"));
    assert!(error_string.contains("pipe closed"));
    assert!(error_string.contains("error.rs"));
}

#[test]
fn given_malformed_wire_message_when_converted_then_error_names_value_and_has_source() {
    let wire = WireSessionMessage {
        capability_id: String::from("zzz"),
        command: 1,
        arguments: Vec::new(),
    };

    let err = SessionMessage::try_from(wire).unwrap_err();

    assert!(err.to_string().contains("Invalid Capability Id Error: zzz"));
    assert!(err.source().is_some());
}

#[test]
#[track_caller]
fn given_spawn_error_when_formatted_then_includes_message_location_and_source() {
    let err = SupervisorError::Spawn {
        message: String::from("Failed to spawn worker"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "binary not found")),
    };

    let error_string = err.to_string();
    assert!(error_string.contains("Spawn Error"));
    assert!(error_string.contains("Failed to spawn worker"));
    assert!(error_string.contains("error.rs"));
    assert_eq!(err.source().unwrap().to_string(), "binary not found");
}

#[test]
fn given_layer_error_when_wrapped_in_core_error_then_display_is_unchanged() {
    let capability_id = Uuid::new_v4();
    let err = SupervisorError::NotRunning {
        capability_id,
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = err.to_string();

    let core: CoreError = err.into();

    assert_eq!(core.to_string(), expected);
    assert!(core.to_string().contains(&capability_id.to_string()));
}
