// Unit tests for error module
// Tests conversion of library errors and location tracking

use crate::error::DemoError;

use common::ErrorLocation;
use demo_core::error::config::ConfigError;
use demo_core::error::transport::TransportError;
use models::MachineBuilder;

use std::panic::Location;

/// **VALUE**: Verifies that converting a core error records the conversion site.
///
/// **WHY THIS MATTERS**: The binary reports every failure once, at exit. Without the
/// location of the `?` that surfaced it, a transport failure in agent start-up looks
/// the same as one in the controller.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` missing on the chained `From`
/// impls, which would point every core error at the error module itself.
#[test]
fn given_transport_error_when_converted_then_core_error_located_here() {
    // GIVEN: A transport error
    let err = TransportError::Connect {
        message: String::from("refused"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Converting to DemoError
    let demo = DemoError::from(err);

    // THEN: Core variant, source message kept, located in this file
    let DemoError::Core { message, location } = &demo else {
        panic!("expected Core variant, got {demo:?}");
    };
    assert!(message.contains("Connect Error: refused"));
    assert!(location.file.ends_with("tests/error.rs"));
}

#[test]
fn given_config_error_when_converted_then_config_variant() {
    let err = ConfigError::ValidationError {
        reason: String::from("agent.port must be non-zero"),
        location: ErrorLocation::from(Location::caller()),
    };

    let demo = DemoError::from(err);

    assert!(matches!(demo, DemoError::Config { .. }));
    assert!(demo.to_string().contains("agent.port must be non-zero"));
}

#[test]
fn given_invalid_machine_when_converted_then_console_variant() {
    let err = MachineBuilder::default().with_address("   ").build().unwrap_err();

    let demo = DemoError::from(err);

    assert!(matches!(demo, DemoError::Console { .. }));
    assert!(demo.to_string().contains("Address cannot be empty"));
}
