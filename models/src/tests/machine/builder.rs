use crate::{MachineBuilder, ModelError};

/// **VALUE**: Verifies that a machine cannot be built without an address.
///
/// **WHY THIS MATTERS**: The address is the membership key and the transport destination.
/// A machine without one could join a session and never be released from it.
#[test]
fn given_missing_address_when_building_machine_then_returns_validation_error() {
    // GIVEN: Builder with only a name
    let builder = MachineBuilder::default().with_name("lab-pc-01");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Address is required");
        }
    }
}

#[test]
fn given_blank_address_when_building_machine_then_returns_validation_error() {
    let result = MachineBuilder::default().with_address("   ").build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Address cannot be empty");
        }
    }
}

/// **VALUE**: Verifies that addresses with embedded whitespace are rejected.
///
/// **BUG THIS CATCHES**: The controller console splits on whitespace; an address that
/// contains a space would otherwise become a membership key no stop command can name.
#[test]
fn given_address_with_inner_whitespace_when_building_then_returns_validation_error() {
    let result = MachineBuilder::default()
        .with_address("10.0.0.1 10.0.0.2")
        .build();

    assert!(result.is_err());
}

/// **VALUE**: Verifies that the name falls back to the address and surrounding
/// whitespace is trimmed.
#[test]
fn given_address_only_when_building_then_name_defaults_to_address() {
    // GIVEN: Builder with a padded address
    let builder = MachineBuilder::default().with_address(" 192.0.2.10 ");

    // WHEN: Building
    let machine = builder.build().expect("valid machine");

    // THEN: Address trimmed, name mirrors it
    assert_eq!(machine.address, "192.0.2.10");
    assert_eq!(machine.name, "192.0.2.10");
    assert_eq!(machine.to_string(), "192.0.2.10");
}

#[test]
fn given_name_and_address_when_building_then_display_includes_both() {
    let machine = MachineBuilder::default()
        .with_name("lab-pc-01")
        .with_address("192.0.2.11")
        .build()
        .expect("valid machine");

    assert_eq!(machine.to_string(), "lab-pc-01 (192.0.2.11)");
}

#[test]
fn given_blank_name_when_building_then_returns_validation_error() {
    let result = MachineBuilder::default()
        .with_name("")
        .with_address("192.0.2.12")
        .build();

    assert!(result.is_err());
}
