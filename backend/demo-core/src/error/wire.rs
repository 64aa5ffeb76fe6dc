use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Failures converting between wire frames and session messages.
#[derive(Debug, ThisError)]
pub enum WireError {
    #[error("Invalid Capability Id Error: {value} {location}")]
    InvalidCapabilityId {
        value: String,
        location: ErrorLocation,
        #[source]
        source: uuid::Error,
    },

    #[error("Unknown Command Error: {value} {location}")]
    UnknownCommand { value: i32, location: ErrorLocation },

    #[error("Unknown Argument Key Error: {value} {location}")]
    UnknownArgumentKey { value: i32, location: ErrorLocation },

    #[error("Missing Argument Value Error: {message} {location}")]
    MissingArgumentValue {
        message: String,
        location: ErrorLocation,
    },

    #[error("Missing Payload Error: {message} {location}")]
    MissingPayload {
        message: String,
        location: ErrorLocation,
    },
}
