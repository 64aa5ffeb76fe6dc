use common::ErrorLocation;
use demo_core::error::CoreError;
use demo_core::error::config::ConfigError;
use demo_core::error::supervisor::SupervisorError;
use demo_core::error::transport::TransportError;
use models::ModelError;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the `demo` binary.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Error from this App
    #[error("Demo Error: {message} {location}")]
    Demo {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be located, loaded or validated
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Error from demo-core (transport, supervision, wire)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Unusable controller console input
    #[error("Console Error: {message} {location}")]
    Console {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for DemoError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        DemoError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for DemoError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        DemoError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<TransportError> for DemoError {
    #[track_caller]
    fn from(error: TransportError) -> Self {
        DemoError::from(CoreError::from(error))
    }
}

impl From<SupervisorError> for DemoError {
    #[track_caller]
    fn from(error: SupervisorError) -> Self {
        DemoError::from(CoreError::from(error))
    }
}

impl From<ModelError> for DemoError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        DemoError::Console {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
