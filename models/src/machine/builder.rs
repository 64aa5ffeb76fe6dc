use crate::error::model_error::ModelError;
use crate::{ErrorLocation, Machine};

use std::panic::Location;

/// Builder for creating validated Machine instances.
///
/// The name defaults to the address when not given.
#[derive(Debug, Default)]
pub struct MachineBuilder {
    name: Option<String>,
    address: Option<String>,
}

impl MachineBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Build the Machine with validation.
    #[track_caller]
    pub fn build(self) -> Result<Machine, ModelError> {
        let address = self.address.ok_or_else(|| ModelError::Validation {
            message: String::from("Address is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let address = address.trim().to_string();
        if address.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Address cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if address.chars().any(char::is_whitespace) {
            return Err(ModelError::Validation {
                message: format!("Address cannot contain whitespace: {address}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ModelError::Validation {
                    message: String::from("Machine name cannot be empty"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Some(name) => name,
            None => address.clone(),
        };

        Ok(Machine { name, address })
    }
}
