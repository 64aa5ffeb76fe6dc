//! Domain models for demo sessions.
//!
//! Pure data passed between the controller, per-machine agents and session
//! workers. Nothing in here talks to the network or spawns processes.

pub mod capability;
pub mod error;
pub mod machine;
pub mod message;

pub use capability::{
    BROADCAST_SOURCE, BROADCAST_VIEWER, Capability, FULLSCREEN_DEMO, WINDOW_DEMO,
};
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use machine::Machine;
pub use machine::builder::MachineBuilder;
pub use message::{ArgumentKey, ArgumentValue, Command, SessionMessage};

#[cfg(test)]
mod tests;
