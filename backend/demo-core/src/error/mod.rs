pub mod config;
pub mod supervisor;
pub mod transport;
pub mod wire;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Supervisor(#[from] supervisor::SupervisorError),

    #[error(transparent)]
    Transport(#[from] transport::TransportError),

    #[error(transparent)]
    Wire(#[from] wire::WireError),

    #[error(transparent)]
    Model(#[from] models::ModelError),
}
