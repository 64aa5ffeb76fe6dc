//! Shared primitives for the demo session workspace.
//!
//! Everything here is used by more than one crate and has no knowledge of
//! the session protocol itself:
//!
//! - [`ErrorLocation`] - call-site capture embedded in every error variant
//! - [`RedactedToken`] - session secrets that never reach logs or serializers
//!
//! ## Architecture
//!
//! - **common** (this crate): Cross-cutting primitives
//! - **models**: Pure session data (capabilities, messages, machines)
//! - **demo-core**: Roles, transport and process supervision
//! - **demo**: Binary wiring everything together

pub mod error;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_token::RedactedToken;

#[cfg(test)]
mod tests;
