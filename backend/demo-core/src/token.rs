//! Per-session token generation.

use common::RedactedToken;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Random bytes per token before base64 encoding.
pub const TOKEN_CHALLENGE_SIZE: usize = 128;

/// The two credentials scoped to one broadcast session.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    /// Lets viewers authenticate against the machine running the source.
    pub source_token: RedactedToken,
    /// Lets the worker accept incoming viewer connections.
    pub viewer_access_token: RedactedToken,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokenIssuer;

impl TokenIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh, independent token pair from the OS generator.
    pub fn issue(&self) -> SessionTokens {
        SessionTokens {
            source_token: generate_token(),
            viewer_access_token: generate_token(),
        }
    }
}

fn generate_token() -> RedactedToken {
    let mut challenge = [0u8; TOKEN_CHALLENGE_SIZE];
    OsRng.fill_bytes(&mut challenge);
    let token = RedactedToken::new(STANDARD.encode(challenge));
    challenge.fill(0);
    token
}
