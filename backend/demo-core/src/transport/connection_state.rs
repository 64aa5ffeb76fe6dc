//! Per-connection authentication state for the agent listener.

use common::RedactedToken;

/// Tracks whether a controller connection has presented the agent token.
pub(crate) struct ConnectionState {
    authenticated: bool,
    expected_token: RedactedToken,
}

impl ConnectionState {
    pub(crate) fn new(token: RedactedToken) -> Self {
        Self {
            authenticated: false,
            expected_token: token,
        }
    }

    /// Validate token and mark as authenticated if correct.
    pub(crate) fn validate_token(&mut self, token: &str) -> bool {
        if !self.expected_token.is_empty() && token == self.expected_token.as_str() {
            self.authenticated = true;
        }
        self.authenticated
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
