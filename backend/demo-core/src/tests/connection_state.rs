// Unit tests for the listener's private per-connection auth state

use crate::transport::connection_state::ConnectionState;

use common::RedactedToken;

#[test]
fn given_matching_token_when_validated_then_connection_is_authenticated() {
    let mut state = ConnectionState::new(RedactedToken::new("agent-secret"));
    assert!(!state.is_authenticated());

    assert!(state.validate_token("agent-secret"));
    assert!(state.is_authenticated());
}

#[test]
fn given_wrong_token_when_validated_then_connection_stays_unauthenticated() {
    let mut state = ConnectionState::new(RedactedToken::new("agent-secret"));

    assert!(!state.validate_token("guess"));
    assert!(!state.is_authenticated());
}

/// **VALUE**: Verifies that an agent without a configured token accepts nobody.
///
/// **BUG THIS CATCHES**: Would catch an empty expected token matching an empty
/// handshake token, which would open the agent to any peer.
#[test]
fn given_empty_expected_token_when_empty_token_presented_then_rejected() {
    let mut state = ConnectionState::new(RedactedToken::new(""));

    assert!(!state.validate_token(""));
    assert!(!state.is_authenticated());
}
