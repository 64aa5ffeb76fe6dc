use crate::modes::agent_credentials;

use common::RedactedToken;
use demo_core::config::AgentConfig;
use demo_core::{CredentialKind, CredentialStore};

/// **VALUE**: Verifies that the agent's handshake token and its source credential
/// stay separate.
///
/// **BUG THIS CATCHES**: Seeding the store with the handshake token made the agent
/// ignore the controller's `SourceToken`, so workers authenticated with the wrong secret.
#[test]
fn given_configured_auth_token_when_agent_credentials_built_then_store_starts_empty() {
    // GIVEN: An agent config with a handshake token
    let config = AgentConfig {
        auth_token: Some(String::from("handshake")),
        ..AgentConfig::default()
    };

    // WHEN: Building the agent's credentials
    let (credentials, auth_token) = agent_credentials(&config);

    // THEN: The listener gets the handshake token; the store waits for the controller
    assert_eq!(auth_token, RedactedToken::new("handshake"));
    assert!(!credentials.has_credential(CredentialKind::Token));

    credentials.set_credential(CredentialKind::Token, RedactedToken::new("c291cmNl"));
    assert_eq!(
        credentials.credential(CredentialKind::Token),
        Some(RedactedToken::new("c291cmNl"))
    );
}

#[test]
fn given_no_auth_token_when_agent_credentials_built_then_handshake_token_is_empty() {
    let (credentials, auth_token) = agent_credentials(&AgentConfig::default());

    assert!(auth_token.is_empty());
    assert!(!credentials.has_credential(CredentialKind::Token));
}
