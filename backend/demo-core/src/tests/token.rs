use crate::token::{TOKEN_CHALLENGE_SIZE, TokenIssuer};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

#[test]
fn given_issuer_when_issuing_then_tokens_decode_to_full_challenge() {
    let tokens = TokenIssuer::new().issue();

    let source = STANDARD.decode(tokens.source_token.as_str()).unwrap();
    let access = STANDARD.decode(tokens.viewer_access_token.as_str()).unwrap();

    assert_eq!(source.len(), TOKEN_CHALLENGE_SIZE);
    assert_eq!(access.len(), TOKEN_CHALLENGE_SIZE);
}

/// **VALUE**: Verifies that the two tokens of one pair are independent.
///
/// **BUG THIS CATCHES**: Deriving the access token from the source token (or reusing one
/// buffer for both) would let any viewer that learns one credential present the other.
#[test]
fn given_issuer_when_issuing_then_source_and_access_tokens_differ() {
    let tokens = TokenIssuer::new().issue();

    assert_ne!(tokens.source_token, tokens.viewer_access_token);
}
