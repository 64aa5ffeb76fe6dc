use crate::RedactedToken;

/// **VALUE**: Verifies that Debug and Display never print the token value.
///
/// **WHY THIS MATTERS**: Session state (including the current token pair) is logged at
/// debug level by every role. A token in a log file lets anyone reading the log
/// impersonate a viewer or the broadcast source.
///
/// **BUG THIS CATCHES**: Would catch a derived `Debug` sneaking back in.
#[test]
fn given_token_when_formatted_then_value_is_hidden() {
    // GIVEN: A token with a recognisable value
    let token = RedactedToken::new("c2VjcmV0LXZhbHVl");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{:?}", token);
    let display = format!("{}", token);

    // THEN: Neither contains the value
    assert!(!debug.contains("c2VjcmV0LXZhbHVl"));
    assert!(!display.contains("c2VjcmV0LXZhbHVl"));
    assert!(debug.contains("REDACTED"));
    assert!(display.contains("REDACTED"));
}

/// **VALUE**: Verifies that serde serialization is refused.
///
/// **WHY THIS MATTERS**: Configuration and diagnostics are serialized to JSON; a token
/// embedded in one of those structures must fail loudly instead of landing on disk.
#[test]
fn given_token_when_serialized_then_returns_error() {
    // GIVEN: A token
    let token = RedactedToken::new("abc");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&token);

    // THEN: Serialization fails with the redaction message
    let err = result.expect_err("serialization must be refused");
    assert!(err.to_string().contains("cannot be serialized"));
}

#[test]
fn given_two_tokens_with_same_value_when_compared_then_equal() {
    let a = RedactedToken::from("same");
    let b = RedactedToken::from(String::from("same"));

    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
    assert!(!a.is_empty());
    assert_eq!(a.as_str(), "same");
}
