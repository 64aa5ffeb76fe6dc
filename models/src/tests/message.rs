use crate::{ArgumentKey, ArgumentValue, BROADCAST_VIEWER, Command, SessionMessage};

/// **VALUE**: Verifies that setting an existing key replaces its value without
/// moving it.
///
/// **WHY THIS MATTERS**: Arguments are an ordered mapping. The agent relies on
/// replacement semantics when it stamps the source host address.
#[test]
fn given_existing_argument_when_set_again_then_value_replaced_in_place() {
    // GIVEN: A message with two arguments
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::SourceHostAddress, "198.51.100.1")
        .with_argument(ArgumentKey::ViewerIsFullscreen, true);

    // WHEN: Setting the first key again
    let message = message.with_argument(ArgumentKey::SourceHostAddress, "203.0.113.7");

    // THEN: Same length, same order, new value
    assert_eq!(message.arguments().len(), 2);
    assert_eq!(message.arguments()[0].0, ArgumentKey::SourceHostAddress);
    assert_eq!(
        message.text(ArgumentKey::SourceHostAddress),
        Some("203.0.113.7")
    );
}

#[test]
fn given_argument_of_other_kind_when_read_typed_then_absent() {
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerIsFullscreen, "yes")
        .with_argument(ArgumentKey::ViewerAccessToken, false);

    assert_eq!(message.flag(ArgumentKey::ViewerIsFullscreen), None);
    assert_eq!(message.text(ArgumentKey::ViewerAccessToken), None);
    assert_eq!(
        message.argument(ArgumentKey::ViewerIsFullscreen),
        Some(&ArgumentValue::Text(String::from("yes")))
    );
}

/// **VALUE**: Verifies that Debug output lists argument keys but never values.
///
/// **BUG THIS CATCHES**: Messages are logged with `{:?}` on every hop; a derived Debug
/// would write both session tokens into every log file.
#[test]
fn given_message_with_token_when_debug_formatted_then_value_hidden() {
    let message = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
        .with_argument(ArgumentKey::ViewerAccessToken, "dG9wLXNlY3JldA==");

    let debug = format!("{:?}", message);

    assert!(debug.contains("ViewerAccessToken"));
    assert!(debug.contains("StartViewer"));
    assert!(!debug.contains("dG9wLXNlY3JldA=="));
}
