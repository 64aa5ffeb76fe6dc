use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line and column.
///
/// **WHY THIS MATTERS**: Every error variant in the workspace carries an ErrorLocation.
/// If capture breaks, a refused viewer start or a failed worker spawn can no longer be
/// traced back to the line that raised it.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN/WHEN: Capturing the current location
    let expected_line = line!() + 1;
    let location = ErrorLocation::from(Location::caller());

    // THEN: File, line and column are populated
    assert!(location.file.contains("error_location.rs"));
    assert_eq!(location.line, expected_line);
    assert!(location.column > 0);
}

/// **VALUE**: Verifies the "[file:line:column]" Display format.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops the brackets or one of
/// the three coordinates, which every `{location}` in an error message relies on.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    let location = ErrorLocation::from(Location::caller());

    let formatted = format!("{}", location);

    assert!(formatted.starts_with('['));
    assert!(formatted.ends_with(']'));
    assert!(formatted.contains("error_location.rs"));
    assert!(formatted.contains(&format!(":{}:{}]", location.line, location.column)));
    assert_eq!(formatted.matches(':').count(), 2);
}

/// **VALUE**: Verifies that `#[track_caller]` helpers report their caller's line.
///
/// **WHY THIS MATTERS**: Error-producing helpers in demo-core are `#[track_caller]`; the
/// location must point at the call site, not at the helper body.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    let first = capture_location();
    let second = capture_location();

    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}
