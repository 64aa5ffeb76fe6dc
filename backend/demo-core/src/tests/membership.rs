use crate::membership::{MembershipTracker, Release};

#[test]
fn given_duplicate_addresses_when_joined_then_counted_once() {
    let tracker = MembershipTracker::new();

    let count = tracker.join(["10.0.0.1", "10.0.0.2", "10.0.0.1"]);

    assert_eq!(count, 2);
    assert_eq!(tracker.snapshot(), vec!["10.0.0.1", "10.0.0.2"]);
}

/// **VALUE**: Verifies the release outcomes that decide when the source stops.
///
/// **WHY THIS MATTERS**: The source must keep running while any viewer remains and stop
/// as soon as the last one is released. Reporting `Drained` too early cuts off viewers;
/// never reporting it leaks a running source.
#[test]
fn given_two_members_when_released_one_by_one_then_only_last_release_drains() {
    // GIVEN: Two members
    let tracker = MembershipTracker::new();
    tracker.join(["10.0.0.1", "10.0.0.2"]);

    // WHEN/THEN: First release leaves one, second drains, third finds it empty
    assert_eq!(tracker.release(["10.0.0.1"]), Release::Remaining(1));
    assert_eq!(tracker.release(["10.0.0.2"]), Release::Drained);
    assert_eq!(tracker.release(["10.0.0.2"]), Release::AlreadyEmpty);
    assert!(tracker.is_empty());
}

#[test]
fn given_unknown_address_when_released_then_members_unchanged() {
    let tracker = MembershipTracker::new();
    tracker.join(["10.0.0.1"]);

    assert_eq!(tracker.release(["10.9.9.9"]), Release::Remaining(1));
    assert_eq!(tracker.len(), 1);
}

#[test]
fn given_members_when_retained_then_removed_addresses_reported() {
    let tracker = MembershipTracker::new();
    tracker.join(["10.0.0.1", "10.0.0.2", "10.0.0.3"]);

    let (mut removed, release) = tracker.retain(|address| address == "10.0.0.2");
    removed.sort();

    assert_eq!(removed, vec!["10.0.0.1", "10.0.0.3"]);
    assert_eq!(release, Release::Remaining(1));
    assert_eq!(tracker.snapshot(), vec!["10.0.0.2"]);
}

#[test]
fn given_release_outcomes_when_checked_then_only_empty_outcomes_free_the_source() {
    assert!(!Release::Remaining(3).source_unused());
    assert!(Release::Drained.source_unused());
    assert!(Release::AlreadyEmpty.source_unused());
}
