use crate::{BROADCAST_SOURCE, BROADCAST_VIEWER, Capability, FULLSCREEN_DEMO, WINDOW_DEMO};

use uuid::Uuid;

/// **VALUE**: Verifies that no two well-known capabilities share an id.
///
/// **WHY THIS MATTERS**: The capability id is the sole routing key. A collision would
/// send viewer commands to the source handler (or vice versa) on every role.
#[test]
fn given_well_known_capabilities_when_compared_then_all_ids_are_distinct() {
    let all = [FULLSCREEN_DEMO, WINDOW_DEMO, BROADCAST_SOURCE, BROADCAST_VIEWER];

    for (i, a) in all.iter().enumerate() {
        for b in all.iter().skip(i + 1) {
            assert_ne!(a.uid(), b.uid(), "{a} and {b} share an id");
        }
    }
}

#[test]
fn given_capabilities_when_checking_triggerable_then_only_demo_modes_are() {
    assert!(FULLSCREEN_DEMO.is_triggerable());
    assert!(WINDOW_DEMO.is_triggerable());
    assert!(!BROADCAST_SOURCE.is_triggerable());
    assert!(!BROADCAST_VIEWER.is_triggerable());
}

#[test]
fn given_known_uid_when_looked_up_then_returns_capability() {
    assert_eq!(
        Capability::from_uid(BROADCAST_VIEWER.uid()),
        Some(BROADCAST_VIEWER)
    );
    assert_eq!(Capability::from_uid(Uuid::new_v4()), None);
}

#[test]
fn given_capability_when_compared_with_uuid_then_matches_on_uid() {
    assert!(BROADCAST_SOURCE == BROADCAST_SOURCE.uid());
    assert!(BROADCAST_SOURCE != BROADCAST_VIEWER.uid());
}
