//! Well-known capability identities.
//!
//! A capability names one controllable feature. Its UUID is the only thing
//! messages are routed on; the label exists for presentation.

use std::fmt;

use uuid::{Uuid, uuid};

/// Fullscreen demo, triggered by an operator on the controller.
pub const FULLSCREEN_DEMO: Capability = Capability::new(
    uuid!("7b6231bd-eb89-45d3-af32-f70663b2f878"),
    "Fullscreen demo",
    true,
);

/// Window demo, triggered by an operator on the controller.
pub const WINDOW_DEMO: Capability = Capability::new(
    uuid!("ae45c3db-dc2e-4204-ae8b-374cdab8c62c"),
    "Window demo",
    true,
);

/// Broadcast source, runs on the controller's own machine.
pub const BROADCAST_SOURCE: Capability = Capability::new(
    uuid!("e4b6e743-1f5b-491d-9364-e091086200f4"),
    "Broadcast source",
    false,
);

/// Broadcast viewer, runs on every target machine.
pub const BROADCAST_VIEWER: Capability = Capability::new(
    uuid!("7b68b525-1114-4aea-8d42-ab4f26bbf5e5"),
    "Broadcast viewer",
    false,
);

#[derive(Debug, Clone, Copy)]
pub struct Capability {
    uid: Uuid,
    label: &'static str,
    triggerable: bool,
}

impl Capability {
    const fn new(uid: Uuid, label: &'static str, triggerable: bool) -> Self {
        Self {
            uid,
            label,
            triggerable,
        }
    }

    pub const fn uid(&self) -> Uuid {
        self.uid
    }

    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// True for the capabilities an operator can start from the controller.
    pub const fn is_triggerable(&self) -> bool {
        self.triggerable
    }

    /// Look up one of the well-known capabilities by id.
    pub fn from_uid(uid: Uuid) -> Option<Capability> {
        [FULLSCREEN_DEMO, WINDOW_DEMO, BROADCAST_SOURCE, BROADCAST_VIEWER]
            .into_iter()
            .find(|capability| capability.uid == uid)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Capability {}

impl PartialEq<Uuid> for Capability {
    fn eq(&self, other: &Uuid) -> bool {
        self.uid == *other
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.uid)
    }
}
