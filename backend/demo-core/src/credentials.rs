//! In-memory credential store.
//!
//! Each role process owns one instance and hands it to the handlers that
//! need it, so concurrent sessions never share an ambient credential.

use crate::collaborators::{CredentialKind, CredentialStore};

use common::RedactedToken;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::debug;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<HashMap<CredentialKind, RedactedToken>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic while the map is held cannot leave it half-written, so a
    /// poisoned lock is recovered rather than treated as empty.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<CredentialKind, RedactedToken>> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn has_credential(&self, kind: CredentialKind) -> bool {
        self.lock().contains_key(&kind)
    }

    fn set_credential(&self, kind: CredentialKind, value: RedactedToken) {
        debug!("Installing {kind:?} credential ({} bytes)", value.len());
        self.lock().insert(kind, value);
    }

    fn credential(&self, kind: CredentialKind) -> Option<RedactedToken> {
        self.lock().get(&kind).cloned()
    }
}
