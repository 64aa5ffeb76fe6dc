//! Tracks which target machines are still viewing a broadcast.
//!
//! The broadcast source on the controller's machine stays up exactly as
//! long as this set is non-empty, so every mutation reports whether it was
//! the one that drained the set.

use std::collections::HashSet;
use std::sync::Mutex;

/// Outcome of removing addresses from the membership set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Members remain after the removal.
    Remaining(usize),
    /// This removal emptied the set.
    Drained,
    /// The set was already empty before the removal.
    AlreadyEmpty,
}

impl Release {
    /// Whether the broadcast source should be stopped after this release.
    pub fn source_unused(&self) -> bool {
        matches!(self, Release::Drained | Release::AlreadyEmpty)
    }
}

#[derive(Debug, Default)]
pub struct MembershipTracker {
    members: Mutex<HashSet<String>>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add addresses; returns the member count afterwards.
    pub fn join<I, S>(&self, addresses: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members = self.lock();
        members.extend(addresses.into_iter().map(Into::into));
        members.len()
    }

    /// Remove addresses under a single lock acquisition.
    pub fn release<I, S>(&self, addresses: I) -> Release
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members = self.lock();
        if members.is_empty() {
            return Release::AlreadyEmpty;
        }

        for address in addresses {
            members.remove(address.as_ref());
        }

        match members.len() {
            0 => Release::Drained,
            remaining => Release::Remaining(remaining),
        }
    }

    /// Keep only members for which `keep` returns true; returns the removed
    /// addresses together with the release outcome.
    pub fn retain<F>(&self, mut keep: F) -> (Vec<String>, Release)
    where
        F: FnMut(&str) -> bool,
    {
        let mut members = self.lock();
        if members.is_empty() {
            return (Vec::new(), Release::AlreadyEmpty);
        }

        let removed: Vec<String> = members
            .iter()
            .filter(|address| !keep(address.as_str()))
            .cloned()
            .collect();
        for address in &removed {
            members.remove(address);
        }

        let release = match members.len() {
            0 => Release::Drained,
            remaining => Release::Remaining(remaining),
        };
        (removed, release)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of the current members.
    pub fn snapshot(&self) -> Vec<String> {
        let mut members: Vec<String> = self.lock().iter().cloned().collect();
        members.sort();
        members
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set is still a valid set; keep tracking rather than lose members
        self.members
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
