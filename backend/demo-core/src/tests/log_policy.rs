use crate::collaborators::{CredentialKind, CredentialStore, LogLevelPolicy};
use crate::credentials::MemoryCredentialStore;
use crate::log_policy::{ConfiguredLevelPolicy, MaxLevelPolicy};

use common::RedactedToken;

use log::LevelFilter;

#[test]
fn given_configured_level_when_queried_then_level_is_returned() {
    let policy = ConfiguredLevelPolicy::new(LevelFilter::Warn);

    assert_eq!(policy.current_level(), LevelFilter::Warn);
}

#[test]
fn given_max_level_policy_when_queried_then_follows_log_facade() {
    assert_eq!(MaxLevelPolicy.current_level(), log::max_level());
}

#[test]
fn given_empty_store_when_credential_set_then_it_can_be_read_back() {
    let store = MemoryCredentialStore::new();
    assert!(!store.has_credential(CredentialKind::Token));

    store.set_credential(CredentialKind::Token, RedactedToken::new("first"));
    store.set_credential(CredentialKind::Token, RedactedToken::new("second"));

    assert!(store.has_credential(CredentialKind::Token));
    assert_eq!(
        store.credential(CredentialKind::Token),
        Some(RedactedToken::new("second"))
    );
}

/// **VALUE**: Verifies that the store keeps working after a thread panics while
/// holding its lock.
///
/// **BUG THIS CATCHES**: A poisoned lock made the store report no credential and
/// silently drop every later install, so the worker would run with no token at all.
#[test]
fn given_poisoned_store_when_credential_used_then_reads_and_writes_still_apply() {
    // GIVEN: A store holding a token whose lock was poisoned by a panicking thread
    let store = MemoryCredentialStore::new();
    store.set_credential(CredentialKind::Token, RedactedToken::new("first"));
    std::thread::scope(|scope| {
        let poisoner = scope.spawn(|| {
            let _guard = store.lock();
            panic!("panic while holding the credential lock");
        });
        assert!(poisoner.join().is_err());
    });

    // WHEN: Reading and replacing the credential
    let before = store.has_credential(CredentialKind::Token);
    store.set_credential(CredentialKind::Token, RedactedToken::new("second"));

    // THEN: Both operations see the recovered map
    assert!(before);
    assert_eq!(
        store.credential(CredentialKind::Token),
        Some(RedactedToken::new("second"))
    );
}
