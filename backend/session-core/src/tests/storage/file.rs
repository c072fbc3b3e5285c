use crate::AUTH_TOKEN_STORAGE_KEY;
use crate::storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use common::BearerToken;

use tempfile::TempDir;

/// **VALUE**: Verifies the single slot round trip on disk.
///
/// **WHY THIS MATTERS**: The persisted slot is how a valid session survives a restart.
///
/// **BUG THIS CATCHES**: Would catch writing under the wrong name or leaving the temp file.
#[test]
fn given_saved_token_when_loading_then_returns_same_token() {
    // GIVEN: File storage in a fresh directory (created on first save)
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path().join("nested"));

    // WHEN: Saving then loading
    storage.save(&BearerToken::new("persisted")).expect("save");
    let loaded = storage.load().expect("load");

    // THEN: Same token, stored under the fixed key
    assert_eq!(loaded, Some(BearerToken::new("persisted")));
    assert!(storage.path().ends_with(AUTH_TOKEN_STORAGE_KEY));
    assert!(!dir.path().join("nested").join(format!("{AUTH_TOKEN_STORAGE_KEY}.tmp")).exists());
}

#[test]
fn given_second_save_when_loading_then_only_latest_token_is_held() {
    // GIVEN: Two consecutive saves
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());
    storage.save(&BearerToken::new("first")).expect("save first");
    storage.save(&BearerToken::new("second")).expect("save second");

    // WHEN/THEN: The slot holds the last one
    assert_eq!(storage.load().expect("load"), Some(BearerToken::new("second")));
}

/// **VALUE**: Verifies missing and empty files read as "no token".
///
/// **BUG THIS CATCHES**: Would catch a fresh install failing initialization with a read error.
#[test]
fn given_missing_or_blank_file_when_loading_then_returns_none() {
    // GIVEN: No file, then a whitespace-only file
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());
    let missing = storage.load().expect("load missing");
    std::fs::write(storage.path(), "  \n").expect("write blank");

    // WHEN: Loading the blank file
    let blank = storage.load().expect("load blank");

    // THEN: Both are None
    assert!(missing.is_none());
    assert!(blank.is_none());
}

#[test]
fn given_no_file_when_removing_then_succeeds() {
    // GIVEN: Storage with nothing persisted
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());

    // WHEN/THEN: Remove is a no-op, and remove after save empties the slot
    storage.remove().expect("remove missing");
    storage.save(&BearerToken::new("t")).expect("save");
    storage.remove().expect("remove existing");
    assert!(storage.load().expect("load").is_none());
}

#[cfg(unix)]
#[test]
fn given_saved_token_when_checking_permissions_then_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    // GIVEN: A saved token
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());
    storage.save(&BearerToken::new("secret")).expect("save");

    // WHEN: Reading the mode
    let mode = std::fs::metadata(storage.path()).expect("metadata").permissions().mode();

    // THEN: 0600
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn given_memory_storage_when_saving_and_removing_then_slot_follows() {
    // GIVEN: Memory storage seeded with a token
    let storage = MemoryTokenStorage::with_token("seed");
    assert_eq!(storage.peek().as_deref(), Some("seed"));

    // WHEN: Overwriting, then removing
    storage.save(&BearerToken::new("next")).expect("save");
    let after_save = storage.peek();
    storage.remove().expect("remove");

    // THEN
    assert_eq!(after_save.as_deref(), Some("next"));
    assert!(storage.peek().is_none());
    assert!(storage.load().expect("load").is_none());
}
