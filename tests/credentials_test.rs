//! Tests for the on-disk credential cache.

use std::fs;

use chrono::{TimeZone, Utc};
use drog::credentials::{Credential, CredentialStore};
use drog::DriveError;
use tempfile::tempdir;

fn credential() -> Credential {
    Credential {
        access_token: "ya29.a0AfH6".to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: Some("1//0gLx".to_string()),
        expiry: Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
    }
}

#[test]
fn save_then_load_returns_same_credential() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("token.json"));

    store.save(&credential()).unwrap();

    assert_eq!(store.load().unwrap(), credential());
}

#[test]
fn save_without_optional_fields() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("token.json"));
    let bare = Credential {
        access_token: "tok".to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: None,
        expiry: None,
    };

    store.save(&bare).unwrap();

    assert_eq!(store.load().unwrap(), bare);
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("home").join(".credentials").join("drog-drive.json");
    let store = CredentialStore::new(&path);

    store.save(&credential()).unwrap();

    assert!(path.is_file());
}

#[test]
fn save_overwrites_previous_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("token.json");
    fs::write(&path, "x".repeat(4096)).unwrap();
    let store = CredentialStore::new(&path);

    store.save(&credential()).unwrap();

    assert_eq!(store.load().unwrap(), credential());
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("absent.json"));

    let err = store.load().unwrap_err();
    assert!(matches!(err, DriveError::TokenNotFound(_)));
}

#[test]
fn invalid_content_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("token.json");
    fs::write(&path, b"not valid json").unwrap();
    let store = CredentialStore::new(&path);

    let err = store.load().unwrap_err();
    assert!(matches!(err, DriveError::TokenNotFound(_)));
}

#[test]
fn json_without_access_token_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("token.json");
    fs::write(&path, br#"{"refresh_token": "1//x"}"#).unwrap();

    let err = CredentialStore::new(&path).load().unwrap_err();
    assert!(matches!(err, DriveError::TokenNotFound(_)));
}
