//! On-disk cache for the OAuth2 credential.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DriveError, Result};

/// Persisted authorization: access token, refresh token and expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// True if the access token is expired or expires within `leeway`.
    ///
    /// A credential without expiry never expires.
    pub fn expires_within(&self, leeway: Duration) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now() + leeway,
            None => false,
        }
    }
}

/// Reads and writes the credential cache file at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached credential.
    ///
    /// A missing or unparsable file yields [`DriveError::TokenNotFound`].
    pub fn load(&self) -> Result<Credential> {
        let not_found = || DriveError::TokenNotFound(self.path.display().to_string());

        let content = fs::read_to_string(&self.path).map_err(|e| {
            tracing::debug!(path = %self.path.display(), error = %e, "credential cache unreadable");
            not_found()
        })?;

        serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(path = %self.path.display(), error = %e, "credential cache invalid");
            not_found()
        })
    }

    /// Write the credential, replacing any previous content.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_private_dir(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        let json = serde_json::to_string(credential)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;

        tracing::debug!(path = %self.path.display(), "credential cached");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expiry: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "ya29.token".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry,
        }
    }

    #[test]
    fn test_expires_within() {
        let soon = credential(Some(Utc::now() + Duration::seconds(30)));
        assert!(soon.expires_within(Duration::seconds(60)));

        let later = credential(Some(Utc::now() + Duration::hours(1)));
        assert!(!later.expires_within(Duration::seconds(60)));

        assert!(!credential(None).expires_within(Duration::seconds(60)));
    }

    #[test]
    fn test_reads_oauth2_library_format() {
        let json = r#"{
            "access_token": "ya29.a0",
            "token_type": "Bearer",
            "refresh_token": "1//0g",
            "expiry": "2017-05-03T21:32:44.516148632+02:00"
        }"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("1//0g"));
        assert!(credential.expiry.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join(".credentials");
        let store = CredentialStore::new(cache_dir.join("drog-drive.json"));

        store.save(&credential(None)).unwrap();

        let dir_mode = fs::metadata(&cache_dir).unwrap().permissions().mode();
        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
