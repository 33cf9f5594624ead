//! OAuth client configuration and default file locations.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DriveError, Result};

/// Client secret file name under the home directory.
pub const CLIENT_SECRET_FILE: &str = ".google_drive_client_secret.json";

/// Directory (under home) and file name of the credential cache.
pub const TOKEN_CACHE_DIR: &str = ".credentials";
pub const TOKEN_CACHE_FILE: &str = "drog-drive.json";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity, as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The console wraps the client under `installed` (desktop apps) or `web`.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientConfig>,
    web: Option<ClientConfig>,
}

impl ClientConfig {
    /// Read a client secret JSON file.
    ///
    /// Every failure (missing file, bad JSON, no client section) is a
    /// [`DriveError::ConfigError`] naming the path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DriveError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| DriveError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse the client secret JSON content.
    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" client section".to_string())
    }

    /// Redirect URI sent with the authorization request and the code exchange.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or("http://localhost")
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| DriveError::ConfigError("cannot determine home directory".to_string()))
}

/// `~/.google_drive_client_secret.json`
pub fn default_client_secret_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(CLIENT_SECRET_FILE))
}

/// `~/.credentials/drog-drive.json`
pub fn default_token_cache_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(TOKEN_CACHE_DIR).join(TOKEN_CACHE_FILE))
}
