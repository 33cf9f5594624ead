//! Error types for the drog crate.

use thiserror::Error;

/// Errors that can occur while preparing or performing an upload.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Invalid client configuration: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("No cached credential at {0}")]
    TokenNotFound(String),

    #[error("Cannot read file {path}: {source}")]
    FileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid extension for piped input: {0:?} (expected .txt, .html or .csv)")]
    InvalidExtension(String),

    #[error("Failed to fetch page: {0}")]
    FetchError(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Prompt failed: {0}")]
    PromptError(String),

    #[error("Invalid arguments: {0}")]
    InvalidInvocation(String),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
