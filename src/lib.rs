//! drog - upload files, piped text and web pages to Google Drive as Google documents.
//!
//! The source's extension decides both the MIME type sent on the wire and the
//! Google document type (Docs, Sheets, Slides, Drawings) Drive converts it into.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use drog::auth::InteractiveCodePrompt;
//! use drog::notify::SilentNotifier;
//! use drog::prompt::TerminalPrompter;
//! use drog::upload::{Invocation, Orchestrator, TitleSpec};
//! use drog::{Authenticator, ClientConfig, CredentialStore, DriveClient, PageFetcher, Reporter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_file("client_secret.json")?;
//!     let invocation = Invocation::Path {
//!         path: PathBuf::from("report.xlsx"),
//!         title: TitleSpec::Literal("Q1".to_string()),
//!     };
//!
//!     let prompter = TerminalPrompter;
//!     let request = Orchestrator::new(&prompter, PageFetcher::new())
//!         .prepare(invocation, tokio::io::empty())
//!         .await?;
//!
//!     let auth = Authenticator::new(config, CredentialStore::new("token.json"));
//!     let session = auth
//!         .get_session(&mut InteractiveCodePrompt::new(&prompter))
//!         .await?;
//!     let created = DriveClient::new(session).create_document(request).await?;
//!     Reporter::new(Box::new(SilentNotifier)).report(&created);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod classify;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod prompt;
pub mod report;
pub mod upload;

// Re-exports for convenience
pub use auth::{Authenticator, Session};
pub use classify::{classify, valid_for_streamed_input, Classification, DocumentKind};
pub use client::DriveClient;
pub use config::ClientConfig;
pub use credentials::{Credential, CredentialStore};
pub use error::{DriveError, Result};
pub use fetch::PageFetcher;
pub use models::FileMetadata;
pub use report::Reporter;
pub use upload::{compose_title, Invocation, UploadRequest, MARKER_SUFFIX};
