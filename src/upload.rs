//! Resolving an invocation into an upload request.
//!
//! Each invocation mode (local path, piped stdin, web page) yields exactly one
//! [`UploadRequest`]: the final title, the extension used for classification
//! and the content to send.

use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::classify::{
    classify, extension_of, normalize_extension, valid_for_streamed_input, Classification,
};
use crate::error::{DriveError, Result};
use crate::fetch::{parse_url, PageFetcher};
use crate::prompt::Prompter;

/// Appended to every uploaded title to mark documents created by drog.
pub const MARKER_SUFFIX: &str = "  drogpost";

/// Argument value that triggers an interactive prompt.
pub const ASK: &str = "-ask";

/// Title argument (URL mode) that selects the page's own `<title>`.
pub const ON_PAGE: &str = "-onpage";

/// Extension of fetched pages.
pub const HTML_EXTENSION: &str = ".html";

const TITLE_PROMPT: &str = "Please enter the title";
const DEFAULT_TITLE: &str = "any title";
const EXTENSION_PROMPT: &str = "Please enter the file extension";
const DEFAULT_EXTENSION: &str = ".txt";

/// How the upload title is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSpec {
    Literal(String),
    Ask,
    OnPage,
}

impl TitleSpec {
    /// Interpret a title argument. `-onpage` only has a meaning in URL mode;
    /// elsewhere it is an ordinary title.
    pub fn from_arg(arg: &str, url_mode: bool) -> Self {
        match arg {
            ASK => TitleSpec::Ask,
            ON_PAGE if url_mode => TitleSpec::OnPage,
            _ => TitleSpec::Literal(arg.to_string()),
        }
    }
}

/// How the extension of piped content is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSpec {
    Literal(String),
    Ask,
}

impl ExtensionSpec {
    pub fn from_arg(arg: &str) -> Self {
        if arg == ASK {
            ExtensionSpec::Ask
        } else {
            ExtensionSpec::Literal(arg.to_string())
        }
    }
}

/// One of the three mutually exclusive invocation modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Path { path: PathBuf, title: TitleSpec },
    Stream { title: TitleSpec, extension: ExtensionSpec },
    Url { url: String, title: TitleSpec },
}

/// Append the marker suffix to a title.
pub fn compose_title(title: &str) -> String {
    format!("{}{}", title, MARKER_SUFFIX)
}

/// Bytes to upload.
#[derive(Debug)]
pub enum UploadContent {
    /// An opened local file, streamed during the upload.
    File { file: File, name: String, len: u64 },
    /// Content already held in memory (stdin, fetched pages).
    Bytes(Vec<u8>),
}

impl UploadContent {
    /// Number of bytes that will be sent.
    pub fn len(&self) -> u64 {
        match self {
            UploadContent::File { len, .. } => *len,
            UploadContent::Bytes(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully resolved upload: consumed once by the Drive client.
#[derive(Debug)]
pub struct UploadRequest {
    /// Final title, marker suffix included.
    pub title: String,
    /// Normalized extension the request is classified by.
    pub extension: String,
    pub content: UploadContent,
}

impl UploadRequest {
    /// Build a request from the user's title; the marker suffix is added here.
    pub fn new(title: &str, extension: &str, content: UploadContent) -> Self {
        Self {
            title: compose_title(title),
            extension: extension.to_string(),
            content,
        }
    }

    pub fn classification(&self) -> Classification {
        classify(&self.extension)
    }
}

/// Picks the content source for an invocation and resolves titles and extensions.
pub struct Orchestrator<'a> {
    prompter: &'a dyn Prompter,
    fetcher: PageFetcher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(prompter: &'a dyn Prompter, fetcher: PageFetcher) -> Self {
        Self { prompter, fetcher }
    }

    /// Resolve an invocation into a request. `stdin` is only read in stream mode.
    ///
    /// Nothing here talks to Drive: an invalid extension or unreadable file is
    /// reported before any authentication or upload happens.
    pub async fn prepare<R>(&self, invocation: Invocation, stdin: R) -> Result<UploadRequest>
    where
        R: AsyncRead + Unpin,
    {
        match invocation {
            Invocation::Path { path, title } => self.prepare_path(path, title).await,
            Invocation::Stream { title, extension } => {
                self.prepare_stream(title, extension, stdin).await
            }
            Invocation::Url { url, title } => self.prepare_url(&url, title).await,
        }
    }

    async fn prepare_path(&self, path: PathBuf, title: TitleSpec) -> Result<UploadRequest> {
        let file_error = |source: std::io::Error| DriveError::FileError {
            path: path.display().to_string(),
            source,
        };

        let file = File::open(&path).await.map_err(file_error)?;
        let metadata = file.metadata().await.map_err(file_error)?;
        if !metadata.is_file() {
            return Err(file_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let title = self.resolve_title(title, DEFAULT_TITLE)?;
        let extension = extension_of(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| title.clone());

        tracing::debug!(path = %path.display(), %extension, len = metadata.len(), "prepared file upload");
        Ok(UploadRequest::new(
            &title,
            &extension,
            UploadContent::File {
                file,
                name,
                len: metadata.len(),
            },
        ))
    }

    async fn prepare_stream<R>(
        &self,
        title: TitleSpec,
        extension: ExtensionSpec,
        mut stdin: R,
    ) -> Result<UploadRequest>
    where
        R: AsyncRead + Unpin,
    {
        let title = self.resolve_title(title, DEFAULT_TITLE)?;
        let raw_extension = match extension {
            ExtensionSpec::Literal(ext) => ext,
            ExtensionSpec::Ask => self.prompter.ask(EXTENSION_PROMPT, DEFAULT_EXTENSION)?,
        };

        let extension = normalize_extension(&raw_extension);
        if !valid_for_streamed_input(&extension) {
            return Err(DriveError::InvalidExtension(raw_extension));
        }

        let mut content = Vec::new();
        stdin.read_to_end(&mut content).await?;

        tracing::debug!(%extension, len = content.len(), "prepared stdin upload");
        Ok(UploadRequest::new(
            &title,
            &extension,
            UploadContent::Bytes(content),
        ))
    }

    async fn prepare_url(&self, link: &str, title: TitleSpec) -> Result<UploadRequest> {
        let url = parse_url(link)?;
        let page = self.fetcher.fetch(&url).await?;

        let title = match title {
            TitleSpec::OnPage => page.title,
            other => self.resolve_title(other, &page.title)?,
        };

        Ok(UploadRequest::new(
            &title,
            HTML_EXTENSION,
            UploadContent::Bytes(page.body),
        ))
    }

    fn resolve_title(&self, title: TitleSpec, default: &str) -> Result<String> {
        match title {
            TitleSpec::Literal(title) => Ok(title),
            TitleSpec::Ask => self.prompter.ask(TITLE_PROMPT, default),
            TitleSpec::OnPage => Ok(ON_PAGE.to_string()),
        }
    }
}
