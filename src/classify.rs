//! Mapping from file extensions to upload MIME types and Google document types.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Google-native document type that Drive converts an upload into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Document,
    Spreadsheet,
    Presentation,
    Drawing,
}

impl DocumentKind {
    /// The `application/vnd.google-apps.*` MIME type requested as conversion target.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Document => "application/vnd.google-apps.document",
            DocumentKind::Spreadsheet => "application/vnd.google-apps.spreadsheet",
            DocumentKind::Presentation => "application/vnd.google-apps.presentation",
            DocumentKind::Drawing => "application/vnd.google-apps.drawing",
        }
    }
}

/// Source MIME type and conversion target for one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub source_mime: &'static str,
    pub target: DocumentKind,
}

const fn rule(source_mime: &'static str, target: DocumentKind) -> Classification {
    Classification {
        source_mime,
        target,
    }
}

/// Applied to every extension missing from the table.
pub const DEFAULT_RULE: Classification = rule("text/plain", DocumentKind::Document);

const XLS: &str = "application/vnd.ms-excel";
const PPT: &str = "application/vnd.ms-powerpoint";
const DOC: &str = "application/msword";

static RULES: LazyLock<HashMap<&'static str, Classification>> = LazyLock::new(|| {
    use DocumentKind::*;

    HashMap::from([
        (".csv", rule("text/csv", Spreadsheet)),
        (".xls", rule(XLS, Spreadsheet)),
        (".xlt", rule(XLS, Spreadsheet)),
        (".xla", rule(XLS, Spreadsheet)),
        (
            ".xlsx",
            rule(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                Spreadsheet,
            ),
        ),
        (
            ".ods",
            rule("application/vnd.oasis.opendocument.spreadsheet", Spreadsheet),
        ),
        (
            ".odg",
            rule("application/vnd.oasis.opendocument.graphics", Drawing),
        ),
        (".ppt", rule(PPT, Presentation)),
        (".pot", rule(PPT, Presentation)),
        (".pps", rule(PPT, Presentation)),
        (".ppa", rule(PPT, Presentation)),
        (
            ".pptx",
            rule(
                "application/vnd.openxmlformats-officedocument.presentationml.presentation",
                Presentation,
            ),
        ),
        (
            ".odp",
            rule("application/vnd.oasis.opendocument.presentation", Presentation),
        ),
        (".doc", rule(DOC, Document)),
        (".dot", rule(DOC, Document)),
        (
            ".docx",
            rule(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                Document,
            ),
        ),
        (".odt", rule("application/vnd.oasis.opendocument.text", Document)),
        (".pdf", rule("application/pdf", Document)),
        (".png", rule("image/png", Document)),
        (".jpg", rule("image/jpeg", Document)),
        (".jpeg", rule("image/jpeg", Document)),
        (".html", rule("text/html", Document)),
    ])
});

/// Extensions accepted when content arrives on stdin without a path.
const STREAMABLE: [&str; 3] = [".txt", ".html", ".csv"];

/// Resolve the source MIME type and conversion target for an extension.
///
/// Matching is exact: `.PDF` is not `.pdf`. Use [`normalize_extension`] first
/// when the extension comes from user input or a file name.
///
/// # Examples
///
/// ```
/// use drog::classify::{classify, DocumentKind};
///
/// let c = classify(".csv");
/// assert_eq!(c.source_mime, "text/csv");
/// assert_eq!(c.target, DocumentKind::Spreadsheet);
///
/// assert_eq!(classify(".unknown").source_mime, "text/plain");
/// ```
pub fn classify(extension: &str) -> Classification {
    RULES.get(extension).copied().unwrap_or(DEFAULT_RULE)
}

/// Whether piped stdin content may be uploaded with this extension.
pub fn valid_for_streamed_input(extension: &str) -> bool {
    STREAMABLE.contains(&extension)
}

/// Lowercase an extension and make sure it carries a leading dot.
///
/// An empty (or whitespace-only) input stays empty.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Extension of a path as `.ext`, or an empty string when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}
