//! Fetching web pages for URL mode, and scraping their `<title>`.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, Url};

use crate::error::{DriveError, Result};

/// A `<title>` element, case-insensitive, spanning lines.
static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("Invalid title regex")
});

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("Invalid entity regex")
});

/// A downloaded HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub title: String,
    pub body: Vec<u8>,
}

/// Validate a URL given on the command line.
///
/// Only absolute `http`/`https` URLs are accepted.
pub fn parse_url(link: &str) -> Result<Url> {
    let url = Url::parse(link.trim())
        .map_err(|e| DriveError::FetchError(format!("invalid URL {:?}: {}", link, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DriveError::FetchError(format!(
            "unsupported URL scheme {:?} in {}",
            other, link
        ))),
    }
}

/// Text of every `<title>` element on the page, concatenated in document
/// order, with entities decoded.
///
/// Returns an empty string when the page has no title.
pub fn extract_title(html: &str) -> String {
    TITLE_REGEX
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .map(|m| decode_entities(m.as_str()))
        .collect()
}

fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_entity(entity),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Downloads pages over HTTP.
#[derive(Clone, Default)]
pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Fetch a page and scrape its title.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        tracing::debug!(%url, "fetching page");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DriveError::FetchError(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::FetchError(format!("{}: status {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DriveError::FetchError(format!("{}: {}", url, e)))?
            .to_vec();
        let title = extract_title(&String::from_utf8_lossy(&body));

        tracing::debug!(%url, bytes = body.len(), %title, "page fetched");
        Ok(FetchedPage {
            title,
            body,
        })
    }
}
