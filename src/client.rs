//! Google Drive API client for creating converted documents.

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tokio_util::io::ReaderStream;

use crate::auth::Session;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileMetadata};
use crate::upload::{UploadContent, UploadRequest};

/// Upload URL for Google Drive API.
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields requested for the created file.
const FILE_FIELDS: &str = "id, name, mimeType, webViewLink";

/// Client for creating documents in the user's Drive.
pub struct DriveClient {
    session: Session,
    http: Client,
    upload_base: String,
}

impl DriveClient {
    /// Create a client for the public Drive endpoint.
    pub fn new(session: Session) -> Self {
        Self::with_base_url(session, UPLOAD_API_BASE)
    }

    /// Create a client for another upload endpoint (e.g. a local mock).
    pub fn with_base_url(session: Session, upload_base: impl Into<String>) -> Self {
        Self {
            session,
            http: Client::new(),
            upload_base: upload_base.into(),
        }
    }

    /// Create a document from the request's content, asking Drive to convert
    /// it into the Google type the extension classifies to.
    pub async fn create_document(&self, request: UploadRequest) -> Result<FileMetadata> {
        let classification = request.classification();
        let token = self.session.access_token().await?;

        let metadata = serde_json::json!({
            "name": request.title,
            "mimeType": classification.target.mime_type(),
        });

        let len = request.content.len();
        if request.content.is_empty() {
            tracing::warn!(title = %request.title, "uploading empty content");
        }

        let metadata_part = Part::text(metadata.to_string())
            .mime_str("application/json; charset=UTF-8")?;

        let file_part = match request.content {
            UploadContent::File { file, name, .. } => {
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
                    .file_name(name)
            }
            UploadContent::Bytes(bytes) => Part::bytes(bytes).file_name(request.title.clone()),
        }
        .mime_str(classification.source_mime)?;

        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        tracing::info!(
            title = %request.title,
            source_mime = classification.source_mime,
            target = classification.target.mime_type(),
            len,
            "uploading"
        );

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let metadata: FileMetadata = response.json().await?;
        Ok(metadata)
    }
}

/// Turn a non-success response into [`DriveError::ApiError`], preferring
/// Google's error message over the raw body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

#[cfg(test)]
mod tests {
    // Tests are in tests/client_test.rs
}
