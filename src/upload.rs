//! Image upload — the CDN collaborator and its unsigned-preset HTTP client.
//!
//! DESIGN
//! ======
//! Both user-picked photos and rasterized board snapshots go through the
//! same [`ImageUploader`] seam. The concrete client posts a multipart form
//! (`file` + `upload_preset`) to an unsigned upload endpoint and expects a
//! JSON body carrying `secure_url`. No retries live here; a retry is the
//! user repeating the gesture.

use std::time::Duration;

use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The required configuration environment variable is not set.
    #[error("missing upload config: env var {var} not set")]
    MissingConfig { var: String },

    /// The HTTP request to the CDN failed.
    #[error("upload request failed: {0}")]
    Request(String),

    /// The CDN returned a non-success HTTP status.
    #[error("upload rejected: status {status}")]
    Rejected { status: u16, body: String },

    /// The upload succeeded but the response carried no image URL.
    #[error("upload succeeded but no image URL was returned")]
    MissingUrl,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A local image ready for upload: raw bytes plus naming metadata.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Image-CDN collaborator. Returns a stable public URL on success. Enables
/// mocking in tests.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload one image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] if the request fails, the CDN rejects the
    /// upload, or the response carries no URL.
    async fn upload(&self, image: CapturedImage) -> Result<String, UploadError>;
}

// =============================================================================
// CDN CLIENT
// =============================================================================

/// Unsigned-preset upload client.
#[derive(Debug)]
pub struct CdnUploader {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl CdnUploader {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn new(
        upload_url: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        })
    }

    /// Build from `CDN_UPLOAD_URL` and `CDN_UPLOAD_PRESET`.
    ///
    /// # Errors
    ///
    /// Returns `MissingConfig` naming the absent variable.
    pub fn from_env() -> Result<Self, UploadError> {
        let upload_url = require_env("CDN_UPLOAD_URL")?;
        let upload_preset = require_env("CDN_UPLOAD_PRESET")?;
        Self::new(upload_url, upload_preset)
    }
}

fn require_env(var: &str) -> Result<String, UploadError> {
    std::env::var(var).map_err(|_| UploadError::MissingConfig { var: var.to_owned() })
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[async_trait::async_trait]
impl ImageUploader for CdnUploader {
    async fn upload(&self, image: CapturedImage) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| UploadError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        if status != 200 {
            return Err(UploadError::Rejected { status, body });
        }

        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| UploadError::Request(e.to_string()))?;
        parsed.secure_url.ok_or(UploadError::MissingUrl)
    }
}
