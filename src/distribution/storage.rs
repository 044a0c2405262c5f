// SPDX-License-Identifier: GPL-3.0-only

//! Remote object storage

use super::{is_http_url, parse_url_response};
use crate::constants::app_info;
use crate::errors::PublishError;
use async_trait::async_trait;
use reqwest::multipart;
use std::time::Duration;
use tracing::debug;

/// Keys an upload response may carry the file URL under
const URL_KEYS: &[&str] = &["url", "link", "location"];

/// Stores artifact bytes and returns a public URL
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, data: &[u8], filename: &str, mime: &str) -> Result<String, PublishError>;
}

/// Storage endpoint accepting a multipart `file` upload
///
/// The endpoint answers with either `{"url": "..."}` or the URL as plain text.
pub struct HttpObjectStorage {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
        let endpoint = endpoint.into();

        if endpoint.is_empty() {
            return Err(PublishError::NotConfigured("storage"));
        }
        if !is_http_url(&endpoint) {
            return Err(PublishError::UploadFailed(format!(
                "storage endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(app_info::user_agent())
            .build()
            .map_err(|e| {
                PublishError::UploadFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        data: &[u8],
        filename: &str,
        mime: &str,
    ) -> Result<String, PublishError> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| PublishError::UploadFailed(format!("Invalid MIME type {}: {}", mime, e)))?;
        let form = multipart::Form::new().part("file", part);

        debug!(endpoint = %self.endpoint, filename, bytes = data.len(), "Uploading");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PublishError::UploadFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(PublishError::UploadFailed(format!(
                "Server returned {}: {}",
                status,
                body.trim()
            )));
        }

        parse_url_response(&body, URL_KEYS).ok_or_else(|| PublishError::InvalidResponse {
            endpoint: self.endpoint.clone(),
            message: format!("no URL in response body: {}", body.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_must_be_http() {
        assert!(matches!(
            HttpObjectStorage::new("ftp://files.example", Duration::from_secs(5)),
            Err(PublishError::UploadFailed(_))
        ));
        assert!(matches!(
            HttpObjectStorage::new("", Duration::from_secs(5)),
            Err(PublishError::NotConfigured("storage"))
        ));
    }

    #[test]
    fn test_valid_endpoint_is_kept() {
        let storage =
            HttpObjectStorage::new("https://files.example/upload", Duration::from_secs(5))
                .unwrap();
        assert_eq!(storage.endpoint(), "https://files.example/upload");
    }
}
