// SPDX-License-Identifier: GPL-3.0-only

//! Link shortening

use super::{is_http_url, parse_url_response};
use crate::constants::app_info;
use crate::errors::PublishError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const SHORT_URL_KEYS: &[&str] = &["short_url", "shorturl", "url"];

/// Maps a long URL to a short one
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String, PublishError>;
}

/// Shortener reached with `GET <endpoint>?url=<encoded url>`
pub struct HttpLinkShortener {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpLinkShortener {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
        let endpoint = endpoint.into();

        if endpoint.is_empty() {
            return Err(PublishError::NotConfigured("shortener"));
        }
        if !is_http_url(&endpoint) {
            return Err(PublishError::ShortenFailed(format!(
                "shortener endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(app_info::user_agent())
            .build()
            .map_err(|e| {
                PublishError::ShortenFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LinkShortener for HttpLinkShortener {
    async fn shorten(&self, url: &str) -> Result<String, PublishError> {
        debug!(endpoint = %self.endpoint, url, "Shortening");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| PublishError::ShortenFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PublishError::ShortenFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(PublishError::ShortenFailed(format!(
                "Server returned {}: {}",
                status,
                body.trim()
            )));
        }

        parse_url_response(&body, SHORT_URL_KEYS).ok_or_else(|| PublishError::InvalidResponse {
            endpoint: self.endpoint.clone(),
            message: format!("no short URL in response body: {}", body.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_validation() {
        assert!(matches!(
            HttpLinkShortener::new("", Duration::from_secs(1)),
            Err(PublishError::NotConfigured("shortener"))
        ));
        assert!(matches!(
            HttpLinkShortener::new("tinyurl.com/api", Duration::from_secs(1)),
            Err(PublishError::ShortenFailed(_))
        ));
        assert!(
            HttpLinkShortener::new(
                "https://tinyurl.com/api-create.php",
                Duration::from_secs(1)
            )
            .is_ok()
        );
    }
}
