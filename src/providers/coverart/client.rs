//! Cover Art Archive HTTP client
//!
//! See: https://musicbrainz.org/doc/Cover_Art_Archive/API

use super::dto;
use crate::providers::ProviderError;

pub struct CoverArtClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoverArtClient {
    pub fn new(base_url: Option<&str>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url
                .unwrap_or("https://coverartarchive.org")
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// All images attached to a release. 404 means the release has no
    /// cover art at all.
    pub async fn release_images(
        &self,
        release_mbid: &str,
    ) -> Result<Option<dto::ReleaseImagesResponse>, ProviderError> {
        let url = format!(
            "{}/release/{}",
            self.base_url,
            urlencoding::encode(release_mbid)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = CoverArtClient::new(None);
        assert_eq!(client.base_url, "https://coverartarchive.org");
    }
}
