//! Last.fm HTTP client
//!
//! All requests go through the single `2.0/` endpoint with `method` and
//! `api_key` query parameters; entities are addressed by MusicBrainz id.
//! See: https://www.last.fm/api

use super::dto;
use crate::providers::ProviderError;

pub struct LastFmClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LastFmClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Self {
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
                .unwrap_or("https://ws.audioscrobbler.com/2.0")
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn artist_info(&self, mbid: &str) -> Result<Option<dto::ArtistRoot>, ProviderError> {
        let url = format!(
            "{}/?method=artist.getinfo&mbid={}&api_key={}&format=json&lang=en",
            self.base_url,
            urlencoding::encode(mbid),
            urlencoding::encode(&self.api_key)
        );
        self.get_json(&url).await
    }

    pub async fn album_info(&self, mbid: &str) -> Result<Option<dto::AlbumRoot>, ProviderError> {
        let url = format!(
            "{}/?method=album.getinfo&mbid={}&api_key={}&format=json&lang=en",
            self.base_url,
            urlencoding::encode(mbid),
            urlencoding::encode(&self.api_key)
        );
        self.get_json(&url).await
    }

    /// Last.fm reports "not found" as a 200 with an error body, so any
    /// parse failure of the expected envelope maps to no result rather
    /// than an error.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, ProviderError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Ok(None);
        }

        Ok(response.json::<T>().await.ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = LastFmClient::new("key", None);
        assert_eq!(client.base_url, "https://ws.audioscrobbler.com/2.0");
    }
}
