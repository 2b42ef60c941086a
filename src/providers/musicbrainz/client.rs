//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to
//! 1 req/sec - the aggregation engine's token bucket enforces that budget.

use super::dto;
use crate::providers::ProviderError;

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// User agent string - MusicBrainz requires this
const USER_AGENT: &str = concat!(
    "MusicData/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/music-data)"
);

impl MusicBrainzClient {
    /// Create a new client
    pub fn new(base_url: Option<&str>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url
                .unwrap_or("https://musicbrainz.org/ws/2")
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Search artists by name; returns up to `limit` scored candidates.
    ///
    /// The name is quoted so lucene treats it as a phrase rather than a
    /// bag of terms.
    pub async fn search_artists(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<dto::ArtistSearchResponse, ProviderError> {
        let url = format!(
            "{}/artist?query={}&limit={}&fmt=json",
            self.base_url,
            urlencoding::encode(&format!("\"{}\"", name)),
            limit
        );
        self.get_json(&url).await.map(Option::unwrap_or_default)
    }

    /// Search official album releases for one artist.
    pub async fn search_releases(
        &self,
        album_name: &str,
        artist_mbid: &str,
        limit: u32,
    ) -> Result<dto::ReleaseSearchResponse, ProviderError> {
        let query = format!(
            "arid:{} AND release:\"{}\" AND type:album AND status:official",
            artist_mbid, album_name
        );
        let url = format!(
            "{}/release?query={}&limit={}&fmt=json",
            self.base_url,
            urlencoding::encode(&query),
            limit
        );
        self.get_json(&url).await.map(Option::unwrap_or_default)
    }

    /// Look up an artist by MBID, including member and URL relationships.
    pub async fn get_artist(
        &self,
        mbid: &str,
    ) -> Result<Option<dto::ArtistResponse>, ProviderError> {
        let url = format!(
            "{}/artist/{}?fmt=json&inc=artist-rels+url-rels",
            self.base_url,
            urlencoding::encode(mbid)
        );
        self.get_json(&url).await
    }

    /// Look up a release by MBID, including credits, labels, recordings,
    /// release group, URL relationships and genres.
    pub async fn get_release(
        &self,
        mbid: &str,
    ) -> Result<Option<dto::ReleaseResponse>, ProviderError> {
        let url = format!(
            "{}/release/{}?fmt=json&inc=artist-credits+labels+recordings+release-groups+url-rels+genres",
            self.base_url,
            urlencoding::encode(mbid)
        );
        self.get_json(&url).await
    }

    /// Send the HTTP request and parse the response.
    ///
    /// 404 means "no such entity" and maps to `Ok(None)`; 503/429 is the
    /// upstream throttle kicking in.
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

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse the structured error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(ProviderError::Api(error.error));
            }
            return Err(ProviderError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MusicBrainzClient::new(None);
        assert_eq!(client.base_url, "https://musicbrainz.org/ws/2");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = MusicBrainzClient::new(Some("http://localhost:8080/"));
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("MusicData/"));
    }
}
