//! LrcLib HTTP client
//!
//! `/api/get` does an exact signature match (title/artist/album/duration);
//! `/api/search` is the fuzzy fallback. See: https://lrclib.net/docs

use super::dto;
use crate::providers::ProviderError;

pub struct LrcLibClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LrcLibClient {
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
                .unwrap_or("https://lrclib.net")
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Exact lookup including track duration.
    pub async fn get(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Result<Option<dto::LyricsResponse>, ProviderError> {
        let url = format!(
            "{}/api/get?artist_name={}&track_name={}&album_name={}&duration={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title),
            urlencoding::encode(album),
            duration
        );
        self.fetch::<dto::LyricsResponse>(&url).await
    }

    /// Fuzzy search; the first hit is the best match.
    pub async fn search(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Option<dto::LyricsResponse>, ProviderError> {
        let url = format!(
            "{}/api/search?artist_name={}&track_name={}&album_name={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title),
            urlencoding::encode(album)
        );
        let results = self.fetch::<Vec<dto::LyricsResponse>>(&url).await?;
        Ok(results.and_then(|mut r| {
            if r.is_empty() { None } else { Some(r.remove(0)) }
        }))
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
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
    fn test_client_defaults() {
        let client = LrcLibClient::new(None);
        assert_eq!(client.base_url, "https://lrclib.net");
    }
}
