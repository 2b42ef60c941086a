//! Fanart.tv HTTP client
//!
//! Artist images are keyed by MusicBrainz artist id, album covers by
//! release-group id. See: https://fanart.tv/api-docs/

use super::dto;
use crate::providers::ProviderError;

pub struct FanartClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FanartClient {
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
                .unwrap_or("https://webservice.fanart.tv/v3/music")
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn artist_images(
        &self,
        artist_mbid: &str,
    ) -> Result<Option<dto::ArtistImagesRoot>, ProviderError> {
        let url = format!(
            "{}/{}?api_key={}",
            self.base_url,
            urlencoding::encode(artist_mbid),
            urlencoding::encode(&self.api_key)
        );
        self.get_json(&url).await
    }

    pub async fn album_images(
        &self,
        release_group_mbid: &str,
    ) -> Result<Option<dto::AlbumImagesRoot>, ProviderError> {
        let url = format!(
            "{}/albums/{}?api_key={}",
            self.base_url,
            urlencoding::encode(release_group_mbid),
            urlencoding::encode(&self.api_key)
        );
        self.get_json(&url).await
    }

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
