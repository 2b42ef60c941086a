//! Lyrics.ovh provider - plain lyrics only, addressed by artist + title.
//!
//! Simple enough that the client lives in this file; the DTO still gets
//! its own module for contract tests.

pub(crate) mod dto;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::model::{LyricsRecord, Provenance, ProviderId};
use crate::providers::{LyricsProvider, ProviderError, WAIT_TIMEOUT};

pub struct LyricsOvhProvider {
    enabled: bool,
    http_client: reqwest::Client,
    base_url: String,
    concurrency: Semaphore,
}

impl LyricsOvhProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
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
            enabled: settings.enabled,
            http_client,
            base_url: settings
                .base_url
                .as_deref()
                .unwrap_or("https://api.lyrics.ovh/v1")
                .trim_end_matches('/')
                .to_string(),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }
}

#[async_trait]
impl LyricsProvider for LyricsOvhProvider {
    fn id(&self) -> ProviderId {
        ProviderId::LyricsOvh
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn get_lyrics(
        &self,
        title: &str,
        artist: &str,
        _album: &str,
        _duration: u32,
    ) -> Result<Option<LyricsRecord>, ProviderError> {
        if !self.enabled || title.trim().is_empty() || artist.trim().is_empty() {
            return Ok(None);
        }
        let Ok(Ok(_permit)) = timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await else {
            debug!("lyricsovh concurrency cap wait timed out");
            return Ok(None);
        };

        let url = format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(title, artist, "lyricsovh: no lyrics");
            return Ok(None);
        }
        if !status.is_success() {
            return Ok(None);
        }

        let body: dto::LyricsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let plain = body.lyrics.trim().to_string();
        if plain.is_empty() {
            return Ok(None);
        }

        Ok(Some(LyricsRecord {
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            plain_lyrics: Some(plain),
            synced_lyrics: None,
            duration: None,
            provenance: Provenance::Provider(ProviderId::LyricsOvh),
        }))
    }
}
