//! LrcLib provider - plain and time-synced lyrics.
//!
//! Tries the exact duration-qualified lookup first, then falls back to
//! fuzzy search, the same two-step the upstream docs recommend.

mod client;
pub(crate) mod dto;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::model::{LyricsRecord, Provenance, ProviderId};
use crate::providers::{LyricsProvider, ProviderError, WAIT_TIMEOUT};

pub use client::LrcLibClient;

pub struct LrcLibProvider {
    enabled: bool,
    client: LrcLibClient,
    concurrency: Semaphore,
}

impl LrcLibProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            enabled: settings.enabled,
            client: LrcLibClient::new(settings.base_url.as_deref()),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }
}

#[async_trait]
impl LyricsProvider for LrcLibProvider {
    fn id(&self) -> ProviderId {
        ProviderId::LrcLib
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn get_lyrics(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Result<Option<LyricsRecord>, ProviderError> {
        if !self.enabled || title.trim().is_empty() || artist.trim().is_empty() {
            return Ok(None);
        }
        // LrcLib needs the album name for its exact-match endpoint.
        if album.trim().is_empty() {
            return Ok(None);
        }
        let Ok(Ok(_permit)) = timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await else {
            debug!("lrclib concurrency cap wait timed out");
            return Ok(None);
        };

        let mut found = self.client.get(title, artist, album, duration).await?;
        if found.is_none() {
            found = self.client.search(title, artist, album).await?;
        }
        let Some(response) = found else {
            debug!(title, artist, "lrclib: no lyrics");
            return Ok(None);
        };

        let plain = response
            .plain_lyrics
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        let synced = response
            .synced_lyrics
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Ok(Some(LyricsRecord {
            title: title.to_string(),
            artist: artist.to_string(),
            album: Some(album.to_string()),
            plain_lyrics: plain,
            synced_lyrics: synced,
            duration: Some(response.duration as u32),
            provenance: Provenance::Provider(ProviderId::LrcLib),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_inputs_short_circuit() {
        let provider = LrcLibProvider::new(&ProviderSettings::default());
        assert!(
            provider
                .get_lyrics("", "Artist", "Album", 200)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            provider
                .get_lyrics("Title", "Artist", "", 200)
                .await
                .unwrap()
                .is_none()
        );
    }
}
