//! Cover Art Archive provider - album front covers only.
//!
//! The archive has no artist-level data, so the artist capability
//! unconditionally contributes nothing.

mod client;
pub(crate) mod dto;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::model::{AlbumRecord, ArtistRecord, Provenance, ProviderId};
use crate::providers::{MetadataProvider, ProviderError, WAIT_TIMEOUT};

pub use client::CoverArtClient;

pub struct CoverArtProvider {
    enabled: bool,
    client: CoverArtClient,
    concurrency: Semaphore,
}

impl CoverArtProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            enabled: settings.enabled,
            client: CoverArtClient::new(settings.base_url.as_deref()),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }

    async fn permit(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        match timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await {
            Ok(Ok(permit)) => Some(permit),
            _ => {
                debug!("coverart concurrency cap wait timed out");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for CoverArtProvider {
    fn id(&self) -> ProviderId {
        ProviderId::CoverArt
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn get_artist(&self, _mbid: &str) -> Result<Option<ArtistRecord>, ProviderError> {
        // Album-only capability.
        Ok(None)
    }

    async fn get_album(
        &self,
        release_mbid: &str,
        _release_group_mbid: Option<&str>,
    ) -> Result<Option<AlbumRecord>, ProviderError> {
        if !self.enabled || release_mbid.trim().is_empty() {
            return Ok(None);
        }
        let Some(_permit) = self.permit().await else {
            return Ok(None);
        };

        let Some(response) = self.client.release_images(release_mbid).await? else {
            debug!(release_mbid, "coverart: no images for release");
            return Ok(None);
        };

        // Only the approved front cover is worth contributing.
        let front = response
            .images
            .into_iter()
            .find(|i| i.front && i.approved)
            .map(|i| i.image);

        let Some(picture_url) = front else {
            return Ok(None);
        };

        Ok(Some(AlbumRecord {
            picture_url: Some(picture_url),
            provenance: Provenance::Provider(ProviderId::CoverArt),
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_artist_capability_is_absent() {
        let provider = CoverArtProvider::new(&ProviderSettings::default());
        let result = provider.get_artist("any-mbid").await.unwrap();
        assert!(result.is_none());
    }
}
