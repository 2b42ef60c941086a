//! Last.fm provider - biographies, listener-facing URLs and track lists.
//!
//! Requires an API key; without one the gateway is disabled regardless of
//! the config flag.

mod adapter;
mod client;
pub(crate) mod dto;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{Credentials, ProviderSettings};
use crate::model::{AlbumRecord, ArtistRecord, ProviderId};
use crate::providers::{MetadataProvider, ProviderError, WAIT_TIMEOUT};

pub use client::LastFmClient;

pub struct LastFmProvider {
    enabled: bool,
    client: LastFmClient,
    concurrency: Semaphore,
}

impl LastFmProvider {
    pub fn new(settings: &ProviderSettings, credentials: &Credentials) -> Self {
        let api_key = credentials.lastfm_api_key.clone().unwrap_or_default();
        Self {
            // No key means every call would 403; treat as disabled.
            enabled: settings.enabled && !api_key.is_empty(),
            client: LastFmClient::new(api_key, settings.base_url.as_deref()),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }

    async fn permit(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        match timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await {
            Ok(Ok(permit)) => Some(permit),
            _ => {
                debug!("lastfm concurrency cap wait timed out");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for LastFmProvider {
    fn id(&self) -> ProviderId {
        ProviderId::LastFm
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn get_artist(&self, mbid: &str) -> Result<Option<ArtistRecord>, ProviderError> {
        if !self.enabled || mbid.trim().is_empty() {
            return Ok(None);
        }
        let Some(_permit) = self.permit().await else {
            return Ok(None);
        };

        let Some(root) = self.client.artist_info(mbid).await? else {
            return Ok(None);
        };

        debug!(mbid, name = %root.artist.name, "lastfm: retrieved artist");
        Ok(Some(adapter::to_artist(root.artist)))
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

        let Some(root) = self.client.album_info(release_mbid).await? else {
            return Ok(None);
        };

        debug!(release_mbid, name = %root.album.name, "lastfm: retrieved album");
        Ok(Some(adapter::to_album(root.album)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_disables_provider() {
        let provider = LastFmProvider::new(&ProviderSettings::default(), &Credentials::default());
        assert!(!provider.enabled());
    }

    #[test]
    fn test_key_and_flag_enable_provider() {
        let credentials = Credentials {
            lastfm_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = LastFmProvider::new(&ProviderSettings::default(), &credentials);
        assert!(provider.enabled());
    }
}
