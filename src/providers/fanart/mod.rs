//! Fanart.tv provider - artist imagery and album covers.
//!
//! Artist lookups use the artist MBID; album lookups need the
//! release-group MBID, so the gateway contributes nothing for albums
//! resolved without one.

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

pub use client::FanartClient;

pub struct FanartProvider {
    enabled: bool,
    client: FanartClient,
    concurrency: Semaphore,
}

impl FanartProvider {
    pub fn new(settings: &ProviderSettings, credentials: &Credentials) -> Self {
        let api_key = credentials.fanart_api_key.clone().unwrap_or_default();
        Self {
            enabled: settings.enabled && !api_key.is_empty(),
            client: FanartClient::new(api_key, settings.base_url.as_deref()),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }

    async fn permit(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        match timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await {
            Ok(Ok(permit)) => Some(permit),
            _ => {
                debug!("fanart concurrency cap wait timed out");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for FanartProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fanart
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

        let Some(root) = self.client.artist_images(mbid).await? else {
            debug!(mbid, "fanart: no artist images");
            return Ok(None);
        };

        Ok(Some(adapter::to_artist(root)))
    }

    async fn get_album(
        &self,
        _release_mbid: &str,
        release_group_mbid: Option<&str>,
    ) -> Result<Option<AlbumRecord>, ProviderError> {
        let Some(group_mbid) = release_group_mbid.filter(|id| !id.trim().is_empty()) else {
            return Ok(None);
        };
        if !self.enabled {
            return Ok(None);
        }
        let Some(_permit) = self.permit().await else {
            return Ok(None);
        };

        let Some(root) = self.client.album_images(group_mbid).await? else {
            debug!(group_mbid, "fanart: no album images");
            return Ok(None);
        };

        Ok(adapter::to_album(root))
    }
}
