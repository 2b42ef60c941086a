//! MusicBrainz provider - the primary metadata gateway and the designated
//! identity resolver.
//!
//! MusicBrainz is the only provider that can turn a free-text name into a
//! canonical MBID, so it implements [`IdentityResolver`] in addition to
//! [`MetadataProvider`]. Resolution searches the top candidates, keeps
//! only perfect-score matches, and breaks ties with Levenshtein
//! similarity against the query text.

mod adapter;
mod client;
pub(crate) mod dto;
mod similarity;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::model::{AlbumRecord, ArtistRecord, ProviderId, ReleaseIds};
use crate::providers::{
    IdentityResolver, MetadataProvider, ProviderError, WAIT_TIMEOUT,
};

pub use client::MusicBrainzClient;

/// Search breadth for identity resolution.
const SEARCH_LIMIT: u32 = 10;

/// A lucene score of 100 is MusicBrainz's "perfect match"; anything
/// below is noise for resolution purposes.
const PERFECT_SCORE: u32 = 100;

pub struct MusicBrainzProvider {
    enabled: bool,
    client: MusicBrainzClient,
    concurrency: Semaphore,
}

impl MusicBrainzProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            enabled: settings.enabled,
            client: MusicBrainzClient::new(settings.base_url.as_deref()),
            concurrency: Semaphore::new(settings.max_concurrency.max(1)),
        }
    }

    /// Acquire an in-flight permit, or give up after [`WAIT_TIMEOUT`].
    async fn permit(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        match timeout(WAIT_TIMEOUT, self.concurrency.acquire()).await {
            Ok(Ok(permit)) => Some(permit),
            _ => {
                debug!("musicbrainz concurrency cap wait timed out");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for MusicBrainzProvider {
    fn id(&self) -> ProviderId {
        ProviderId::MusicBrainz
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

        let Some(response) = self.client.get_artist(mbid).await? else {
            debug!(mbid, "musicbrainz: artist not found");
            return Ok(None);
        };

        debug!(mbid, name = %response.name, "musicbrainz: retrieved artist");
        Ok(Some(adapter::to_artist(response)))
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

        let Some(response) = self.client.get_release(release_mbid).await? else {
            debug!(release_mbid, "musicbrainz: release not found");
            return Ok(None);
        };

        debug!(release_mbid, title = %response.title, "musicbrainz: retrieved release");
        Ok(Some(adapter::to_album(response)))
    }
}

#[async_trait]
impl IdentityResolver for MusicBrainzProvider {
    fn id(&self) -> ProviderId {
        ProviderId::MusicBrainz
    }

    async fn find_artist_id(&self, name: &str) -> Result<Option<String>, ProviderError> {
        if !self.enabled || name.trim().is_empty() {
            return Ok(None);
        }
        let Some(_permit) = self.permit().await else {
            return Ok(None);
        };

        let response = self.client.search_artists(name, SEARCH_LIMIT).await?;
        Ok(pick_artist(&response.artists, name).map(|a| a.id.clone()))
    }

    async fn find_album_release(
        &self,
        name: &str,
        artist_mbid: &str,
    ) -> Result<Option<ReleaseIds>, ProviderError> {
        if !self.enabled || name.trim().is_empty() || artist_mbid.trim().is_empty() {
            return Ok(None);
        }
        let Some(_permit) = self.permit().await else {
            return Ok(None);
        };

        let response = self
            .client
            .search_releases(name, artist_mbid, SEARCH_LIMIT)
            .await?;

        let Some(release) = pick_release(&response.releases, name) else {
            debug!(album = name, artist_mbid, "musicbrainz: no matching release");
            return Ok(None);
        };

        debug!(
            album = name,
            release_mbid = %release.id,
            "musicbrainz: resolved release"
        );
        Ok(Some(ReleaseIds {
            release_mbid: release.id.clone(),
            release_group_mbid: release.release_group.as_ref().map(|rg| rg.id.clone()),
        }))
    }
}

/// Select the best artist candidate: perfect score required, similarity
/// against the query as the tie-break.
fn pick_artist<'a>(candidates: &'a [dto::SearchArtist], query: &str) -> Option<&'a dto::SearchArtist> {
    candidates
        .iter()
        .filter(|a| a.score == PERFECT_SCORE)
        .max_by(|a, b| {
            similarity::similarity(&a.name, query)
                .total_cmp(&similarity::similarity(&b.name, query))
        })
}

/// Select the best release candidate. Dateless hits are discarded first:
/// a release without a date is almost always a placeholder edition.
fn pick_release<'a>(
    candidates: &'a [dto::SearchRelease],
    query: &str,
) -> Option<&'a dto::SearchRelease> {
    candidates
        .iter()
        .filter(|r| r.date.is_some() && r.score == PERFECT_SCORE)
        .max_by(|a, b| {
            similarity::similarity(&a.title, query)
                .total_cmp(&similarity::similarity(&b.title, query))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_artist(id: &str, name: &str, score: u32) -> dto::SearchArtist {
        dto::SearchArtist {
            id: id.to_string(),
            name: name.to_string(),
            score,
        }
    }

    fn search_release(
        id: &str,
        title: &str,
        score: u32,
        date: Option<&str>,
    ) -> dto::SearchRelease {
        dto::SearchRelease {
            id: id.to_string(),
            title: title.to_string(),
            score,
            date: date.map(String::from),
            release_group: Some(dto::ReleaseGroupRef {
                id: format!("rg-{id}"),
            }),
        }
    }

    #[test]
    fn test_imperfect_scores_are_never_selected() {
        let candidates = vec![
            search_artist("a", "Nirvana UK", 100),
            search_artist("b", "Nirvana 2002", 100),
            search_artist("c", "Nirvana", 80),
        ];

        // The 80-scored candidate has the best similarity but loses
        // anyway; selection happens among perfect scores only.
        let picked = pick_artist(&candidates, "Nirvana").unwrap();
        assert_eq!(picked.id, "a");
    }

    #[test]
    fn test_similarity_breaks_perfect_score_ties() {
        let candidates = vec![
            search_artist("a", "The Beatles Revival", 100),
            search_artist("b", "The Beatles", 100),
            search_artist("c", "Beatles Tribute", 80),
        ];

        let picked = pick_artist(&candidates, "The Beatles").unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_no_perfect_score_means_no_resolution() {
        let candidates = vec![
            search_artist("a", "The Beatles", 95),
            search_artist("b", "The Beatles", 90),
        ];

        assert!(pick_artist(&candidates, "The Beatles").is_none());
    }

    #[test]
    fn test_release_without_date_is_discarded() {
        let candidates = vec![
            search_release("a", "Abbey Road", 100, None),
            search_release("b", "Abbey Road (Remastered)", 100, Some("2009-09-09")),
        ];

        let picked = pick_release(&candidates, "Abbey Road").unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_release_similarity_tie_break() {
        let candidates = vec![
            search_release("a", "Abbey Road (Deluxe)", 100, Some("2019-09-27")),
            search_release("b", "Abbey Road", 100, Some("1969-09-26")),
        ];

        let picked = pick_release(&candidates, "Abbey Road").unwrap();
        assert_eq!(picked.id, "b");
    }

    #[tokio::test]
    async fn test_disabled_provider_returns_nothing() {
        let settings = ProviderSettings {
            enabled: false,
            ..Default::default()
        };
        let provider = MusicBrainzProvider::new(&settings);

        assert!(!provider.enabled());
        // No HTTP happens for a disabled provider - this returns
        // immediately with no result.
        let result = provider.get_artist("some-mbid").await.unwrap();
        assert!(result.is_none());
        let resolved = provider.find_artist_id("Queen").await.unwrap();
        assert!(resolved.is_none());
    }
}
