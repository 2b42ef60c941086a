//! Fan-out engines: one logical query, one concurrent call per enabled
//! provider, merged in configured priority order.
//!
//! Every provider call goes through the same guard: skip when disabled,
//! skip when the provider's token bucket can't grant within the wait
//! budget, and swallow (log, don't propagate) anything the provider
//! throws. A misbehaving provider can only ever cost its own
//! contribution.
//!
//! `join_all` returns results in input order, so the merged record
//! depends only on the configured provider sequence, never on which
//! upstream answered first. Cancellation is cooperative: dropping the
//! future returned by any operation cancels all in-flight provider calls.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::limiter::LimiterSet;
use crate::model::{AlbumRecord, ArtistRecord, LyricsRecord, ProviderId, ReleaseIds};
use crate::providers::{
    IdentityResolver, LyricsProvider, MetadataProvider, ProviderError, WAIT_TIMEOUT,
};

use super::merge;

/// Aggregates artist and album queries across metadata providers.
///
/// Stateless across calls: each invocation resolves (if needed), fans
/// out, and merges independently. The provider list is fixed at
/// construction in priority order.
pub struct MusicAggregator {
    providers: Vec<Arc<dyn MetadataProvider>>,
    resolver: Arc<dyn IdentityResolver>,
    limiters: Arc<LimiterSet>,
}

impl MusicAggregator {
    pub fn new(
        providers: Vec<Arc<dyn MetadataProvider>>,
        resolver: Arc<dyn IdentityResolver>,
        limiters: Arc<LimiterSet>,
    ) -> Self {
        Self {
            providers,
            resolver,
            limiters,
        }
    }

    /// Resolve an artist name and aggregate across providers.
    ///
    /// Resolution failure short-circuits: no other provider is contacted
    /// and the result is an ordinary empty answer.
    pub async fn artist_by_name(&self, name: &str) -> Option<ArtistRecord> {
        if name.trim().is_empty() {
            return None;
        }

        let mbid = self.resolve_artist(name).await?;
        self.artist_by_id(&mbid).await
    }

    /// Aggregate an artist by canonical MusicBrainz id.
    pub async fn artist_by_id(&self, mbid: &str) -> Option<ArtistRecord> {
        if mbid.trim().is_empty() {
            return None;
        }

        let calls = self
            .providers
            .iter()
            .map(|p| self.guarded_artist(p.as_ref(), mbid));
        let partials: Vec<ArtistRecord> = join_all(calls).await.into_iter().flatten().collect();

        debug!(mbid, contributors = partials.len(), "artist fan-out settled");
        merge::merge_artists(&partials)
    }

    /// Resolve an album name (scoped to an artist) and aggregate.
    pub async fn album_by_name(&self, name: &str, artist_mbid: &str) -> Option<AlbumRecord> {
        if name.trim().is_empty() || artist_mbid.trim().is_empty() {
            return None;
        }

        let release = self.resolve_release(name, artist_mbid).await?;
        self.album_by_ids(
            &release.release_mbid,
            release.release_group_mbid.as_deref(),
            artist_mbid,
        )
        .await
    }

    /// Aggregate an album by explicit release (+ optional release-group)
    /// ids.
    pub async fn album_by_ids(
        &self,
        release_mbid: &str,
        release_group_mbid: Option<&str>,
        artist_mbid: &str,
    ) -> Option<AlbumRecord> {
        if release_mbid.trim().is_empty() {
            return None;
        }

        let calls = self
            .providers
            .iter()
            .map(|p| self.guarded_album(p.as_ref(), release_mbid, release_group_mbid));
        let partials: Vec<AlbumRecord> = join_all(calls).await.into_iter().flatten().collect();

        debug!(
            release_mbid,
            contributors = partials.len(),
            "album fan-out settled"
        );
        let mut merged = merge::merge_albums(&partials)?;
        if !artist_mbid.trim().is_empty() {
            merged.artist_mbid = Some(artist_mbid.to_string());
        }
        Some(merged)
    }

    /// One guarded gateway call: enabled check, rate-limit token, error
    /// swallow.
    async fn guarded_artist(
        &self,
        provider: &dyn MetadataProvider,
        mbid: &str,
    ) -> Option<ArtistRecord> {
        if !provider.enabled() {
            return None;
        }
        if !self.acquire_token(provider.id()).await {
            return None;
        }

        match provider.get_artist(mbid).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = %provider.id(), error = %e, "artist lookup failed");
                None
            }
        }
    }

    async fn guarded_album(
        &self,
        provider: &dyn MetadataProvider,
        release_mbid: &str,
        release_group_mbid: Option<&str>,
    ) -> Option<AlbumRecord> {
        if !provider.enabled() {
            return None;
        }
        if !self.acquire_token(provider.id()).await {
            return None;
        }

        match provider.get_album(release_mbid, release_group_mbid).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = %provider.id(), error = %e, "album lookup failed");
                None
            }
        }
    }

    /// Resolution is rate-limited and failure-isolated exactly like a
    /// gateway call, against the resolver provider's own bucket.
    async fn resolve_artist(&self, name: &str) -> Option<String> {
        if !self.acquire_token(self.resolver.id()).await {
            return None;
        }

        match self.resolver.find_artist_id(name).await {
            Ok(Some(mbid)) => {
                debug!(name, mbid = %mbid, "resolved artist name");
                Some(mbid)
            }
            Ok(None) => {
                debug!(name, "artist name did not resolve");
                None
            }
            Err(e) => {
                warn!(name, error = %e, "artist resolution failed");
                None
            }
        }
    }

    async fn resolve_release(&self, name: &str, artist_mbid: &str) -> Option<ReleaseIds> {
        if !self.acquire_token(self.resolver.id()).await {
            return None;
        }

        match self.resolver.find_album_release(name, artist_mbid).await {
            Ok(release) => release,
            Err(e) => {
                warn!(album = name, error = %e, "release resolution failed");
                None
            }
        }
    }

    async fn acquire_token(&self, id: ProviderId) -> bool {
        let Some(bucket) = self.limiters.get(id) else {
            // No bucket configured for this provider id: let it through.
            return true;
        };
        if bucket.acquire(WAIT_TIMEOUT).await {
            true
        } else {
            debug!(provider = %id, "rate limiter wait timed out, skipping");
            false
        }
    }
}

/// Aggregates lyrics queries across lyrics providers.
pub struct LyricsAggregator {
    providers: Vec<Arc<dyn LyricsProvider>>,
    limiters: Arc<LimiterSet>,
}

impl LyricsAggregator {
    pub fn new(providers: Vec<Arc<dyn LyricsProvider>>, limiters: Arc<LimiterSet>) -> Self {
        Self {
            providers,
            limiters,
        }
    }

    /// Fan a lyrics request out to every enabled provider and merge.
    pub async fn lyrics(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Option<LyricsRecord> {
        if title.trim().is_empty() || artist.trim().is_empty() {
            return None;
        }

        let calls = self
            .providers
            .iter()
            .map(|p| self.guarded_lyrics(p.as_ref(), title, artist, album, duration));
        let partials: Vec<LyricsRecord> = join_all(calls).await.into_iter().flatten().collect();

        debug!(title, contributors = partials.len(), "lyrics fan-out settled");
        merge::merge_lyrics(&partials)
    }

    async fn guarded_lyrics(
        &self,
        provider: &dyn LyricsProvider,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Option<LyricsRecord> {
        if !provider.enabled() {
            return None;
        }

        if let Some(bucket) = self.limiters.get(provider.id())
            && !bucket.acquire(WAIT_TIMEOUT).await
        {
            debug!(provider = %provider.id(), "rate limiter wait timed out, skipping");
            return None;
        }

        match provider.get_lyrics(title, artist, album, duration).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = %provider.id(), error = %e, "lyrics lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimit;
    use crate::model::Provenance;
    use crate::providers::mocks::{MockLyricsProvider, MockProvider, MockResolver};
    use std::collections::HashMap;
    use std::time::Duration;

    fn limiters(ids: &[ProviderId]) -> Arc<LimiterSet> {
        // Generous buckets so tests exercise fan-out, not throttling.
        let mut limits = HashMap::new();
        for id in ids {
            limits.insert(
                id.as_str().to_string(),
                RateLimit {
                    max_requests: 100,
                    per_seconds: 1,
                },
            );
        }
        Arc::new(LimiterSet::from_config(&limits, ids.iter().copied()))
    }

    fn artist_from(id: ProviderId, name: &str, year: Option<i32>) -> ArtistRecord {
        ArtistRecord {
            name: name.to_string(),
            begin_year: year,
            provenance: Provenance::Provider(id),
            ..Default::default()
        }
    }

    fn engine(
        providers: Vec<Arc<dyn MetadataProvider>>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> MusicAggregator {
        let ids = [
            ProviderId::MusicBrainz,
            ProviderId::LastFm,
            ProviderId::Fanart,
            ProviderId::CoverArt,
        ];
        MusicAggregator::new(providers, resolver, limiters(&ids))
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_follows_priority_not_completion_order() {
        // The highest-priority provider is the slowest to answer; its
        // fields must still win the merge.
        let slow_primary = Arc::new(
            MockProvider::with_artist(
                ProviderId::MusicBrainz,
                artist_from(ProviderId::MusicBrainz, "Queen", Some(1970)),
            )
            .delayed(Duration::from_secs(5)),
        );
        let fast_secondary = Arc::new(MockProvider::with_artist(
            ProviderId::LastFm,
            artist_from(ProviderId::LastFm, "Queen (band)", Some(1971)),
        ));

        let engine = engine(
            vec![slow_primary, fast_secondary],
            Arc::new(MockResolver::unresolvable()),
        );

        let merged = engine.artist_by_id("mbid-1").await.unwrap();

        assert_eq!(merged.name, "Queen");
        assert_eq!(merged.begin_year, Some(1970));
        assert_eq!(merged.provenance, Provenance::Aggregated);
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_poison_the_fanout() {
        let failing = Arc::new(MockProvider::failing(
            ProviderId::MusicBrainz,
            ProviderError::Network("connection reset".to_string()),
        ));
        let healthy = Arc::new(MockProvider::with_artist(
            ProviderId::LastFm,
            artist_from(ProviderId::LastFm, "Queen", None),
        ));
        let imagery = Arc::new(MockProvider::with_artist(
            ProviderId::Fanart,
            ArtistRecord {
                picture_url: Some("thumb.jpg".to_string()),
                provenance: Provenance::Provider(ProviderId::Fanart),
                ..Default::default()
            },
        ));

        let engine = engine(
            vec![failing, healthy, imagery],
            Arc::new(MockResolver::unresolvable()),
        );

        let merged = engine.artist_by_id("mbid-1").await.unwrap();

        // Data from the two surviving providers, no error escaping.
        assert_eq!(merged.name, "Queen");
        assert_eq!(merged.picture_url.as_deref(), Some("thumb.jpg"));
        assert_eq!(merged.provenance, Provenance::Aggregated);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_skipped_silently() {
        let disabled = Arc::new(
            MockProvider::with_artist(
                ProviderId::MusicBrainz,
                artist_from(ProviderId::MusicBrainz, "Wrong Name", None),
            )
            .disabled(),
        );
        let enabled = Arc::new(MockProvider::with_artist(
            ProviderId::LastFm,
            artist_from(ProviderId::LastFm, "Queen", None),
        ));

        let disabled_handle = Arc::clone(&disabled);
        let engine = engine(vec![disabled, enabled], Arc::new(MockResolver::unresolvable()));

        let merged = engine.artist_by_id("mbid-1").await.unwrap();

        assert_eq!(merged.name, "Queen");
        assert_eq!(disabled_handle.call_count(), 0);
        // Sole contributor keeps its provider tag.
        assert_eq!(merged.provenance, Provenance::Provider(ProviderId::LastFm));
    }

    #[tokio::test]
    async fn test_resolution_failure_short_circuits() {
        let provider = Arc::new(MockProvider::with_artist(
            ProviderId::MusicBrainz,
            artist_from(ProviderId::MusicBrainz, "Queen", None),
        ));
        let provider_handle = Arc::clone(&provider);
        let resolver = Arc::new(MockResolver::unresolvable());
        let resolver_handle = Arc::clone(&resolver);

        let engine = engine(vec![provider], resolver);

        assert!(engine.artist_by_name("Queeeeen").await.is_none());
        assert_eq!(resolver_handle.call_count(), 1);
        // No gateway was contacted after the resolver came up empty.
        assert_eq!(provider_handle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolved_name_flows_into_fanout() {
        let provider = Arc::new(MockProvider::with_artist(
            ProviderId::MusicBrainz,
            artist_from(ProviderId::MusicBrainz, "Queen", Some(1970)),
        ));
        let engine = engine(vec![provider], Arc::new(MockResolver::resolving("mbid-queen")));

        let merged = engine.artist_by_name("queen").await.unwrap();
        assert_eq!(merged.name, "Queen");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drained_rate_limiter_skips_provider() {
        // A 1-token bucket already drained by a previous request.
        let mut limits = HashMap::new();
        limits.insert(
            ProviderId::LastFm.as_str().to_string(),
            RateLimit {
                max_requests: 1,
                per_seconds: 3600,
            },
        );
        let set = Arc::new(LimiterSet::from_config(
            &limits,
            [ProviderId::MusicBrainz, ProviderId::LastFm],
        ));
        set.get(ProviderId::LastFm)
            .unwrap()
            .acquire(Duration::ZERO)
            .await;

        let throttled = Arc::new(MockProvider::with_artist(
            ProviderId::LastFm,
            artist_from(ProviderId::LastFm, "Wrong", None),
        ));
        let throttled_handle = Arc::clone(&throttled);
        let free = Arc::new(MockProvider::with_artist(
            ProviderId::MusicBrainz,
            artist_from(ProviderId::MusicBrainz, "Queen", None),
        ));

        let engine = MusicAggregator::new(
            vec![free, throttled],
            Arc::new(MockResolver::unresolvable()),
            set,
        );

        let merged = engine.artist_by_id("mbid-1").await.unwrap();

        assert_eq!(merged.name, "Queen");
        assert_eq!(throttled_handle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_album_stamps_artist_mbid() {
        let provider = Arc::new(MockProvider::with_album(
            ProviderId::MusicBrainz,
            AlbumRecord {
                name: "Abbey Road".to_string(),
                provenance: Provenance::Provider(ProviderId::MusicBrainz),
                ..Default::default()
            },
        ));
        let engine = engine(vec![provider], Arc::new(MockResolver::unresolvable()));

        let merged = engine
            .album_by_ids("rel-1", Some("rg-1"), "artist-mbid")
            .await
            .unwrap();

        assert_eq!(merged.artist_mbid.as_deref(), Some("artist-mbid"));
    }

    #[tokio::test]
    async fn test_lyrics_fanout_merges_partial_answers() {
        let synced_only = Arc::new(MockLyricsProvider::new(
            ProviderId::LrcLib,
            Some(LyricsRecord {
                title: "Song".to_string(),
                artist: "Band".to_string(),
                synced_lyrics: Some("[00:01.00] la".to_string()),
                provenance: Provenance::Provider(ProviderId::LrcLib),
                ..Default::default()
            }),
        ));
        let plain_only = Arc::new(MockLyricsProvider::new(
            ProviderId::LyricsOvh,
            Some(LyricsRecord {
                title: "Song".to_string(),
                artist: "Band".to_string(),
                plain_lyrics: Some("la la".to_string()),
                provenance: Provenance::Provider(ProviderId::LyricsOvh),
                ..Default::default()
            }),
        ));

        let aggregator = LyricsAggregator::new(
            vec![synced_only, plain_only],
            limiters(&[ProviderId::LrcLib, ProviderId::LyricsOvh]),
        );

        let merged = aggregator.lyrics("Song", "Band", "Album", 180).await.unwrap();

        assert_eq!(merged.plain_lyrics.as_deref(), Some("la la"));
        assert_eq!(merged.synced_lyrics.as_deref(), Some("[00:01.00] la"));
        assert_eq!(merged.provenance, Provenance::Aggregated);
    }

    #[tokio::test]
    async fn test_no_contributors_means_no_record() {
        let empty = Arc::new(MockProvider::new(ProviderId::MusicBrainz));
        let engine = engine(vec![empty], Arc::new(MockResolver::unresolvable()));

        assert!(engine.artist_by_id("mbid-1").await.is_none());
        assert!(engine.album_by_ids("", None, "a").await.is_none());
    }
}
