//! Provider gateways - one submodule per upstream metadata source.
//!
//! # Architecture
//!
//! Each provider follows the same layout:
//! - **DTOs** (`dto.rs`) - Exact API response shapes
//! - **Adapter** (`adapter.rs`) - The only place DTOs become domain records
//! - **Client** (`client.rs`) - The HTTP client for the external API
//! - **Gateway** (`mod.rs`) - Trait impl wiring enable flag + concurrency cap
//!
//! This decoupling means API changes don't ripple through the codebase
//! and the aggregation engine can be tested against mock gateways.
//!
//! Two capability traits replace any runtime type inspection: gateways
//! implement [`MetadataProvider`] or [`LyricsProvider`] (a provider need
//! not implement all capabilities), and the one provider that can turn a
//! free-text name into canonical ids additionally implements
//! [`IdentityResolver`].

use async_trait::async_trait;

use crate::model::{AlbumRecord, ArtistRecord, LyricsRecord, ProviderId, ReleaseIds};

pub mod coverart;
pub mod fanart;
pub mod lastfm;
pub mod lrclib;
pub mod lyricsovh;
pub mod musicbrainz;

/// How long a gateway waits for its concurrency-cap permit, and how long
/// the engine waits on a rate-limiter token, before skipping the call.
pub const WAIT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Errors raised by provider gateways.
///
/// The aggregation engine converts every one of these into "no result
/// from this provider" - they exist so direct callers and logs can tell
/// failure modes apart.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Rate limited by upstream - try again later")]
    RateLimited,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// A source of artist/album metadata.
///
/// All operations are idempotent reads. `Ok(None)` means the provider has
/// no data for that id - not an error. A provider that lacks one of the
/// capabilities (e.g. Cover Art Archive has no artist data) returns
/// `Ok(None)` for it unconditionally.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Disabled providers are skipped silently during fan-out.
    fn enabled(&self) -> bool;

    /// Fetch an artist by canonical MusicBrainz artist id.
    async fn get_artist(&self, mbid: &str) -> Result<Option<ArtistRecord>, ProviderError>;

    /// Fetch an album by release id, plus the release-group id when the
    /// caller has one (image providers key on the group).
    async fn get_album(
        &self,
        release_mbid: &str,
        release_group_mbid: Option<&str>,
    ) -> Result<Option<AlbumRecord>, ProviderError>;
}

/// A source of song lyrics.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn enabled(&self) -> bool;

    /// Fetch lyrics by title/artist/album/duration. Duration (seconds)
    /// helps disambiguate covers and live versions where supported.
    async fn get_lyrics(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Result<Option<LyricsRecord>, ProviderError>;
}

/// Turns a human-readable name into canonical provider identifiers via
/// fuzzy search. Implemented by the designated search-capable provider
/// (MusicBrainz); kept as its own trait so the engine depends on the
/// capability, not on a concrete gateway.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Which provider backs the resolution - its rate limiter gates the
    /// search calls exactly like a gateway call.
    fn id(&self) -> ProviderId;

    /// Resolve an artist name to a canonical artist id.
    async fn find_artist_id(&self, name: &str) -> Result<Option<String>, ProviderError>;

    /// Resolve an album name (scoped to an artist) to release ids.
    async fn find_album_release(
        &self,
        name: &str,
        artist_mbid: &str,
    ) -> Result<Option<ReleaseIds>, ProviderError>;
}

/// Mock gateways for engine and handler tests.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock metadata provider with configurable results, failure mode and
    /// artificial latency (for completion-order tests).
    pub struct MockProvider {
        pub id: ProviderId,
        pub enabled: bool,
        pub artist: Option<ArtistRecord>,
        pub album: Option<AlbumRecord>,
        pub error: Option<ProviderError>,
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn new(id: ProviderId) -> Self {
            Self {
                id,
                enabled: true,
                artist: None,
                album: None,
                error: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_artist(id: ProviderId, artist: ArtistRecord) -> Self {
            Self {
                artist: Some(artist),
                ..Self::new(id)
            }
        }

        pub fn with_album(id: ProviderId, album: AlbumRecord) -> Self {
            Self {
                album: Some(album),
                ..Self::new(id)
            }
        }

        pub fn failing(id: ProviderId, error: ProviderError) -> Self {
            Self {
                error: Some(error),
                ..Self::new(id)
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn answer<T: Clone>(&self, value: &Option<T>) -> Result<Option<T>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            Ok(value.clone())
        }
    }

    #[async_trait]
    impl MetadataProvider for MockProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn get_artist(&self, _mbid: &str) -> Result<Option<ArtistRecord>, ProviderError> {
            self.answer(&self.artist).await
        }

        async fn get_album(
            &self,
            _release_mbid: &str,
            _release_group_mbid: Option<&str>,
        ) -> Result<Option<AlbumRecord>, ProviderError> {
            self.answer(&self.album).await
        }
    }

    /// Mock lyrics provider.
    pub struct MockLyricsProvider {
        pub id: ProviderId,
        pub enabled: bool,
        pub lyrics: Option<LyricsRecord>,
        pub error: Option<ProviderError>,
    }

    impl MockLyricsProvider {
        pub fn new(id: ProviderId, lyrics: Option<LyricsRecord>) -> Self {
            Self {
                id,
                enabled: true,
                lyrics,
                error: None,
            }
        }
    }

    #[async_trait]
    impl LyricsProvider for MockLyricsProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn get_lyrics(
            &self,
            _title: &str,
            _artist: &str,
            _album: &str,
            _duration: u32,
        ) -> Result<Option<LyricsRecord>, ProviderError> {
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            Ok(self.lyrics.clone())
        }
    }

    /// Mock resolver returning fixed ids.
    pub struct MockResolver {
        pub artist_id: Option<String>,
        pub release: Option<ReleaseIds>,
        pub calls: AtomicUsize,
    }

    impl MockResolver {
        pub fn resolving(artist_id: &str) -> Self {
            Self {
                artist_id: Some(artist_id.to_string()),
                release: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn resolving_release(release_mbid: &str, release_group_mbid: Option<&str>) -> Self {
            Self {
                artist_id: None,
                release: Some(ReleaseIds {
                    release_mbid: release_mbid.to_string(),
                    release_group_mbid: release_group_mbid.map(String::from),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn unresolvable() -> Self {
            Self {
                artist_id: None,
                release: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityResolver for MockResolver {
        fn id(&self) -> ProviderId {
            ProviderId::MusicBrainz
        }

        async fn find_artist_id(&self, _name: &str) -> Result<Option<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.artist_id.clone())
        }

        async fn find_album_release(
            &self,
            _name: &str,
            _artist_mbid: &str,
        ) -> Result<Option<ReleaseIds>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.release.clone())
        }
    }
}
