//! Cache-first orchestration handlers.
//!
//! Every query follows the same shape: read the cache, return a
//! `Cache`-tagged copy on a hit, otherwise run the aggregation engine and
//! persist whatever it produced. "Not found" is an ordinary empty answer.
//!
//! Negative caching is opt-in via `cache.negative_ttl_secs`: when set, a
//! miss that no provider could answer writes a `NotFound` sentinel, and
//! repeat queries within the TTL short-circuit without touching any
//! provider. An expired sentinel counts as a miss so a transient upstream
//! outage can't poison a key forever.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::aggregator::{LyricsAggregator, MusicAggregator};
use crate::config::Config;
use crate::db::{Cached, CacheRepository};
use crate::error::{Result, ResultExt};
use crate::limiter::LimiterSet;
use crate::model::{AlbumRecord, ArtistRecord, LyricsRecord, Provenance, ProviderId};
use crate::providers::coverart::CoverArtProvider;
use crate::providers::fanart::FanartProvider;
use crate::providers::lastfm::LastFmProvider;
use crate::providers::lrclib::LrcLibProvider;
use crate::providers::lyricsovh::LyricsOvhProvider;
use crate::providers::musicbrainz::MusicBrainzProvider;
use crate::providers::{IdentityResolver, LyricsProvider, MetadataProvider};

/// The music metadata service: cache + aggregation engines.
pub struct MusicDataService {
    cache: CacheRepository,
    music: MusicAggregator,
    lyrics: LyricsAggregator,
    negative_ttl: Option<Duration>,
}

impl MusicDataService {
    /// Wire providers, limiters and the cache from configuration.
    ///
    /// The configured `providers.order` / `providers.lyrics_order` lists
    /// define fan-out priority; unknown names are ignored.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let db_url = crate::db::db_url(config.cache.db_path.as_deref());
        let cache = CacheRepository::connect(&db_url)
            .await
            .with_context("opening cache database")?;

        let musicbrainz = Arc::new(MusicBrainzProvider::new(&config.providers.musicbrainz));

        let mut providers: Vec<Arc<dyn MetadataProvider>> = Vec::new();
        for name in &config.providers.order {
            match ProviderId::parse(name) {
                Some(ProviderId::MusicBrainz) => {
                    providers.push(Arc::clone(&musicbrainz) as Arc<dyn MetadataProvider>);
                }
                Some(ProviderId::LastFm) => providers.push(Arc::new(LastFmProvider::new(
                    &config.providers.lastfm,
                    &config.credentials,
                ))),
                Some(ProviderId::Fanart) => providers.push(Arc::new(FanartProvider::new(
                    &config.providers.fanart,
                    &config.credentials,
                ))),
                Some(ProviderId::CoverArt) => {
                    providers.push(Arc::new(CoverArtProvider::new(&config.providers.coverart)));
                }
                Some(_) | None => {
                    tracing::warn!(name = %name, "unknown metadata provider in providers.order");
                }
            }
        }

        let mut lyrics_providers: Vec<Arc<dyn LyricsProvider>> = Vec::new();
        for name in &config.providers.lyrics_order {
            match ProviderId::parse(name) {
                Some(ProviderId::LrcLib) => {
                    lyrics_providers.push(Arc::new(LrcLibProvider::new(&config.providers.lrclib)));
                }
                Some(ProviderId::LyricsOvh) => lyrics_providers
                    .push(Arc::new(LyricsOvhProvider::new(&config.providers.lyricsovh))),
                Some(_) | None => {
                    tracing::warn!(name = %name, "unknown lyrics provider in providers.lyrics_order");
                }
            }
        }

        let all_ids = providers
            .iter()
            .map(|p| p.id())
            .chain(lyrics_providers.iter().map(|p| p.id()));
        let limiters = Arc::new(LimiterSet::from_config(&config.rate_limits, all_ids));

        let resolver: Arc<dyn IdentityResolver> = musicbrainz;
        let music = MusicAggregator::new(providers, resolver, Arc::clone(&limiters));
        let lyrics = LyricsAggregator::new(lyrics_providers, limiters);

        Ok(Self {
            cache,
            music,
            lyrics,
            negative_ttl: config.cache.negative_ttl_secs.map(Duration::from_secs),
        })
    }

    /// Test constructor over pre-built parts.
    #[cfg(test)]
    pub fn from_parts(
        cache: CacheRepository,
        music: MusicAggregator,
        lyrics: LyricsAggregator,
        negative_ttl: Option<Duration>,
    ) -> Self {
        Self {
            cache,
            music,
            lyrics,
            negative_ttl,
        }
    }

    // ------------------------------------------------------------------
    // Artists
    // ------------------------------------------------------------------

    pub async fn artist_by_name(&self, name: &str) -> Result<Option<ArtistRecord>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        match self.check_cached(self.cache.artist_by_name(name).await?) {
            CacheOutcome::Hit(record) => {
                info!(name, "artist found in cache");
                return Ok(Some(ArtistRecord {
                    provenance: Provenance::Cache,
                    ..record
                }));
            }
            CacheOutcome::NegativeHit => {
                info!(name, "artist negative-cached, skipping providers");
                return Ok(None);
            }
            CacheOutcome::Miss => {}
        }

        match self.music.artist_by_name(name).await {
            Some(artist) => {
                self.cache.upsert_artist(&artist).await?;
                info!(name, "artist aggregated and cached");
                Ok(Some(artist))
            }
            None => {
                info!(name, "artist not found in any music service");
                if self.negative_ttl.is_some() {
                    self.cache
                        .upsert_artist(&ArtistRecord::not_found(name))
                        .await?;
                }
                Ok(None)
            }
        }
    }

    pub async fn artist_by_mbid(&self, mbid: &str) -> Result<Option<ArtistRecord>> {
        if mbid.trim().is_empty() {
            return Ok(None);
        }

        match self.check_cached(self.cache.artist_by_mbid(mbid).await?) {
            CacheOutcome::Hit(record) => {
                info!(mbid, "artist found in cache");
                return Ok(Some(ArtistRecord {
                    provenance: Provenance::Cache,
                    ..record
                }));
            }
            CacheOutcome::NegativeHit => return Ok(None),
            CacheOutcome::Miss => {}
        }

        match self.music.artist_by_id(mbid).await {
            Some(artist) => {
                self.cache.upsert_artist(&artist).await?;
                info!(mbid, "artist aggregated and cached");
                Ok(Some(artist))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Albums
    // ------------------------------------------------------------------

    pub async fn album_by_name(&self, name: &str, artist_mbid: &str) -> Result<Option<AlbumRecord>> {
        if name.trim().is_empty() || artist_mbid.trim().is_empty() {
            return Ok(None);
        }

        match self.check_cached(self.cache.album_by_name(name, artist_mbid).await?) {
            CacheOutcome::Hit(record) => {
                info!(name, "album found in cache");
                return Ok(Some(AlbumRecord {
                    provenance: Provenance::Cache,
                    ..record
                }));
            }
            CacheOutcome::NegativeHit => {
                info!(name, "album negative-cached, skipping providers");
                return Ok(None);
            }
            CacheOutcome::Miss => {}
        }

        match self.music.album_by_name(name, artist_mbid).await {
            Some(album) => {
                self.cache.upsert_album(&album).await?;
                info!(name, artist = ?album.artist, "album aggregated and cached");
                Ok(Some(album))
            }
            None => {
                info!(name, "album not found in any music service");
                if self.negative_ttl.is_some() {
                    self.cache
                        .upsert_album(&AlbumRecord::not_found(name, artist_mbid))
                        .await?;
                }
                Ok(None)
            }
        }
    }

    pub async fn album_by_mbid(
        &self,
        release_mbid: &str,
        release_group_mbid: Option<&str>,
        artist_mbid: &str,
    ) -> Result<Option<AlbumRecord>> {
        if release_mbid.trim().is_empty() || artist_mbid.trim().is_empty() {
            return Ok(None);
        }

        match self.check_cached(self.cache.album_by_mbid(release_mbid).await?) {
            CacheOutcome::Hit(record) => {
                info!(release_mbid, "album found in cache");
                return Ok(Some(AlbumRecord {
                    provenance: Provenance::Cache,
                    ..record
                }));
            }
            CacheOutcome::NegativeHit => return Ok(None),
            CacheOutcome::Miss => {}
        }

        match self
            .music
            .album_by_ids(release_mbid, release_group_mbid, artist_mbid)
            .await
        {
            Some(album) => {
                self.cache.upsert_album(&album).await?;
                info!(release_mbid, "album aggregated and cached");
                Ok(Some(album))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Lyrics
    // ------------------------------------------------------------------

    pub async fn lyrics(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        duration: u32,
    ) -> Result<Option<LyricsRecord>> {
        if title.trim().is_empty() || artist.trim().is_empty() {
            return Ok(None);
        }

        match self.check_cached(self.cache.lyrics_by_key(title, artist).await?) {
            CacheOutcome::Hit(record) => {
                info!(title, artist, "lyrics found in cache");
                return Ok(Some(LyricsRecord {
                    provenance: Provenance::Cache,
                    ..record
                }));
            }
            CacheOutcome::NegativeHit => {
                info!(title, artist, "lyrics negative-cached, skipping providers");
                return Ok(None);
            }
            CacheOutcome::Miss => {}
        }

        match self.lyrics.lyrics(title, artist, album, duration).await {
            Some(lyrics) => {
                self.cache.upsert_lyrics(&lyrics).await?;
                info!(title, artist, "lyrics aggregated and cached");
                Ok(Some(lyrics))
            }
            None => {
                info!(title, artist, "lyrics not found in any lyrics service");
                if self.negative_ttl.is_some() {
                    self.cache
                        .upsert_lyrics(&LyricsRecord::not_found(title, artist))
                        .await?;
                }
                Ok(None)
            }
        }
    }

    /// Classify a cache row: real hit, still-valid negative sentinel, or
    /// miss (including an expired sentinel).
    fn check_cached<T: HasProvenance>(&self, cached: Option<Cached<T>>) -> CacheOutcome<T> {
        let Some(cached) = cached else {
            return CacheOutcome::Miss;
        };

        if cached.record.provenance() != Provenance::NotFound {
            return CacheOutcome::Hit(cached.record);
        }

        match self.negative_ttl {
            Some(ttl) => {
                let age = Utc::now().signed_duration_since(cached.updated_at);
                if age.to_std().map(|a| a < ttl).unwrap_or(false) {
                    CacheOutcome::NegativeHit
                } else {
                    CacheOutcome::Miss
                }
            }
            // Negative caching disabled: a leftover sentinel is a miss.
            None => CacheOutcome::Miss,
        }
    }
}

enum CacheOutcome<T> {
    Hit(T),
    NegativeHit,
    Miss,
}

trait HasProvenance {
    fn provenance(&self) -> Provenance;
}

impl HasProvenance for ArtistRecord {
    fn provenance(&self) -> Provenance {
        self.provenance
    }
}

impl HasProvenance for AlbumRecord {
    fn provenance(&self) -> Provenance {
        self.provenance
    }
}

impl HasProvenance for LyricsRecord {
    fn provenance(&self) -> Provenance {
        self.provenance
    }
}
