//! Cache repository for aggregated records.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage. Each entity
//! table carries its lookup keys as columns (canonical mbid plus the
//! case-insensitive name/secondary key) and the full record as a JSON
//! payload, so the schema never chases the record shape.
//!
//! Upserts match by canonical id first, then by name/secondary key,
//! inserting when nothing matches and otherwise updating in place while
//! bumping `version` and `updated_at`. Each upsert runs in a transaction,
//! which is what gives the read-then-write sequence its per-key
//! atomicity.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::model::{AlbumRecord, ArtistRecord, LyricsRecord};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_data.db";

/// Build a SQLite database URL from an optional path.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// A cached record together with its storage timestamp.
///
/// The timestamp drives negative-cache TTL decisions; the record itself
/// carries the provenance it was stored with.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub record: T,
    pub updated_at: DateTime<Utc>,
}

/// Keyed local store for aggregated records.
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    /// Open (creating if necessary) the cache database and its schema.
    pub async fn connect(db_url: &str) -> Result<Self> {
        if !db_url.contains(":memory:")
            && !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false)
        {
            sqlx::Sqlite::create_database(db_url)
                .await
                .map_err(crate::error::Error::Database)?;
        }

        // An in-memory database exists per connection, so the pool must
        // not open a second one.
        let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await
            .map_err(crate::error::Error::Database)?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    // ------------------------------------------------------------------
    // Artists
    // ------------------------------------------------------------------

    pub async fn artist_by_mbid(&self, mbid: &str) -> Result<Option<Cached<ArtistRecord>>> {
        self.fetch("SELECT payload, updated_at FROM artists WHERE mbid = ?1", &[mbid])
            .await
    }

    /// Name lookup is case-insensitive (`COLLATE NOCASE` on the column).
    pub async fn artist_by_name(&self, name: &str) -> Result<Option<Cached<ArtistRecord>>> {
        self.fetch("SELECT payload, updated_at FROM artists WHERE name = ?1", &[name])
            .await
    }

    pub async fn upsert_artist(&self, record: &ArtistRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let mut existing: Option<(i64,)> = None;
        if let Some(mbid) = record.mbid.as_deref().filter(|m| !m.trim().is_empty()) {
            existing = sqlx::query_as("SELECT id FROM artists WHERE mbid = ?1")
                .bind(mbid)
                .fetch_optional(&mut *tx)
                .await?;
        }
        if existing.is_none() {
            existing = sqlx::query_as("SELECT id FROM artists WHERE name = ?1")
                .bind(&record.name)
                .fetch_optional(&mut *tx)
                .await?;
        }

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE artists SET mbid = ?1, name = ?2, payload = ?3, \
                     updated_at = ?4, version = version + 1 WHERE id = ?5",
                )
                .bind(&record.mbid)
                .bind(&record.name)
                .bind(&payload)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO artists (mbid, name, payload, updated_at, version) \
                     VALUES (?1, ?2, ?3, ?4, 1)",
                )
                .bind(&record.mbid)
                .bind(&record.name)
                .bind(&payload)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Albums
    // ------------------------------------------------------------------

    pub async fn album_by_mbid(&self, mbid: &str) -> Result<Option<Cached<AlbumRecord>>> {
        self.fetch("SELECT payload, updated_at FROM albums WHERE mbid = ?1", &[mbid])
            .await
    }

    /// Albums are named per artist, so the name lookup carries the artist
    /// mbid as its secondary key.
    pub async fn album_by_name(
        &self,
        name: &str,
        artist_mbid: &str,
    ) -> Result<Option<Cached<AlbumRecord>>> {
        self.fetch(
            "SELECT payload, updated_at FROM albums WHERE name = ?1 AND artist_mbid = ?2",
            &[name, artist_mbid],
        )
        .await
    }

    pub async fn upsert_album(&self, record: &AlbumRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();
        let artist_mbid = record.artist_mbid.clone().unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        let mut existing: Option<(i64,)> = None;
        if let Some(mbid) = record.mbid.as_deref().filter(|m| !m.trim().is_empty()) {
            existing = sqlx::query_as("SELECT id FROM albums WHERE mbid = ?1")
                .bind(mbid)
                .fetch_optional(&mut *tx)
                .await?;
        }
        if existing.is_none() {
            existing =
                sqlx::query_as("SELECT id FROM albums WHERE name = ?1 AND artist_mbid = ?2")
                    .bind(&record.name)
                    .bind(&artist_mbid)
                    .fetch_optional(&mut *tx)
                    .await?;
        }

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE albums SET mbid = ?1, name = ?2, artist_mbid = ?3, payload = ?4, \
                     updated_at = ?5, version = version + 1 WHERE id = ?6",
                )
                .bind(&record.mbid)
                .bind(&record.name)
                .bind(&artist_mbid)
                .bind(&payload)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO albums (mbid, name, artist_mbid, payload, updated_at, version) \
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                )
                .bind(&record.mbid)
                .bind(&record.name)
                .bind(&artist_mbid)
                .bind(&payload)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lyrics
    // ------------------------------------------------------------------

    /// Lyrics have no canonical id; (title, artist) is the whole key.
    pub async fn lyrics_by_key(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<Cached<LyricsRecord>>> {
        self.fetch(
            "SELECT payload, updated_at FROM lyrics WHERE title = ?1 AND artist = ?2",
            &[title, artist],
        )
        .await
    }

    pub async fn upsert_lyrics(&self, record: &LyricsRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM lyrics WHERE title = ?1 AND artist = ?2")
                .bind(&record.title)
                .bind(&record.artist)
                .fetch_optional(&mut *tx)
                .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE lyrics SET payload = ?1, updated_at = ?2, \
                     version = version + 1 WHERE id = ?3",
                )
                .bind(&payload)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO lyrics (title, artist, payload, updated_at, version) \
                     VALUES (?1, ?2, ?3, ?4, 1)",
                )
                .bind(&record.title)
                .bind(&record.artist)
                .bind(&payload)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Option<Cached<T>>> {
        let mut query = sqlx::query_as::<_, (String, String)>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }

        let Some((payload, updated_at)) = query.fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let record: T = serde_json::from_str(&payload)?;
        // A malformed timestamp just counts as ancient, which errs on the
        // side of re-fetching.
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);

        Ok(Some(Cached { record, updated_at }))
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS artists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mbid TEXT,
        name TEXT NOT NULL COLLATE NOCASE,
        payload TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE INDEX IF NOT EXISTS idx_artists_mbid ON artists(mbid)",
    "CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name)",
    "CREATE TABLE IF NOT EXISTS albums (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mbid TEXT,
        name TEXT NOT NULL COLLATE NOCASE,
        artist_mbid TEXT NOT NULL DEFAULT '',
        payload TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE INDEX IF NOT EXISTS idx_albums_mbid ON albums(mbid)",
    "CREATE INDEX IF NOT EXISTS idx_albums_name ON albums(name, artist_mbid)",
    "CREATE TABLE IF NOT EXISTS lyrics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL COLLATE NOCASE,
        artist TEXT NOT NULL COLLATE NOCASE,
        payload TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE INDEX IF NOT EXISTS idx_lyrics_key ON lyrics(title, artist)",
];
