//! Music Data - a cache-first music metadata aggregation service.
//!
//! Answers artist, album and lyrics queries by consulting a local SQLite
//! cache first and, on a miss, fanning the request out concurrently to
//! several rate-limited upstream providers (MusicBrainz, Last.fm,
//! Fanart.tv, Cover Art Archive, LrcLib, Lyrics.ovh), merging their
//! partial answers into one record.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod limiter;
pub mod model;
pub mod providers;
pub mod service;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_data=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
