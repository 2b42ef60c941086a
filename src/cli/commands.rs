//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed
//! arguments and returns an `anyhow::Result<()>`. Results are printed as
//! pretty JSON so the output can be piped into other tooling.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::{self, Config};
use crate::service::MusicDataService;

/// Music Data CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Look up an artist by name or MusicBrainz id
    Artist {
        /// Artist name (resolved to a MusicBrainz id via fuzzy search)
        name: Option<String>,
        /// Canonical MusicBrainz artist id (skips resolution)
        #[arg(long)]
        mbid: Option<String>,
    },
    /// Look up an album for an artist
    Album {
        /// Album name
        name: Option<String>,
        /// MusicBrainz artist id the album belongs to
        #[arg(long)]
        artist_mbid: String,
        /// Canonical MusicBrainz release id (skips resolution)
        #[arg(long)]
        release_mbid: Option<String>,
        /// MusicBrainz release-group id (only with --release-mbid)
        #[arg(long)]
        release_group_mbid: Option<String>,
    },
    /// Write a default config file to the OS config directory
    Init,
    /// Look up lyrics for a song
    Lyrics {
        /// Song title
        title: String,
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Album name (helps exact matching)
        #[arg(long, default_value = "")]
        album: String,
        /// Track duration in seconds (helps exact matching)
        #[arg(long, default_value_t = 0)]
        duration: u32,
    },
}

/// Run the parsed command to completion.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Init = cli.command {
        return init_config();
    }

    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    let runtime = Runtime::new()?;
    runtime.block_on(run_async(&cli.command, &config))
}

/// Write a default config file without clobbering an existing one.
fn init_config() -> anyhow::Result<()> {
    let path = config::config_path()
        .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
    if path.exists() {
        anyhow::bail!("config already exists at {}", path.display());
    }
    config::save(&Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn run_async(command: &Commands, config: &Config) -> anyhow::Result<()> {
    let service = MusicDataService::from_config(config).await?;

    match command {
        Commands::Artist { name, mbid } => {
            let artist = match (mbid, name) {
                (Some(mbid), _) => service.artist_by_mbid(mbid).await?,
                (None, Some(name)) => service.artist_by_name(name).await?,
                (None, None) => anyhow::bail!("provide an artist name or --mbid"),
            };
            print_result(&artist)
        }
        Commands::Album {
            name,
            artist_mbid,
            release_mbid,
            release_group_mbid,
        } => {
            let album = match (release_mbid, name) {
                (Some(release), _) => {
                    service
                        .album_by_mbid(release, release_group_mbid.as_deref(), artist_mbid)
                        .await?
                }
                (None, Some(name)) => service.album_by_name(name, artist_mbid).await?,
                (None, None) => anyhow::bail!("provide an album name or --release-mbid"),
            };
            print_result(&album)
        }
        Commands::Lyrics {
            title,
            artist,
            album,
            duration,
        } => {
            let lyrics = service.lyrics(title, artist, album, *duration).await?;
            print_result(&lyrics)
        }
        // Handled before the runtime starts.
        Commands::Init => Ok(()),
    }
}

/// Print a query result as pretty JSON; "not found" exits cleanly.
fn print_result<T: serde::Serialize>(result: &Option<T>) -> anyhow::Result<()> {
    match result {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        None => {
            debug!("no record found");
            println!("null");
        }
    }
    Ok(())
}
