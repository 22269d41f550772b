//! CLI for the bdmusic album downloader.

use anyhow::{bail, Context, Result};
use bdmusic_core::album::{self, AlbumRequest, AlbumRunError, AlbumRunOutcome, SongEvent};
use bdmusic_core::config;
use bdmusic_core::site_url::SiteEndpoints;
use clap::Parser;
use std::path::PathBuf;

/// Music album downloader for music.com.bd.
#[derive(Debug, Parser)]
#[command(name = "bdmusic")]
#[command(about = "Download a music.com.bd album into a local directory", long_about = None)]
pub struct Cli {
    /// Name of the artist. This must correspond to the name shown in the
    /// browser address bar, i.e. the URL path. For
    /// `https://www.music.com.bd/download/browse/A/Abbasuddin Ahmed/` pass
    /// 'Abbasuddin Ahmed' (quoted so the shell keeps a name with whitespace
    /// as one argument).
    #[arg(long)]
    pub artist: String,

    /// Name of the album, as shown in the URL path. For
    /// `https://www.music.com.bd/download/browse/A/Arnob/Hok Kolorob/` pass
    /// 'Hok Kolorob'. Pass '' to download straight from the artist's
    /// directory.
    #[arg(long)]
    pub album: String,

    /// Directory where the album is saved; missing parents are created.
    /// Defaults to the current directory.
    #[arg(long)]
    pub destination: Option<String>,
}

/// Validated arguments: trimmed artist/album, resolved destination.
#[derive(Debug)]
pub struct DownloadArgs {
    pub artist: String,
    pub album: String,
    pub destination: PathBuf,
}

impl Cli {
    /// Trims and validates the raw flags. Artist and destination must be
    /// non-empty after trimming; the album may be empty.
    pub fn into_args(self) -> Result<DownloadArgs> {
        let artist = self.artist.trim().to_string();
        if artist.is_empty() {
            bail!("artist name cannot be empty");
        }
        let album = self.album.trim().to_string();
        let destination = match self.destination.as_deref().map(str::trim) {
            Some("") => bail!("destination directory cannot be empty"),
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().context("resolve current directory")?,
        };
        Ok(DownloadArgs {
            artist,
            album,
            destination,
        })
    }
}

/// Parses arguments, runs the download pipeline and returns the process
/// exit code: 0 on completion or an empty listing, 1 when the album page is
/// missing, 2 when the listing host cannot be reached.
pub async fn run_from_args() -> Result<i32> {
    let args = Cli::parse().into_args()?;
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let endpoints = SiteEndpoints::default();
    let request = AlbumRequest {
        artist: args.artist,
        album: args.album,
    };

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<SongEvent>(16);
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                SongEvent::Started { name } => println!("Downloading song \"{}\"", name),
                SongEvent::NotFound { name } => println!("Song not found: \"{}\"", name),
                SongEvent::SaveFailed { name } => eprintln!("Could not save song \"{}\"", name),
            }
        }
    });

    let outcome = album::run_album(
        &endpoints,
        &request,
        &args.destination,
        &cfg,
        Some(progress_tx),
    )
    .await;
    let _ = printer.await;

    match outcome {
        Ok(AlbumRunOutcome::Saved {
            album_dir,
            saved,
            missing,
        }) => {
            if missing > 0 {
                eprintln!("{} song(s) could not be downloaded", missing);
            }
            tracing::info!("saved {} song(s), {} missing", saved, missing);
            println!("\nAll songs saved in \"{}\"\n", album_dir.display());
            Ok(0)
        }
        Ok(AlbumRunOutcome::AlbumNotFound) => {
            eprintln!("Album not found!");
            Ok(1)
        }
        Ok(AlbumRunOutcome::NoSongs) => {
            eprintln!("No songs found on the album!");
            Ok(0)
        }
        Err(AlbumRunError::ListingConnect { url, source }) => {
            tracing::error!("listing connect failed: {}: {}", url, source);
            eprintln!("Network error while connecting to URL \"{}\"", url);
            Ok(2)
        }
        Err(AlbumRunError::Other(err)) => Err(err),
    }
}
