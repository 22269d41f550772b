//! Album download pipeline.
//!
//! Fetches the listing page, extracts song references, resolves the album
//! directory and fans out one download task per song, waiting for all of
//! them. Song failures are isolated: one missing song never aborts its
//! siblings, and nothing is retried. The album directory is only created
//! once at least one song is known, so a missing album or an empty listing
//! leaves the filesystem untouched.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::album_dir;
use crate::config::BdmusicConfig;
use crate::fetcher::{self, FetchBudget, FetchError, FetchOptions};
use crate::listing::{self, SongRef};
use crate::site_url::SiteEndpoints;
use crate::song_name;

/// One album to download. The artist must be non-empty (validated at the
/// CLI boundary before any network activity).
#[derive(Debug, Clone)]
pub struct AlbumRequest {
    pub artist: String,
    pub album: String,
}

/// How an album run ended.
#[derive(Debug)]
pub enum AlbumRunOutcome {
    /// Listing fetched and songs downloaded; `missing` counts songs that
    /// could not be fetched or written.
    Saved {
        album_dir: PathBuf,
        saved: usize,
        missing: usize,
    },
    /// The listing request came back with a non-200 status.
    AlbumNotFound,
    /// The listing parsed but contained no song links.
    NoSongs,
}

/// Fatal album-run failures.
#[derive(Debug, thiserror::Error)]
pub enum AlbumRunError {
    /// The listing host could not be reached at all.
    #[error("network error while connecting to URL \"{url}\"")]
    ListingConnect {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Progress events emitted while songs download.
#[derive(Debug, Clone)]
pub enum SongEvent {
    /// A song download task started.
    Started { name: String },
    /// The song's URL did not yield its bytes.
    NotFound { name: String },
    /// The song was fetched but could not be written to disk.
    SaveFailed { name: String },
}

/// Runs the whole pipeline for one album and reports the outcome. Progress
/// events are sent to `progress_tx` when given.
pub async fn run_album(
    endpoints: &SiteEndpoints,
    request: &AlbumRequest,
    destination: &Path,
    cfg: &BdmusicConfig,
    progress_tx: Option<mpsc::Sender<SongEvent>>,
) -> Result<AlbumRunOutcome, AlbumRunError> {
    let options = FetchOptions::from(&cfg.fetch);
    let budget = match cfg.max_parallel_downloads {
        Some(n) => FetchBudget::new(n),
        None => FetchBudget::for_host(),
    };

    let listing_url = endpoints.listing_url(&request.artist, &request.album);
    tracing::debug!("fetching listing {}", listing_url);

    let listing = match fetcher::fetch(&listing_url, options, &budget).await {
        Ok(response) => response,
        Err(FetchError::Connect(source)) => {
            return Err(AlbumRunError::ListingConnect {
                url: listing_url,
                source,
            });
        }
        Err(e @ FetchError::Pool(_)) => {
            return Err(anyhow::Error::new(e)
                .context("fetch listing page")
                .into());
        }
    };
    if !listing.is_success() {
        tracing::info!("listing {} returned HTTP {}", listing_url, listing.status);
        return Ok(AlbumRunOutcome::AlbumNotFound);
    }

    let songs = listing::extract_song_refs(&listing.text());
    if songs.is_empty() {
        return Ok(AlbumRunOutcome::NoSongs);
    }
    tracing::info!("{} song(s) listed at {}", songs.len(), listing_url);

    let album_dir = album_dir::resolve_album_dir(destination, &request.artist, &request.album)
        .context("resolve album directory")?;

    let (saved, missing) = download_all(
        endpoints,
        request,
        songs,
        &album_dir,
        options,
        &budget,
        progress_tx,
    )
    .await?;

    tracing::info!(
        "album run finished: {} saved, {} missing in {}",
        saved,
        missing,
        album_dir.display()
    );
    Ok(AlbumRunOutcome::Saved {
        album_dir,
        saved,
        missing,
    })
}

/// Launches every song download together and waits for all of them; no
/// completion order is assumed and no task cancels another.
async fn download_all(
    endpoints: &SiteEndpoints,
    request: &AlbumRequest,
    songs: Vec<SongRef>,
    album_dir: &Path,
    options: FetchOptions,
    budget: &FetchBudget,
    progress_tx: Option<mpsc::Sender<SongEvent>>,
) -> Result<(usize, usize), AlbumRunError> {
    let mut tasks = JoinSet::new();
    for song in songs {
        let endpoints = endpoints.clone();
        let artist = request.artist.clone();
        let album = request.album.clone();
        let album_dir = album_dir.to_path_buf();
        let budget = budget.clone();
        let tx = progress_tx.clone();
        tasks.spawn(async move {
            download_song(&endpoints, &artist, &album, &song, &album_dir, options, &budget, &tx)
                .await
        });
    }
    drop(progress_tx);

    let mut saved = 0usize;
    let mut missing = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let song_saved = joined.map_err(|e| anyhow::anyhow!("song task join: {}", e))?;
        if song_saved {
            saved += 1;
        } else {
            missing += 1;
        }
    }
    Ok((saved, missing))
}

/// Fetches one song and writes it into the album directory. Returns whether
/// the file was saved.
#[allow(clippy::too_many_arguments)]
async fn download_song(
    endpoints: &SiteEndpoints,
    artist: &str,
    album: &str,
    song: &SongRef,
    album_dir: &Path,
    options: FetchOptions,
    budget: &FetchBudget,
    progress_tx: &Option<mpsc::Sender<SongEvent>>,
) -> bool {
    let name = song_name::display_name(&song.path_segment);
    emit(progress_tx, SongEvent::Started { name: name.clone() }).await;

    let url = endpoints.song_download_url(artist, album, &song.path_segment);
    let response = match fetcher::fetch(&url, options, budget).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            tracing::warn!("song {} returned HTTP {}", url, response.status);
            emit(progress_tx, SongEvent::NotFound { name }).await;
            return false;
        }
        // A connect failure on a song URL only costs that one song.
        Err(e) => {
            tracing::warn!("song fetch failed: {}: {}", url, e);
            emit(progress_tx, SongEvent::NotFound { name }).await;
            return false;
        }
    };

    let path = album_dir.join(&name);
    match tokio::fs::write(&path, &response.body).await {
        Ok(()) => {
            tracing::debug!("saved {} ({} bytes)", path.display(), response.body.len());
            true
        }
        Err(e) => {
            tracing::warn!("could not write {}: {}", path.display(), e);
            emit(progress_tx, SongEvent::SaveFailed { name }).await;
            false
        }
    }
}

async fn emit(tx: &Option<mpsc::Sender<SongEvent>>, event: SongEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event).await;
    }
}
