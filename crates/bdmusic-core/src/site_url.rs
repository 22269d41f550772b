//! Site URL construction.
//!
//! Listing pages live under the browse host, song binaries under the
//! download host. An artist's first letter (uppercased) is the namespace
//! directory both hosts sort content into. Listing URLs always end in `/`;
//! song download URLs never do.

/// Browse host serving album listing pages.
const DEFAULT_BROWSE_BASE: &str = "https://www.music.com.bd/download/browse";

/// Download host serving song binaries.
const DEFAULT_DOWNLOAD_BASE: &str = "https://download.music.com.bd/Music";

/// Base URLs of the site, threaded explicitly so tests can point at a local
/// server.
#[derive(Debug, Clone)]
pub struct SiteEndpoints {
    pub browse_base: String,
    pub download_base: String,
}

impl Default for SiteEndpoints {
    fn default() -> Self {
        Self {
            browse_base: DEFAULT_BROWSE_BASE.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
        }
    }
}

impl SiteEndpoints {
    /// URL of the album listing page. Always ends with `/`; with an empty
    /// album it points at the artist's root directory.
    pub fn listing_url(&self, artist: &str, album: &str) -> String {
        join_segments(
            &self.browse_base,
            &[&namespace(artist), artist, album],
            true,
        )
    }

    /// Direct download URL for one song. Never ends with `/`.
    pub fn song_download_url(&self, artist: &str, album: &str, song_path: &str) -> String {
        join_segments(
            &self.download_base,
            &[&namespace(artist), artist, album, song_path],
            false,
        )
    }
}

/// Song URLs carry no trailing slash; listing URLs always do.
pub fn is_song_url(url: &str) -> bool {
    !url.ends_with('/')
}

/// Namespace directory: uppercased first character of the artist.
fn namespace(artist: &str) -> String {
    artist
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Joins percent-encoded path segments onto `base`. Empty segments are
/// skipped so an empty album collapses out of the path.
fn join_segments(base: &str, segments: &[&str], trailing_slash: bool) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    if trailing_slash {
        url.push('/');
    }
    url
}
