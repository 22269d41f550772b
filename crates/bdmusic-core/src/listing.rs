//! Album listing page parsing.

use regex::Regex;
use scraper::{Html, Selector};

/// Anchors inside the listing's song container.
const SONG_ANCHOR_SELECTOR: &str = "div.list-group a.list-group-item";

/// Final `<segment>.html` path component of a song link.
const SONG_HREF_PATTERN: &str = r"(?i)/([^/]+)\.html$";

/// One downloadable song, identified by the final path segment of its link
/// (`.html` suffix removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef {
    pub path_segment: String,
}

/// Extracts song references from a listing page, in document order.
///
/// Links ending in `.zip` are archives, not songs, and are skipped; so is
/// anything without a final `.html` path component (e.g. the back-link to
/// the parent directory, which ends in `/`).
pub fn extract_song_refs(html: &str) -> Vec<SongRef> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse(SONG_ANCHOR_SELECTOR).expect("valid anchor selector");
    let href_re = Regex::new(SONG_HREF_PATTERN).expect("valid song href pattern");

    document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| song_path_from_href(&href_re, href))
        .map(|path_segment| SongRef { path_segment })
        .collect()
}

/// `.html`-stripped final path segment, or None for archives and non-song
/// links. The extension check is case-insensitive.
fn song_path_from_href(href_re: &Regex, href: &str) -> Option<String> {
    let segment = href_re.captures(href)?.get(1)?.as_str();
    if segment.to_ascii_lowercase().ends_with(".zip") {
        return None;
    }
    Some(segment.to_string())
}
