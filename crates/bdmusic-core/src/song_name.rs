//! Song display names.

use regex::Regex;

/// Watermark advertising the site, embedded in raw song filenames. Tolerates
/// optional parentheses, an optional `www.` prefix and stray whitespace.
const WATERMARK_PATTERN: &str = r"(?i)\s*\(?\s*(?:www\.)?music\.com\.bd\s*\)?\s*";

/// Local filename for a song: the raw URL path segment with every watermark
/// occurrence removed. Removal is idempotent.
pub fn display_name(song_path: &str) -> String {
    let watermark = Regex::new(WATERMARK_PATTERN).expect("valid watermark pattern");
    watermark.replace_all(song_path, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_watermark() {
        assert_eq!(
            display_name("01. Foo - Bar (music.com.bd).mp3"),
            "01. Foo - Bar.mp3"
        );
        assert_eq!(
            display_name("01. Foo - Bar(music.com.bd) .mp3"),
            "01. Foo - Bar.mp3"
        );
        assert_eq!(
            display_name("01. Foo - Bar ( music.com.bd ) .mp3"),
            "01. Foo - Bar.mp3"
        );
        assert_eq!(
            display_name("01. Foo - Bar(www.music.com.bd).mp3"),
            "01. Foo - Bar.mp3"
        );
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(
            display_name("01. Foo (Music.Com.BD).mp3"),
            "01. Foo.mp3"
        );
    }

    #[test]
    fn untouched_without_watermark() {
        assert_eq!(display_name("07. Foo Bar.mp3"), "07. Foo Bar.mp3");
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = display_name("01. Foo - Bar (music.com.bd).mp3");
        assert_eq!(display_name(&once), once);
    }
}
