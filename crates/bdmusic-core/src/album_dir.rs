//! Album directory resolution.
//!
//! Computes a collision-free directory under the destination root and
//! creates it before any song is fetched.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Mode for created directories (owner rwx, group/other rx).
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Collision-suffix attempts before giving up.
const MAX_CREATE_ATTEMPTS: u32 = 32;

/// Creates a fresh album directory under `destination` and returns its
/// absolute path.
///
/// The destination root is created first, with parents. The directory name
/// is `{album}_{artist}`, or just `{artist}` when the album is empty. While
/// the name is taken, a fresh random 10-hex-char suffix is appended and
/// creation retried, so two calls with identical arguments never return the
/// same path.
pub fn resolve_album_dir(destination: &Path, artist: &str, album: &str) -> Result<PathBuf> {
    create_dir(destination, true)
        .with_context(|| format!("create destination directory: {}", destination.display()))?;

    let base_name = if album.is_empty() {
        artist.to_string()
    } else {
        format!("{}_{}", album, artist)
    };

    let mut name = base_name.clone();
    for _ in 0..MAX_CREATE_ATTEMPTS {
        let candidate = destination.join(&name);
        match create_dir(&candidate, false) {
            Ok(()) => {
                return candidate.canonicalize().with_context(|| {
                    format!("resolve album directory: {}", candidate.display())
                });
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                name = format!("{}_{}", base_name, random_suffix());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("create album directory: {}", candidate.display())
                });
            }
        }
    }

    bail!(
        "no free album directory name under {} after {} attempts",
        destination.display(),
        MAX_CREATE_ATTEMPTS
    );
}

/// 10 lowercase hex characters from 5 random bytes.
fn random_suffix() -> String {
    let token: [u8; 5] = rand::random();
    hex::encode(token)
}

#[cfg(unix)]
fn create_dir(path: &Path, recursive: bool) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(recursive)
        .mode(DIR_MODE)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path, recursive: bool) -> std::io::Result<()> {
    fs::DirBuilder::new().recursive(recursive).create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_album_underscore_artist() {
        let root = tempfile::tempdir().unwrap();
        let dir = resolve_album_dir(root.path(), "Foo Bar", "Spam Egg").unwrap();
        assert!(dir.is_dir());
        assert!(dir.is_absolute());
        assert_eq!(
            dir.file_name().unwrap().to_str().unwrap(),
            "Spam Egg_Foo Bar"
        );
    }

    #[test]
    fn empty_album_uses_artist_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = resolve_album_dir(root.path(), "Foo Bar", "").unwrap();
        assert_eq!(dir.file_name().unwrap().to_str().unwrap(), "Foo Bar");
    }

    #[test]
    fn creates_missing_destination_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let dir = resolve_album_dir(&nested, "Foo", "Bar").unwrap();
        assert!(dir.is_dir());
        assert!(dir.starts_with(nested.canonicalize().unwrap()));
    }

    #[test]
    fn collision_appends_random_hex_suffix() {
        let root = tempfile::tempdir().unwrap();
        let first = resolve_album_dir(root.path(), "Foo Bar", "Spam Egg").unwrap();
        let second = resolve_album_dir(root.path(), "Foo Bar", "Spam Egg").unwrap();
        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(second.is_dir());

        let suffix_re = regex::Regex::new(r"^Spam Egg_Foo Bar_[0-9a-f]{10}$").unwrap();
        let second_name = second.file_name().unwrap().to_str().unwrap();
        assert!(
            suffix_re.is_match(second_name),
            "unexpected directory name {:?}",
            second_name
        );
    }

    #[test]
    fn repeated_collisions_stay_distinct() {
        let root = tempfile::tempdir().unwrap();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5 {
            let dir = resolve_album_dir(root.path(), "Foo", "Bar").unwrap();
            assert!(seen.insert(dir), "directory returned twice");
        }
    }
}
