//! Content-bundle writing.
//!
//! Each exported article becomes a Hugo page bundle: a directory named after
//! the article slug holding `index.md` and, when the article has a cover,
//! `featured.png`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Writes the article Markdown as `<content_dir>/<slug>/index.md`.
///
/// Creates the bundle directory if needed and returns the written path.
pub fn write_bundle(content_dir: &Path, slug: &str, markdown: &str) -> Result<PathBuf> {
    let dir = content_dir.join(slug);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create bundle directory {}", dir.display()))?;

    let path = dir.join("index.md");
    fs::write(&path, markdown).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Writes the cover image as `<content_dir>/<slug>/featured.png`.
pub fn write_cover(content_dir: &Path, slug: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dir = content_dir.join(slug);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create bundle directory {}", dir.display()))?;

    let path = dir.join("featured.png");
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_bundle_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let path = write_bundle(tmp.path(), "645810896", "---\ntitle: 't'\n---\n").unwrap();

        assert_eq!(path, tmp.path().join("645810896").join("index.md"));
        assert!(path.exists());
        assert!(fs::read_to_string(&path).unwrap().contains("title: 't'"));
    }

    #[test]
    fn test_write_cover_alongside_bundle() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "a", "x").unwrap();
        let cover = write_cover(tmp.path(), "a", &[0x89, 0x50, 0x4e, 0x47]).unwrap();

        assert_eq!(cover, tmp.path().join("a").join("featured.png"));
        assert_eq!(fs::read(&cover).unwrap(), vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn test_rewrites_existing_bundle() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "a", "old").unwrap();
        let path = write_bundle(tmp.path(), "a", "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
