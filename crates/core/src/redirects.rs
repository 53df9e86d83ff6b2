//! The URL redirect map.
//!
//! Cross-references between column articles should point at the exported
//! site, not back at the source platform. The map is built once before any
//! parse call, either from a persisted JSON file or by rewriting a known URL
//! prefix across the article list, and is read-only afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{Result, ZhuanlanError};

/// A canonical source URL → destination URL substitution table.
///
/// Applied during URL normalization only; URLs without an entry pass through
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct RedirectMap {
    entries: HashMap<String, String>,
}

impl RedirectMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a map from a JSON file holding a flat object of
    /// `"source url": "destination url"` pairs.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ZhuanlanError::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&text)
            .map_err(|e| ZhuanlanError::ConfigError(format!("invalid redirect map {}: {}", path.display(), e)))?;

        Ok(Self { entries })
    }

    /// Builds a map over `urls` by substituting `from` with `to` in each URL.
    ///
    /// URLs not containing `from` are skipped; they would map to themselves.
    pub fn rewrite_prefix<I, S>(urls: I, from: &str, to: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for url in urls {
            let url = url.as_ref();
            if url.contains(from) {
                entries.insert(url.to_string(), url.replace(from, to));
            }
        }
        Self { entries }
    }

    /// Adds a single entry.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.entries.insert(from.into(), to.into());
    }

    /// Looks up the destination for a source URL.
    pub fn resolve(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
