//! The article manifest.
//!
//! The manifest is a JSON file listing every column article to export, with
//! optional tags and series membership. The driver iterates it in order and
//! derives the redirect map from it, so cross-references between listed
//! articles retarget to the exported site.
//!
//! ```json
//! {
//!   "articles": [
//!     { "url": "https://zhuanlan.zhihu.com/p/645810896", "tags": ["C++"] },
//!     { "url": "https://zhuanlan.zhihu.com/p/646752343",
//!       "tags": ["C++", "STMP"],
//!       "series": { "name": "STMP", "order": 1 } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::redirects::RedirectMap;
use crate::{Result, ZhuanlanError};

/// Series membership of an article: a series name and a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub order: u32,
}

/// One article to export.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Canonical source-platform URL of the article.
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub series: Option<Series>,
}

impl ManifestEntry {
    /// The article's slug: the last path segment of its URL.
    pub fn slug(&self) -> Option<&str> {
        self.url.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
    }
}

/// The full article list.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub articles: Vec<ManifestEntry>,
}

impl Manifest {
    /// Loads a manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ZhuanlanError::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| ZhuanlanError::ConfigError(format!("invalid manifest {}: {}", path.display(), e)))
    }

    /// Derives the redirect map for every listed article by substituting
    /// `from` with `to` in its URL.
    pub fn redirect_map(&self, from: &str, to: &str) -> RedirectMap {
        RedirectMap::rewrite_prefix(self.articles.iter().map(|a| a.url.as_str()), from, to)
    }
}
