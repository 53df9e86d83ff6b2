//! Article metadata extraction.
//!
//! Column pages embed a JSON state blob in a `script#js-initialData` tag.
//! The article record lives under `initialState.entities.articles`, keyed by
//! an opaque ID; the map holds exactly one entry for an article page, and the
//! extractor takes that entry regardless of its key.

use serde_json::Value;

use crate::ZhuanlanError;
use crate::dom::Document;
use crate::error::Result;

const INIT_DATA_SELECTOR: &str = r#"script[id="js-initialData"]"#;

/// Metadata read from the embedded state blob.
///
/// `cover` is `None` when the platform reports an empty image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    pub title: String,
    pub cover: Option<String>,
    /// Creation time, Unix epoch seconds.
    pub created: i64,
    /// Last update time, Unix epoch seconds.
    pub updated: i64,
}

/// Extracts the article metadata from a parsed page.
///
/// # Errors
///
/// Returns [`ZhuanlanError::MalformedInput`] if the script tag, the JSON
/// path, or any of the four fields is missing. Never returns a partially
/// filled record.
pub fn extract_article_meta(doc: &Document) -> Result<ArticleMeta> {
    let script = doc
        .select_first(INIT_DATA_SELECTOR)
        .ok_or_else(|| malformed("page has no js-initialData script"))?;

    let data: Value = serde_json::from_str(&script.text())
        .map_err(|e| malformed(format!("initial data is not valid JSON: {}", e)))?;

    let articles = data
        .pointer("/initialState/entities/articles")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("initial data has no articles entity"))?;

    let (_, entry) = articles
        .iter()
        .next()
        .ok_or_else(|| malformed("articles entity is empty"))?;

    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("article entity has no title"))?;

    let cover = entry
        .get("imageUrl")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("article entity has no imageUrl"))?;

    let created = entry
        .get("created")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("article entity has no created timestamp"))?;

    let updated = entry
        .get("updated")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("article entity has no updated timestamp"))?;

    Ok(ArticleMeta {
        title: title.to_string(),
        cover: if cover.is_empty() { None } else { Some(cover.to_string()) },
        created,
        updated,
    })
}

fn malformed(detail: impl Into<String>) -> ZhuanlanError {
    ZhuanlanError::MalformedInput(detail.into())
}
