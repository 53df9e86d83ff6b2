//! The article envelope: converted body plus metadata, and its rendering to
//! a Hugo content file.
//!
//! An [`Article`] is constructed once per fetched page and consumed
//! immediately by the output writer. [`Article::to_markdown`] produces the
//! final file text: YAML front matter (title, dates, optional series)
//! followed by the rendered body.

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::manifest::Series;
use crate::markdown::{self, RenderOptions};
use crate::{Result, ZhuanlanError};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// A fully parsed article: converted body and extracted metadata.
#[derive(Debug, Clone)]
pub struct Article {
    /// The converted body.
    pub content: markdown::Document,
    /// Article title from the metadata blob.
    pub title: String,
    /// Cover image URL, if the article has one.
    pub cover: Option<String>,
    /// Creation time, Unix epoch seconds.
    pub created: i64,
    /// Last update time, Unix epoch seconds.
    pub updated: i64,
}

impl Article {
    /// Renders the article as a Hugo content file with default layout
    /// options.
    pub fn to_markdown(&self, series: Option<&Series>) -> Result<String> {
        self.to_markdown_with_options(series, &RenderOptions::default())
    }

    /// Renders the article with explicit layout options.
    pub fn to_markdown_with_options(&self, series: Option<&Series>, opts: &RenderOptions) -> Result<String> {
        let mut output = String::from("---\n");
        output.push_str(&format!("title: {}\n", yaml_quote(&self.title)));
        output.push_str(&format!("date: {}\n", format_timestamp(self.created)?));
        output.push_str(&format!("updated: {}\n", format_timestamp(self.updated)?));

        if let Some(series) = series {
            output.push_str(&format!("series: [{}]\n", yaml_quote(&series.name)));
            output.push_str(&format!("series_order: {}\n", series.order));
        }

        output.push_str("---\n\n");
        output.push_str(&self.content.render(opts));
        output.push('\n');

        Ok(output)
    }
}

/// Formats a Unix timestamp as `YYYY-MM-DD HH:MM:SS`, UTC.
fn format_timestamp(timestamp: i64) -> Result<String> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| ZhuanlanError::MalformedInput(format!("timestamp out of range: {}", e)))?;

    datetime
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| ZhuanlanError::MalformedInput(format!("unformattable timestamp: {}", e)))
}

/// Quotes a string for a single-quoted YAML scalar.
fn yaml_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
