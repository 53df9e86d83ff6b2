//! Main article parsing API.
//!
//! The entry point is [`ArticleParser`], configured through [`ParserConfig`]
//! and its builder. The parser pairs the converted body with the extracted
//! metadata to produce an [`Article`].
//!
//! # Example
//!
//! ```rust
//! use zhuanlan_core::parse;
//!
//! let html = r#"
//!     <div class="RichText"><p>Hello</p></div>
//!     <script id="js-initialData" type="text/json">
//!     {"initialState":{"entities":{"articles":{"1":
//!         {"title":"Hi","imageUrl":"","created":0,"updated":0}}}}}
//!     </script>
//! "#;
//! let article = parse(html).unwrap();
//! assert_eq!(article.title, "Hi");
//! assert_eq!(article.content.to_string(), "Hello");
//! ```

use std::collections::HashMap;

use crate::article::Article;
use crate::convert::{BodyConverter, PageFetcher};
use crate::dom::Document;
use crate::fetch::HttpFetcher;
use crate::metadata::extract_article_meta;
use crate::redirects::RedirectMap;
use crate::{Result, ZhuanlanError};

/// Selector for the rich-text body container. The platform suffixes the
/// class with generated tokens, so only the prefix is matched.
const BODY_SELECTOR: &str = r#"div[class^="RichText"]"#;

/// Configuration for article conversion.
///
/// All tables the walker consults are injected here, fully populated before
/// the first parse call and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Source URL → destination URL substitutions applied during URL
    /// normalization.
    pub redirects: RedirectMap,
    /// Code-fence language token → highlighter identifier. Unknown tokens
    /// pass through unchanged.
    pub language_aliases: HashMap<String, String>,
    /// Markdown level the `h2` source tier maps to; `h3` maps one deeper.
    pub heading_base: u8,
    /// Trailing token stripped from fetched link-card titles.
    pub link_card_title_suffix: Option<String>,
    /// Maximum list nesting before the parse fails.
    pub max_list_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let language_aliases = HashMap::from([
            ("nasm".to_string(), "x86asm".to_string()),
            ("text".to_string(), "bash".to_string()),
        ]);

        Self {
            redirects: RedirectMap::new(),
            language_aliases,
            heading_base: 1,
            link_card_title_suffix: Some("| BLOGS".to_string()),
            max_list_depth: 64,
        }
    }
}

impl ParserConfig {
    /// Creates a new builder for ParserConfig.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }
}

/// Builder for ParserConfig.
///
/// # Example
///
/// ```rust
/// use zhuanlan_core::{ParserConfig, RedirectMap};
///
/// let mut redirects = RedirectMap::new();
/// redirects.insert("https://zhuanlan.zhihu.com/p/1", "https://example.com/1");
///
/// let config = ParserConfig::builder()
///     .redirects(redirects)
///     .language_alias("plaintext", "text")
///     .heading_base(2)
///     .build();
/// assert_eq!(config.heading_base, 2);
/// ```
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ParserConfig::default() }
    }

    /// Sets the redirect map.
    pub fn redirects(mut self, value: RedirectMap) -> Self {
        self.config.redirects = value;
        self
    }

    /// Adds one language alias.
    pub fn language_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.language_aliases.insert(from.into(), to.into());
        self
    }

    /// Sets the Markdown level of the first heading tier.
    pub fn heading_base(mut self, value: u8) -> Self {
        self.config.heading_base = value;
        self
    }

    /// Sets the suffix stripped from fetched link-card titles.
    pub fn link_card_title_suffix(mut self, value: impl Into<String>) -> Self {
        self.config.link_card_title_suffix = Some(value.into());
        self
    }

    /// Keeps fetched link-card titles as-is.
    pub fn keep_link_card_titles(mut self) -> Self {
        self.config.link_card_title_suffix = None;
        self
    }

    /// Sets the maximum list nesting depth.
    pub fn max_list_depth(mut self, value: usize) -> Self {
        self.config.max_list_depth = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ParserConfig {
        self.config
    }
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a full article page into an [`Article`].
pub struct ArticleParser {
    config: ParserConfig,
    fetcher: Box<dyn PageFetcher>,
}

impl ArticleParser {
    /// Creates a parser with default configuration and the HTTP fetcher.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a parser with a custom configuration and the HTTP fetcher.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config, fetcher: Box::new(HttpFetcher::default()) }
    }

    /// Creates a parser with a custom configuration and fetcher.
    ///
    /// The fetcher is only consulted for link-card title resolution; tests
    /// typically inject a stub here.
    pub fn with_fetcher(config: ParserConfig, fetcher: Box<dyn PageFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses one article page: converts the rich-text body and extracts the
    /// metadata envelope.
    ///
    /// # Errors
    ///
    /// Fails on the first unsupported element or missing required piece; no
    /// partial article is ever produced.
    pub fn parse_article(&self, html: &str) -> Result<Article> {
        let doc = Document::parse(html);

        let body = doc
            .select_first(BODY_SELECTOR)
            .ok_or_else(|| ZhuanlanError::MalformedInput("page has no article body".to_string()))?;

        let content = BodyConverter::new(&self.config, self.fetcher.as_ref()).convert(&body)?;
        let meta = extract_article_meta(&doc)?;

        Ok(Article {
            content,
            title: meta.title,
            cover: meta.cover,
            created: meta.created,
            updated: meta.updated,
        })
    }
}

impl Default for ArticleParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses an article page with default configuration.
///
/// Convenience wrapper over [`ArticleParser`].
pub fn parse(html: &str) -> Result<Article> {
    ArticleParser::new().parse_article(html)
}
