pub mod article;
pub mod convert;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod markdown;
pub mod metadata;
pub mod parser;
pub mod redirects;

pub use article::Article;
pub use convert::{PageFetcher, normalize_url};
pub use dom::{Document, Element, NodeChild};
pub use error::{Result, ZhuanlanError};
pub use fetch::{FetchConfig, HttpFetcher, fetch_bytes, fetch_file, fetch_stdin, fetch_url};
pub use manifest::{Manifest, ManifestEntry, Series};
pub use markdown::{Node, RenderOptions};
pub use metadata::{ArticleMeta, extract_article_meta};
pub use parser::{ArticleParser, ParserConfig, ParserConfigBuilder, parse};
pub use redirects::RedirectMap;
