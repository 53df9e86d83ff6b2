//! Error types for zhuanlan operations.
//!
//! This module defines the main error type [`ZhuanlanError`] which represents
//! all possible errors that can occur while fetching a column article,
//! walking its DOM, and assembling the exported Markdown.
//!
//! # Example
//!
//! ```rust
//! use zhuanlan_core::{Result, ZhuanlanError};
//!
//! fn require_body(html: &str) -> Result<()> {
//!     if html.is_empty() {
//!         return Err(ZhuanlanError::MalformedInput("empty page".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for article export operations.
///
/// Conversion is strict: the walker aborts on the first element it has no
/// handler for instead of skipping it, so a new markup shape on the source
/// platform surfaces as an [`ZhuanlanError::UnsupportedElement`] rather than
/// silently dropped content.
#[derive(Error, Debug)]
pub enum ZhuanlanError {
    /// A DOM element kind encountered in a context with no handler.
    ///
    /// The conversion grammar is a closed set; anything outside it aborts
    /// the parse for the whole article.
    #[error("Unsupported element: <{tag}>")]
    UnsupportedElement { tag: String },

    /// A required attribute, nested element, or metadata field is absent.
    ///
    /// Examples: an image with no usable source attribute, a code container
    /// without a nested `<code>`, a page missing the metadata blob.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and non-success status codes.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, most commonly an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Redirect map or manifest loading errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for ZhuanlanError.
///
/// This is a convenience alias for `std::result::Result<T, ZhuanlanError>`.
pub type Result<T> = std::result::Result<T, ZhuanlanError>;
