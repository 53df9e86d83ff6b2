//! Content fetching from URLs, files, and stdin.
//!
//! All HTTP here is synchronous: the conversion pipeline is single-threaded
//! and blocks on at most one request at a time (link-card title resolution,
//! page and cover downloads driven by the CLI). Retry policy belongs to the
//! caller.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use url::Url;

use crate::convert::PageFetcher;
use crate::{Result, ZhuanlanError};

/// HTTP client configuration for fetching pages and images.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent string. The default mimics a desktop browser; the source
    /// platform rejects obviously non-browser agents.
    pub user_agent: String,
    /// Raw `Cookie` header text, typically loaded from the environment by
    /// the caller. Required for pages behind the platform's login wall.
    pub cookie: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            cookie: None,
        }
    }
}

fn get(url: &str, config: &FetchConfig) -> Result<Response> {
    let parsed_url = Url::parse(url).map_err(|e| ZhuanlanError::InvalidUrl(e.to_string()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(ZhuanlanError::HttpError)?;

    let mut request = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9");

    if let Some(cookie) = &config.cookie {
        request = request.header("Cookie", cookie);
    }

    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            ZhuanlanError::Timeout { timeout: config.timeout }
        } else {
            ZhuanlanError::HttpError(e)
        }
    })?;

    response.error_for_status().map_err(ZhuanlanError::HttpError)
}

/// Fetches a page and returns the response body as text.
pub fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    Ok(get(url, config)?.text()?)
}

/// Fetches a resource and returns the raw response bytes.
///
/// Used for cover images.
pub fn fetch_bytes(url: &str, config: &FetchConfig) -> Result<Vec<u8>> {
    Ok(get(url, config)?.bytes()?.to_vec())
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(ZhuanlanError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(ZhuanlanError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(ZhuanlanError::from)?;

    Ok(buffer)
}

/// The production [`PageFetcher`]: a blocking HTTP GET of the target page.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        fetch_url(url, &self.config)
    }
}
