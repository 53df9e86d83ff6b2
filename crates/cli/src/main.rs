use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use url::Url;
use zhuanlan_core::{
    Article, ArticleParser, FetchConfig, HttpFetcher, Manifest, ManifestEntry, ParserConfig, RedirectMap, Series,
    fetch_bytes, fetch_file, fetch_stdin, fetch_url,
};

mod echo;
mod site;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of canonical column article URLs, replaced by `--rewrite-to` when
/// deriving the redirect map from a manifest.
const SOURCE_PREFIX: &str = "zhuanlan.zhihu.com/p";

/// Export Zhihu column articles to Hugo content bundles
#[derive(Parser, Debug)]
#[command(name = "zhuanlan")]
#[command(version = VERSION)]
#[command(about = "Export Zhihu column articles to Hugo content bundles", long_about = None)]
struct Args {
    /// Article URL, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "manifest", conflicts_with = "manifest")]
    input: Option<String>,

    /// Batch mode: JSON manifest listing every article to export
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Content directory receiving one bundle per article
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// Print the Markdown to stdout instead of writing a bundle
    #[arg(long)]
    stdout: bool,

    /// JSON file of explicit source-to-destination URL redirects
    #[arg(long, value_name = "FILE")]
    redirects: Option<PathBuf>,

    /// Rewrite cross-references between manifest articles to this prefix
    #[arg(long, value_name = "PREFIX")]
    rewrite_to: Option<String>,

    /// Bundle directory name (single-article mode; derived from the input
    /// when omitted)
    #[arg(long, value_name = "SLUG")]
    slug: Option<String>,

    /// Series name for the front matter (single-article mode)
    #[arg(long, value_name = "NAME")]
    series: Option<String>,

    /// Position within the series
    #[arg(long, value_name = "N", requires = "series")]
    series_order: Option<u32>,

    /// Skip downloading the cover image
    #[arg(long)]
    no_cover: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Fetch attempts per request before giving up
    #[arg(long, default_value = "3", value_name = "N")]
    retries: u32,

    /// Enable step-by-step progress output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        echo::print_banner();
    }

    let fetch_config = FetchConfig {
        timeout: args.timeout,
        user_agent: args
            .user_agent
            .clone()
            .unwrap_or_else(|| FetchConfig::default().user_agent),
        cookie: env::var("COOKIE_TEXT").ok(),
    };

    if args.verbose && fetch_config.cookie.is_some() {
        echo::print_info("Cookies loaded from COOKIE_TEXT");
    }

    match args.manifest.clone() {
        Some(path) => run_manifest(&args, &path, &fetch_config),
        None => run_single(&args, &fetch_config),
    }
}

/// Builds the parser with the redirect map resolved from the flags: an
/// explicit file wins, otherwise the map is derived from the manifest.
fn build_parser(args: &Args, fetch_config: &FetchConfig, manifest: Option<&Manifest>) -> anyhow::Result<ArticleParser> {
    let redirects = if let Some(path) = &args.redirects {
        RedirectMap::from_json_file(path).context("Failed to load redirect map")?
    } else if let (Some(manifest), Some(prefix)) = (manifest, &args.rewrite_to) {
        manifest.redirect_map(SOURCE_PREFIX, prefix)
    } else {
        RedirectMap::new()
    };

    let config = ParserConfig::builder().redirects(redirects).build();
    Ok(ArticleParser::with_fetcher(
        config,
        Box::new(HttpFetcher::new(fetch_config.clone())),
    ))
}

fn run_single(args: &Args, fetch_config: &FetchConfig) -> anyhow::Result<()> {
    let input = args.input.as_deref().context("No input given")?;
    let parser = build_parser(args, fetch_config, None)?;

    if args.verbose {
        echo::print_step(1, 4, &format!("Reading {}", input));
    }
    let html = read_input(input, fetch_config, args.retries).with_context(|| format!("Failed to read {}", input))?;

    if args.verbose {
        echo::print_step(2, 4, "Parsing article");
    }
    let article = parser.parse_article(&html).context("Failed to parse article")?;
    if args.verbose {
        echo::print_info(&format!("Title: {}", article.title));
    }

    if args.verbose {
        echo::print_step(3, 4, "Rendering Markdown");
    }
    let series = args
        .series
        .clone()
        .map(|name| Series { name, order: args.series_order.unwrap_or(1) });
    let markdown = article.to_markdown(series.as_ref()).context("Failed to render Markdown")?;

    if args.stdout {
        print!("{}", markdown);
        return Ok(());
    }

    if args.verbose {
        echo::print_step(4, 4, "Writing bundle");
    }
    let slug = match &args.slug {
        Some(slug) => slug.clone(),
        None => derive_slug(input).context("Cannot derive a slug from the input; pass --slug")?,
    };

    let path = site::write_bundle(&args.output, &slug, &markdown)?;
    write_cover(args, fetch_config, &article, &slug);
    echo::print_success(&format!("Exported to {}", path.display()));

    Ok(())
}

fn run_manifest(args: &Args, path: &Path, fetch_config: &FetchConfig) -> anyhow::Result<()> {
    let manifest = Manifest::load(path).context("Failed to load manifest")?;
    let parser = build_parser(args, fetch_config, Some(&manifest))?;

    let total = manifest.articles.len();
    let mut exported = 0usize;

    for (index, entry) in manifest.articles.iter().enumerate() {
        if args.verbose {
            echo::print_step(index + 1, total, &entry.url);
        }

        // One bad article should not sink the whole export run.
        match export_entry(args, fetch_config, &parser, entry) {
            Ok(slug) => {
                exported += 1;
                echo::print_success(&format!("Done: {}", slug));
            }
            Err(e) => echo::print_error(&format!("Failed to export {}: {:#}", entry.url, e)),
        }
    }

    if exported < total {
        echo::print_warning(&format!("Exported {}/{} articles", exported, total));
    } else {
        echo::print_success(&format!("Exported {}/{} articles", exported, total));
    }

    Ok(())
}

fn export_entry(
    args: &Args, fetch_config: &FetchConfig, parser: &ArticleParser, entry: &ManifestEntry,
) -> anyhow::Result<String> {
    let slug = entry.slug().context("Manifest entry has no usable slug")?.to_string();

    let html = with_retry(args.retries, || fetch_url(&entry.url, fetch_config))?;
    let article = parser.parse_article(&html)?;
    let markdown = article.to_markdown(entry.series.as_ref())?;

    site::write_bundle(&args.output, &slug, &markdown)?;
    write_cover(args, fetch_config, &article, &slug);

    Ok(slug)
}

/// Downloads and writes the cover image, warning instead of failing: a
/// missing cover should not discard an already-exported article.
fn write_cover(args: &Args, fetch_config: &FetchConfig, article: &Article, slug: &str) {
    if args.no_cover {
        return;
    }
    let Some(cover) = &article.cover else {
        return;
    };

    match with_retry(args.retries, || fetch_bytes(cover, fetch_config)) {
        Ok(bytes) => {
            if let Err(e) = site::write_cover(&args.output, slug, &bytes) {
                echo::print_warning(&format!("Failed to write cover: {:#}", e));
            }
        }
        Err(e) => echo::print_warning(&format!("Failed to download cover {}: {}", cover, e)),
    }
}

fn read_input(input: &str, fetch_config: &FetchConfig, retries: u32) -> zhuanlan_core::Result<String> {
    if input == "-" {
        fetch_stdin()
    } else if input.starts_with("http://") || input.starts_with("https://") {
        with_retry(retries, || fetch_url(input, fetch_config))
    } else {
        fetch_file(input)
    }
}

/// Retries `op` up to `attempts` times with a linear backoff.
fn with_retry<T>(attempts: u32, mut op: impl FnMut() -> zhuanlan_core::Result<T>) -> zhuanlan_core::Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                echo::print_warning(&format!("Attempt {}/{} failed: {}", attempt, attempts, e));
                thread::sleep(Duration::from_secs(u64::from(attempt)));
            }
            Err(e) => return Err(e),
        }
    }
}

/// The bundle slug: the last path segment of a URL input, or the file stem
/// of a local file. Stdin has no derivable slug.
fn derive_slug(input: &str) -> Option<String> {
    if input == "-" {
        return None;
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let parsed = Url::parse(input).ok()?;
        return parsed
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(str::to_string);
    }

    Path::new(input).file_stem().map(|stem| stem.to_string_lossy().into_owned())
}
