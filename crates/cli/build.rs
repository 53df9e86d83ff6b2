use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("zhuanlan")
        .version("1.0.0")
        .about("Export Zhihu column articles to Hugo content bundles")
        .arg(clap::arg!([INPUT] "Article URL, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(--manifest <FILE> "Batch mode: JSON manifest listing every article to export")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <DIR> "Content directory receiving one bundle per article")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--stdout "Print Markdown to stdout instead of writing a bundle"))
        .arg(
            clap::arg!(--redirects <FILE> "JSON file of source-to-destination URL redirects")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"rewrite-to" <PREFIX> "Rewrite cross-references between listed articles to this prefix"))
        .arg(clap::arg!(--slug <SLUG> "Bundle directory name (single-article mode)"))
        .arg(clap::arg!(--series <NAME> "Series name for the front matter (single-article mode)"))
        .arg(clap::arg!(--"series-order" <N> "Position within the series"))
        .arg(clap::arg!(--"no-cover" "Skip downloading the cover image"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(--retries <N> "Fetch attempts per request before giving up").default_value("3"))
        .arg(clap::arg!(-v --verbose "Enable step-by-step progress output"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "zhuanlan", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "zhuanlan", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "zhuanlan", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "zhuanlan", &completions_dir).unwrap();
}
