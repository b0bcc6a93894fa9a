//! CLI argument definitions using clap derive macros.

use std::path::{MAIN_SEPARATOR, PathBuf};

use clap::Parser;
use portal_fetch::DEFAULT_LOGIN_URL;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Log in to the developer portal and download a protected file.
#[derive(Parser, Debug)]
#[command(name = "portal-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Username or email for the portal login
    #[arg(short, long)]
    pub username: String,

    /// Password for the portal login
    #[arg(short, long)]
    pub password: String,

    /// URL of the file to download (e.g. 'https://developer.deepx.ai/?url=2262')
    #[arg(short, long)]
    pub download_url: String,

    /// Directory to save the downloaded file in
    #[arg(short, long, default_value = "downloads")]
    pub save_location: String,

    /// Version string the downloaded filename must contain
    #[arg(short = 'v', long)]
    pub expected_version: Option<String>,

    /// Increase log verbosity (--verbose for debug, twice for trace)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress INFO messages and the progress line
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Login page of the portal deployment
    #[arg(long, hide = true, default_value = DEFAULT_LOGIN_URL)]
    pub login_url: Url,
}

impl Args {
    /// Save directory with a trailing path separator.
    pub fn save_dir(&self) -> PathBuf {
        normalize_save_location(&self.save_location)
    }

    /// Default tracing filter for the verbosity flag.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Appends the platform path separator when missing.
pub fn normalize_save_location(location: &str) -> PathBuf {
    if location.ends_with(MAIN_SEPARATOR) {
        PathBuf::from(location)
    } else {
        PathBuf::from(format!("{location}{MAIN_SEPARATOR}"))
    }
}
