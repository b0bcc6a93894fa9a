//! CLI entry point for portal-fetch.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use portal_fetch::{
    Console, ConsoleOptions, Credentials, FetchError, FetchRequest, Session, SiteProfile, run,
};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // colors_enabled already accounts for NO_COLOR and non-terminal output
    let color = !args.no_color && ::console::colors_enabled();
    init_tracing(
        args.log_level(),
        !args.no_color && ::console::colors_enabled_stderr(),
    );
    debug!(
        download_url = %args.download_url,
        save_location = %args.save_location,
        expected_version = ?args.expected_version,
        "CLI arguments parsed"
    );

    let console = Console::stdio(ConsoleOptions {
        color,
        quiet: args.quiet,
        progress: !args.quiet,
    });

    match execute(&args, &console).await {
        Ok(()) => {
            console.info("All operations completed successfully.");
            ExitCode::SUCCESS
        }
        Err(error) => {
            // Pipeline failures were already reported by the pipeline itself.
            if error.downcast_ref::<FetchError>().is_none() {
                console.error(format_args!("{error:#}"));
            }
            console.error("Operation failed. Exiting with a non-zero status code.");
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &Args, console: &Console) -> Result<()> {
    let site = SiteProfile::for_login_url(args.login_url.clone());
    let session = Session::new().context("failed to build HTTP client")?;

    let request = FetchRequest {
        credentials: Credentials::new(args.username.clone(), args.password.clone()),
        download_url: args.download_url.clone(),
        save_dir: args.save_dir(),
        expected_version: args.expected_version.clone(),
    };

    run(&request, &site, &session, console).await?;
    Ok(())
}

fn init_tracing(default_level: LevelFilter, ansi: bool) {
    // RUST_LOG wins over --verbose
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_env_filter(filter)
        .try_init();
}
