//! The end-to-end fetch run.
//!
//! Stages run strictly in sequence on one [`Session`], each failing fast:
//! save directory, login tokens, login, download negotiation, persistence.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::auth::{Credentials, LOGIN_CHECKS, fetch_login_tokens, login};
use crate::console::Console;
use crate::download::{PersistedFile, human_readable_size, negotiate, persist};
use crate::error::FetchError;
use crate::session::Session;
use crate::site::SiteProfile;

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Portal account.
    pub credentials: Credentials,
    /// URL of the protected file.
    pub download_url: String,
    /// Directory the file is saved in; created when missing.
    pub save_dir: PathBuf,
    /// Substring the resolved filename must contain.
    pub expected_version: Option<String>,
}

/// Runs the whole fetch and returns the path of the saved file.
///
/// Progress and the failure, if any, are reported on `console`.
///
/// # Errors
///
/// Returns the first stage failure; see [`FetchError`].
#[instrument(skip_all, fields(url = %request.download_url))]
pub async fn run(
    request: &FetchRequest,
    site: &SiteProfile,
    session: &Session,
    console: &Console,
) -> Result<PathBuf, FetchError> {
    match fetch(request, site, session, console).await {
        Ok(saved) => Ok(saved.path),
        Err(error) => {
            report_failure(console, &error);
            Err(error)
        }
    }
}

async fn fetch(
    request: &FetchRequest,
    site: &SiteProfile,
    session: &Session,
    console: &Console,
) -> Result<PersistedFile, FetchError> {
    tokio::fs::create_dir_all(&request.save_dir)
        .await
        .map_err(|source| FetchError::Directory {
            path: request.save_dir.clone(),
            source,
        })?;

    console.info("Extracting login page information...");
    let tokens = fetch_login_tokens(session, site).await?;

    console.info("Attempting to log in...");
    let final_url = login(session, site, &request.credentials, &tokens, LOGIN_CHECKS).await?;
    console.info(format_args!("Login successful! Final URL: {final_url}"));

    console.info(format_args!(
        "Requesting file download from: {}",
        request.download_url
    ));
    let negotiated = negotiate(
        session,
        &request.download_url,
        site,
        request.expected_version.as_deref(),
    )
    .await?;

    console.info(format_args!(
        "Saving file as '{}' in directory '{}'.",
        negotiated.filename,
        request.save_dir.display()
    ));
    console.info(format_args!("Downloading '{}'...", negotiated.filename));
    let saved = persist(negotiated, &request.save_dir, console).await?;

    console.success(format_args!(
        "File successfully downloaded and saved to '{}'. Size: {}.",
        saved.path.display(),
        human_readable_size(saved.size)
    ));
    info!(path = %saved.path.display(), bytes = saved.size, "fetch complete");
    Ok(saved)
}

fn report_failure(console: &Console, error: &FetchError) {
    let level = error.severity();
    console.detail(level, format_args!("{level}: {error}"));
    for hint in error.hints() {
        console.detail(level, hint);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::console::ConsoleOptions;
    use crate::download::DownloadError;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capturing_console(quiet: bool) -> (Console, Captured, Captured) {
        let out = Captured::default();
        let err = Captured::default();
        let console = Console::with_writers(
            Box::new(out.clone()),
            Box::new(err.clone()),
            ConsoleOptions {
                color: false,
                quiet,
                progress: false,
            },
        );
        (console, out, err)
    }

    fn silent_console() -> Console {
        Console::with_writers(
            Box::new(io::sink()),
            Box::new(io::sink()),
            ConsoleOptions {
                color: false,
                quiet: true,
                progress: false,
            },
        )
    }

    #[tokio::test]
    async fn test_run_fails_on_directory_before_network() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        // Port 9 on loopback; never contacted because the directory fails first.
        let site = SiteProfile::parse("http://127.0.0.1:9/").unwrap();
        let request = FetchRequest {
            credentials: Credentials::new("user", "pass"),
            download_url: "http://127.0.0.1:9/?url=1".to_string(),
            save_dir: blocker.join("downloads"),
            expected_version: None,
        };

        let err = run(&request, &site, &Session::new().unwrap(), &silent_console())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Directory { .. }));
    }

    #[test]
    fn test_incomplete_file_reported_as_warning_on_stdout() {
        let (console, out, err) = capturing_console(true);
        let error = FetchError::Download(DownloadError::IncompleteFile {
            path: PathBuf::from("downloads/model.bin"),
            expected_bytes: 2048,
            actual_bytes: 1024,
        });

        report_failure(&console, &error);

        assert_eq!(
            out.text(),
            "WARNING: downloaded file size (1.0 KB) is less than expected (2.0 KB); file might be incomplete\n"
        );
        assert!(err.text().is_empty(), "unexpected stderr: {}", err.text());
    }

    #[test]
    fn test_access_denied_reported_as_error_with_hint() {
        let (console, out, err) = capturing_console(false);
        let error = FetchError::Download(DownloadError::AccessDenied {
            url: "https://example.com/?url=1".to_string(),
            reason: crate::download::DenialReason::DenialPhrase,
        });

        report_failure(&console, &error);

        assert!(out.text().is_empty());
        let stderr = err.text();
        assert!(stderr.starts_with("ERROR: "));
        assert_eq!(stderr.lines().count(), 2, "expected a hint line: {stderr}");
    }
}
