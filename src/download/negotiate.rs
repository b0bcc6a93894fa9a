//! Streamed download request and response vetting.
//!
//! Everything here happens before a byte reaches the disk: the request, the
//! denial-page check on the first chunk, filename resolution and the
//! expected-version check.

use futures_util::Stream;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use crate::session::Session;
use crate::site::SiteProfile;

use super::body::ChunkedBody;
use super::constants::PREVIEW_CHUNK_SIZE;
use super::error::DownloadError;
use super::filename::{FILENAME_STRATEGIES, FilenameSource, resolve_filename};
use super::inspect::inspect_preview;

/// A vetted response, ready to be written to disk.
#[derive(Debug)]
pub struct Negotiated<S> {
    /// Sanitized filename to save under.
    pub filename: String,
    /// Size from `Content-Length`; `None` when absent, unparseable or 0.
    pub declared_size: Option<u64>,
    /// URL of the response after redirects.
    pub final_url: Url,
    /// First chunk of the body, already read for inspection.
    pub preview: Vec<u8>,
    /// Remainder of the body.
    pub body: ChunkedBody<S>,
}

/// Requests `download_url` on the authenticated session and vets the response.
///
/// # Errors
///
/// - [`DownloadError::Network`] / [`DownloadError::HttpStatus`] when the
///   request fails or returns a non-success status
/// - [`DownloadError::Stream`] when the first chunk cannot be read
/// - [`DownloadError::EmptyResponse`] when the body is empty
/// - [`DownloadError::AccessDenied`] when the first chunk is a denial page
/// - [`DownloadError::UnresolvedFilename`] when no filename can be derived
/// - [`DownloadError::VersionMismatch`] when the filename lacks `expected_version`
#[instrument(skip_all, fields(url = %download_url))]
pub async fn negotiate(
    session: &Session,
    download_url: &str,
    site: &SiteProfile,
    expected_version: Option<&str>,
) -> Result<
    Negotiated<
        impl Stream<Item = Result<impl AsRef<[u8]> + use<>, reqwest::Error>> + Unpin + use<>,
    >,
    DownloadError,
> {
    let response = session
        .client()
        .get(download_url)
        .send()
        .await
        .map_err(|e| DownloadError::network(download_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(download_url, status.as_u16()));
    }

    let final_url = response.url().clone();
    let declared_size = declared_size(response.headers());
    let content_disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    debug!(
        final_url = %final_url,
        declared_size = ?declared_size,
        content_disposition = ?content_disposition,
        "download response received"
    );

    let mut body = ChunkedBody::new(Box::pin(response.bytes_stream()));
    let preview = body
        .next_chunk(PREVIEW_CHUNK_SIZE)
        .await
        .map_err(|e| DownloadError::stream(download_url, e))?
        .ok_or_else(|| DownloadError::EmptyResponse {
            url: download_url.to_string(),
        })?;

    let source = FilenameSource {
        content_disposition: content_disposition.as_deref(),
        final_url: &final_url,
    };
    let filename = vet_response(
        download_url,
        &preview,
        declared_size,
        &source,
        site,
        expected_version,
    )?;

    Ok(Negotiated {
        filename,
        declared_size,
        final_url,
        preview,
        body,
    })
}

/// Runs the pre-write checks in order and returns the filename to save under.
fn vet_response(
    download_url: &str,
    preview: &[u8],
    declared_size: Option<u64>,
    source: &FilenameSource<'_>,
    site: &SiteProfile,
    expected_version: Option<&str>,
) -> Result<String, DownloadError> {
    inspect_preview(preview, declared_size, site).map_err(|reason| {
        DownloadError::AccessDenied {
            url: download_url.to_string(),
            reason,
        }
    })?;

    let filename = resolve_filename(source, FILENAME_STRATEGIES).ok_or_else(|| {
        DownloadError::UnresolvedFilename {
            url: source.final_url.to_string(),
        }
    })?;

    if let Some(expected) = expected_version
        && !filename.contains(expected)
    {
        return Err(DownloadError::VersionMismatch {
            filename,
            expected: expected.to_string(),
        });
    }

    Ok(filename)
}

fn declared_size(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|size| *size > 0)
}
