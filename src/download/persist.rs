//! Streaming the vetted body to disk and verifying the result.

use std::path::{Path, PathBuf};

use futures_util::Stream;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::console::Console;

use super::constants::STREAM_CHUNK_SIZE;
use super::error::{DownloadError, StreamError};
use super::negotiate::Negotiated;
use super::progress::TransferProgress;

/// A verified file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFile {
    /// Location of the saved file.
    pub path: PathBuf,
    /// Size on disk in bytes.
    pub size: u64,
}

/// Writes the preview and the rest of the body to `<save_dir>/<filename>`,
/// then checks the size on disk.
///
/// The destination is created or truncated. It is removed again when the
/// transfer fails, when it ends up empty, or when it is smaller than the
/// declared size.
///
/// # Errors
///
/// - [`DownloadError::Stream`] / [`DownloadError::Io`] when receiving or
///   writing fails
/// - [`DownloadError::EmptyFile`] when nothing was written
/// - [`DownloadError::IncompleteFile`] when fewer bytes than declared arrived
#[instrument(skip_all, fields(filename = %negotiated.filename))]
pub async fn persist<S, B, E>(
    mut negotiated: Negotiated<S>,
    save_dir: &Path,
    console: &Console,
) -> Result<PersistedFile, DownloadError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<StreamError>,
{
    let path = save_dir.join(&negotiated.filename);
    let declared_size = negotiated.declared_size;

    let progress = console.transfer_progress(declared_size);
    let written = write_body(&mut negotiated, &path, &progress).await;
    progress.finish();

    if let Err(error) = written {
        warn!(error = %error, path = %path.display(), "transfer failed");
        remove_partial(&path, console).await;
        return Err(error);
    }

    let size = written_size(&path, console).await?;

    if size == 0 {
        discard(&path).await;
        return Err(DownloadError::EmptyFile { path });
    }

    if let Some(expected) = declared_size
        && size < expected
    {
        discard(&path).await;
        return Err(DownloadError::IncompleteFile {
            path,
            expected_bytes: expected,
            actual_bytes: size,
        });
    }

    info!(path = %path.display(), bytes = size, "download complete");
    Ok(PersistedFile { path, size })
}

async fn write_body<S, B, E>(
    negotiated: &mut Negotiated<S>,
    path: &Path,
    progress: &TransferProgress,
) -> Result<(), DownloadError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<StreamError>,
{
    let mut file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    file.write_all(&negotiated.preview)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    progress.advance(negotiated.preview.len() as u64);

    while let Some(chunk) = negotiated
        .body
        .next_chunk(STREAM_CHUNK_SIZE)
        .await
        .map_err(|e| DownloadError::stream(negotiated.final_url.as_str(), e))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        progress.advance(chunk.len() as u64);
    }

    file.flush().await.map_err(|e| DownloadError::io(path, e))?;
    debug!(bytes = progress.downloaded(), "body written");
    Ok(())
}

/// Size on disk of a freshly written file; the file is removed if it cannot
/// be inspected.
async fn written_size(path: &Path, console: &Console) -> Result<u64, DownloadError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.len()),
        Err(error) => {
            warn!(error = %error, path = %path.display(), "cannot inspect written file");
            remove_partial(path, console).await;
            Err(DownloadError::io(path, error))
        }
    }
}

async fn remove_partial(path: &Path, console: &Console) {
    if tokio::fs::try_exists(path).await.unwrap_or(false) && discard(path).await {
        console.info(format_args!(
            "Removed incomplete file at '{}'.",
            path.display()
        ));
    }
}

async fn discard(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "failed to remove file");
            false
        }
    }
}
