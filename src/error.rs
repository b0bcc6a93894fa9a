//! Top-level error for a fetch run.

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;
use crate::console::Level;
use crate::download::DownloadError;

/// Any failure that ends a fetch run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The save directory could not be created.
    #[error("could not create save directory '{}': {source}", path.display())]
    Directory {
        /// The requested save directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Login page scraping or login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Download, vetting or persistence failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl FetchError {
    /// Level the failure is reported at.
    ///
    /// A short file is a warning; everything else is an error.
    #[must_use]
    pub fn severity(&self) -> Level {
        match self {
            Self::Download(DownloadError::IncompleteFile { .. }) => Level::Warning,
            _ => Level::Error,
        }
    }

    /// Follow-up lines printed after the failure message.
    #[must_use]
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            Self::Download(DownloadError::AccessDenied { .. }) => &[
                "Please ensure your account has the necessary permissions to download this file and the URL is correct.",
            ],
            Self::Download(DownloadError::UnresolvedFilename { .. }) => &[
                "Please ensure the download URL is valid and the server provides filename information.",
            ],
            _ => &[],
        }
    }
}
