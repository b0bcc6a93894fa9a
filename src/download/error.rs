//! Error types for the download module.
//!
//! This module defines structured errors for negotiation, persistence and
//! post-download validation, carrying the URL or path they relate to.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::progress::human_readable_size;

/// Boxed error from the body stream (reqwest in production, anything in tests).
pub type StreamError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which signature identified a denial page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The preview contains the portal's explicit denial phrase.
    DenialPhrase,
    /// A small response whose preview is an HTML document.
    HtmlPage,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DenialPhrase => f.write_str("server response denies access to this file"),
            Self::HtmlPage => f.write_str(
                "server returned an HTML page, possibly an error or redirection, instead of a file",
            ),
        }
    }
}

/// Errors that can occur while downloading and verifying the file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error sending the request.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The body stream failed after the response headers arrived.
    #[error("network error while receiving {url}: {source}")]
    Stream {
        /// The URL being received.
        url: String,
        /// The underlying stream error.
        #[source]
        source: StreamError,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was empty.
    #[error("no content received for download from {url}; the file might not exist or be empty")]
    EmptyResponse {
        /// The requested URL.
        url: String,
    },

    /// The response is a denial or error page rather than the file.
    #[error("file access denied or invalid file content received for {url}: {reason}")]
    AccessDenied {
        /// The requested URL.
        url: String,
        /// Signature that identified the page.
        reason: DenialReason,
    },

    /// No filename could be derived from the headers or the final URL.
    #[error("could not determine the filename from Content-Disposition or URL for {url}")]
    UnresolvedFilename {
        /// The final response URL.
        url: String,
    },

    /// The resolved filename lacks the expected version string.
    #[error("downloaded filename '{filename}' does not contain the expected version '{expected}'")]
    VersionMismatch {
        /// The resolved filename.
        filename: String,
        /// The version the caller expected.
        expected: String,
    },

    /// File system error creating or writing the destination.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file on disk is empty after the transfer.
    #[error("downloaded file {path} is empty; this often indicates a server-side error or incorrect URL")]
    EmptyFile {
        /// The removed destination path.
        path: PathBuf,
    },

    /// The file on disk is smaller than the declared size.
    #[error(
        "downloaded file size ({}) is less than expected ({}); file might be incomplete",
        display_size(.actual_bytes),
        display_size(.expected_bytes)
    )]
    IncompleteFile {
        /// The removed destination path.
        path: PathBuf,
        /// Declared size in bytes.
        expected_bytes: u64,
        /// Size on disk in bytes.
        actual_bytes: u64,
    },
}

fn display_size(bytes: &u64) -> String {
    human_readable_size(*bytes)
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a body stream error.
    pub fn stream(url: impl Into<String>, source: impl Into<StreamError>) -> Self {
        Self::Stream {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for failures raised after bytes may already be on disk.
    #[must_use]
    pub fn is_transfer_failure(&self) -> bool {
        matches!(self, Self::Stream { .. } | Self::Io { .. })
    }
}
