//! Authenticated file download: negotiation, vetting and persistence.
//!
//! The download runs in two steps on the logged-in [`Session`]:
//!
//! 1. [`negotiate`] issues a streamed GET, reads the first chunk and rejects
//!    denial pages, resolves the filename and checks the expected version.
//!    Nothing touches the disk before this succeeds.
//! 2. [`persist`] writes the first chunk and the remaining body to the save
//!    directory with a progress line, then verifies the size on disk. A file
//!    that is empty, short or interrupted is removed.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use portal_fetch::download::{negotiate, persist};
//! use portal_fetch::{Console, ConsoleOptions, Session, SiteProfile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new()?;
//! let site = SiteProfile::default();
//! let console = Console::stdio(ConsoleOptions::default());
//! let negotiated = negotiate(&session, "https://developer.deepx.ai/?url=2262", &site, None).await?;
//! let saved = persist(negotiated, Path::new("downloads"), &console).await?;
//! println!("Downloaded: {}", saved.path.display());
//! # Ok(())
//! # }
//! ```

mod body;
mod constants;
mod error;
mod filename;
mod inspect;
mod negotiate;
mod persist;
mod progress;

pub use body::ChunkedBody;
pub use constants::{
    HTML_PAGE_SIZE_THRESHOLD, PREVIEW_CHUNK_SIZE, PROGRESS_BAR_WIDTH, STREAM_CHUNK_SIZE,
};
pub use error::{DenialReason, DownloadError, StreamError};
pub use filename::{FILENAME_STRATEGIES, FilenameSource, FilenameStrategy, resolve_filename};
pub use inspect::{decode_preview, inspect_preview};
pub use negotiate::{Negotiated, negotiate};
pub use persist::{PersistedFile, persist};
pub use progress::{TransferProgress, human_readable_size, render_transfer};

pub use crate::session::Session;
