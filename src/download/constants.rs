//! Constants for the download module (chunk sizes, denial heuristics).

/// Bytes read from the body before deciding whether it is a real file.
pub const PREVIEW_CHUNK_SIZE: usize = 1024;

/// Bytes read per chunk while streaming the rest of the body to disk.
pub const STREAM_CHUNK_SIZE: usize = 8192;

/// Declared sizes below this are checked for an HTML document preview.
pub const HTML_PAGE_SIZE_THRESHOLD: u64 = 5000;

/// Lowercased doctype marking an HTML document.
pub const HTML_DOCTYPE_MARKER: &str = "<!doctype html>";

/// Cells in the progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 50;
