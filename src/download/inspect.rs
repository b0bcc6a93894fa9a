//! Denial-page detection on the first chunk of the response body.

use crate::site::SiteProfile;

use super::constants::{HTML_DOCTYPE_MARKER, HTML_PAGE_SIZE_THRESHOLD};
use super::error::DenialReason;

/// Decodes a preview as UTF-8, dropping invalid bytes.
#[must_use]
pub fn decode_preview(preview: &[u8]) -> String {
    preview.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Checks the preview for the portal's denial signatures.
///
/// A `declared_size` of `None` counts as 0, so an unsized HTML response is
/// always treated as a page.
///
/// # Errors
///
/// Returns the [`DenialReason`] of the first signature found.
pub fn inspect_preview(
    preview: &[u8],
    declared_size: Option<u64>,
    site: &SiteProfile,
) -> Result<(), DenialReason> {
    let text = decode_preview(preview);

    if text.contains(site.denial_phrase) {
        return Err(DenialReason::DenialPhrase);
    }

    if declared_size.unwrap_or(0) < HTML_PAGE_SIZE_THRESHOLD
        && text.to_lowercase().contains(HTML_DOCTYPE_MARKER)
    {
        return Err(DenialReason::HtmlPage);
    }

    Ok(())
}
