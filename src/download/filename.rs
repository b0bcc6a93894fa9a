//! Filename resolution and sanitization for the downloaded file.
//!
//! The name comes from the first strategy in [`FILENAME_STRATEGIES`] that
//! yields one: the extended `filename*=` form of `Content-Disposition`, the
//! plain `filename=` form, then the last segment of the final URL.

use std::fmt;
use std::path::{Component, Path};

use tracing::debug;
use url::Url;

/// Inputs available to the filename strategies.
#[derive(Debug, Clone, Copy)]
pub struct FilenameSource<'a> {
    /// Raw `Content-Disposition` header value, if present and valid text.
    pub content_disposition: Option<&'a str>,
    /// URL of the response after redirects.
    pub final_url: &'a Url,
}

/// One way of deriving a filename.
#[derive(Clone, Copy)]
pub struct FilenameStrategy {
    /// Short label used in logs.
    pub name: &'static str,
    /// Returns the raw (unsanitized) filename, if this strategy applies.
    pub resolve: fn(&FilenameSource<'_>) -> Option<String>,
}

impl fmt::Debug for FilenameStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilenameStrategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Strategies in priority order.
pub const FILENAME_STRATEGIES: &[FilenameStrategy] = &[
    FilenameStrategy {
        name: "content-disposition filename*",
        resolve: from_extended_disposition,
    },
    FilenameStrategy {
        name: "content-disposition filename",
        resolve: from_simple_disposition,
    },
    FilenameStrategy {
        name: "final url path",
        resolve: from_final_url,
    },
];

/// Resolves a sanitized filename using the first strategy that yields a
/// non-empty name.
#[must_use]
pub fn resolve_filename(
    source: &FilenameSource<'_>,
    strategies: &[FilenameStrategy],
) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        let raw = (strategy.resolve)(source)?;
        let name = sanitize_filename(&raw);
        if name.is_empty() {
            return None;
        }
        debug!(strategy = strategy.name, filename = %name, "filename resolved");
        Some(name)
    })
}

fn from_extended_disposition(source: &FilenameSource<'_>) -> Option<String> {
    parse_extended_filename(source.content_disposition?)
}

fn from_simple_disposition(source: &FilenameSource<'_>) -> Option<String> {
    parse_simple_filename(source.content_disposition?)
}

fn from_final_url(source: &FilenameSource<'_>) -> Option<String> {
    let last = source.final_url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode_binary(last.as_bytes());
    let name = String::from_utf8_lossy(&decoded).into_owned();
    name.contains('.').then_some(name)
}

/// Parses the RFC 5987 `filename*=charset'language'value` parameter.
///
/// Returns `None` when the parameter is absent or lacks the `'` separators.
pub(crate) fn parse_extended_filename(header: &str) -> Option<String> {
    let start = find_parameter(header, "filename*=")?;
    let value = header[start..].split(';').next().unwrap_or_default().trim();
    let value = strip_quotes(value);

    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    let bytes = urlencoding::decode_binary(encoded.as_bytes());
    let decoded = decode_charset(charset, &bytes);
    let name = strip_quotes(decoded.trim()).to_string();
    (!name.is_empty()).then_some(name)
}

/// Parses the plain `filename=` parameter, quoted or not.
pub(crate) fn parse_simple_filename(header: &str) -> Option<String> {
    let start = find_parameter(header, "filename=")?;
    let value = header[start..].trim_start();

    let name = if let Some(quoted) = value.strip_prefix('"') {
        quoted.split('"').next().unwrap_or_default()
    } else {
        strip_quotes(value.split(';').next().unwrap_or_default().trim())
    };

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Byte offset just past `key` when it starts a parameter, case-insensitively.
fn find_parameter(header: &str, key: &str) -> Option<usize> {
    let lower = header.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(key) {
        let at = from + pos;
        let preceded_ok = lower[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c == ';' || c.is_whitespace());
        if preceded_ok {
            return Some(at + key.len());
        }
        from = at + key.len();
    }
    None
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    match charset.trim().to_ascii_lowercase().as_str() {
        "" | "utf-8" | "utf8" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin1" | "latin-1" | "us-ascii" | "ascii" => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        other => {
            debug!(charset = other, "unsupported filename charset; decoding as UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Sanitizes a filename so it stays a single segment inside the save directory.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) with `_`, and rewrites the
/// dots of `.`/`..`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
