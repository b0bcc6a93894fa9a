//! Minimal HTML helpers for scraping form inputs: tag/attribute regexes and
//! entity decoding.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// `<input ...>` start tags; quoted attribute values may contain `>`.
static INPUT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<input\b((?:[^>"']|"[^"]*"|'[^']*')*)/?>"#)
});

/// One attribute inside a start tag: bare, double-quoted, single-quoted or unquoted value.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?s)([^\s=/"'>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);"));

/// Attributes of one `<input>` element, names lowercased, values entity-decoded.
///
/// When an attribute repeats, the first occurrence wins.
pub(crate) type Attributes = HashMap<String, String>;

/// Returns the attributes of every `<input>` element in document order.
pub(crate) fn input_elements(html: &str) -> Vec<Attributes> {
    INPUT_TAG_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|body| parse_attributes(body.as_str()))
        .collect()
}

fn parse_attributes(tag_body: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for caps in ATTRIBUTE_RE.captures_iter(tag_body) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attributes
            .entry(name.as_str().to_ascii_lowercase())
            .or_insert_with(|| decode_entities(value));
    }
    attributes
}

/// Decodes the character references that show up in attribute values.
///
/// Unknown named entities are kept verbatim.
pub(crate) fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    ENTITY_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_reference(entity),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn numeric_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
