//! Field parsing utilities shared by the format decoders
//!
//! Helpers for converting raw text and fixed-point values into typed fields,
//! and for the child-element lookups both XML dialects rely on.

use crate::error::{IngestError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use roxmltree::Node;
use std::path::Path;
use std::sync::OnceLock;

/// Semicircle units per degree: 2^32 / 360
pub const SEMICIRCLES_PER_DEGREE: f64 = 4_294_967_296.0 / 360.0;

/// Convert a fixed-point semicircle angle to degrees
pub fn semicircles_to_degrees(value: f64) -> f64 {
    value / SEMICIRCLES_PER_DEGREE
}

/// Parse a timestamp in RFC 3339 form, or offset-less ISO 8601 taken as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a required timestamp, reporting the field on failure
pub fn require_timestamp(path: &Path, field: &str, value: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| IngestError::invalid_value(path, field, value))
}

/// Parse a floating point field value
pub fn parse_number(path: &Path, field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| IngestError::invalid_value(path, field, value))
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<days>\d+)\s+days?,?\s+)?(?:(?P<hours>\d+):)?(?P<minutes>\d{1,2}):(?P<seconds>\d{1,2}(?:\.\d+)?)$",
        )
        .expect("duration pattern is valid")
    })
}

/// Parse a duration into elapsed seconds.
///
/// Accepts `HH:MM:SS[.fff]`, `MM:SS`, `D day(s) HH:MM:SS` and a bare number
/// of seconds. Returns `None` for text in any other shape.
pub fn parse_duration_seconds(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<f64>() {
        return Some(seconds);
    }

    let captures = duration_pattern().captures(value)?;
    let part = |name: &str| -> f64 {
        captures
            .name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    Some(part("days") * 86_400.0 + part("hours") * 3_600.0 + part("minutes") * 60.0 + part("seconds"))
}

/// First element child of `node` with the given namespace and local name
pub fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name((namespace, name)))
}

/// All element children of `node` with the given namespace and local name
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name((namespace, name)))
}

/// Trimmed text content of an element, empty when it has none
pub fn text_of<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Parse the text of an optional child element as a number.
///
/// Absent element yields `None`; a present element with unparseable text is
/// an error.
pub fn optional_child_number(
    path: &Path,
    node: Node<'_, '_>,
    namespace: &str,
    name: &str,
) -> Result<Option<f64>> {
    child(node, namespace, name)
        .map(|elem| parse_number(path, name, text_of(elem)))
        .transpose()
}
