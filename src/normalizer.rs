//! Validation and normalization of raw service payloads.
//!
//! Order of checks: strip an optional Markdown code fence, parse JSON,
//! validate against the shared response schema, deserialize, reject
//! `platform == Unknown`, check the record shape (non-empty title,
//! absolute thumbnail URI), then attach citations.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::media::{Citation, MediaRecord, Platform, response_schema, validate_against_schema};
use crate::resolver::{RawCitation, RawResolution, ResolveError};
use crate::utils::compile_static_regex;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```\s*$"));

/// Turns a raw resolution into a validated [`MediaRecord`].
///
/// # Errors
///
/// - [`ResolveError::MalformedResponse`] when the payload does not parse or
///   does not match the schema.
/// - [`ResolveError::UnsupportedPlatform`] when the payload names `Unknown`.
pub fn normalize(raw: &RawResolution) -> Result<MediaRecord, ResolveError> {
    let payload = strip_code_fence(&raw.text);

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ResolveError::malformed(format!("payload is not valid JSON: {e}")))?;

    validate_against_schema(&response_schema(), &value)
        .map_err(|violation| ResolveError::malformed(violation.to_string()))?;

    let mut record: MediaRecord = serde_json::from_value(value)
        .map_err(|e| ResolveError::malformed(format!("payload does not fit the record: {e}")))?;

    if record.platform == Platform::Unknown {
        return Err(ResolveError::UnsupportedPlatform);
    }

    if record.title.trim().is_empty() {
        return Err(ResolveError::malformed("title is empty"));
    }

    if !is_absolute_uri(&record.thumbnail_url) {
        return Err(ResolveError::malformed(format!(
            "thumbnailUrl '{}' is not an absolute URI",
            record.thumbnail_url
        )));
    }

    let citations = map_citations(&raw.citations);
    debug!(
        options = record.options.len(),
        citations = citations.len(),
        dropped = raw.citations.len() - citations.len(),
        "Normalized media record"
    );
    record.sources = (!citations.is_empty()).then_some(citations);

    Ok(record)
}

fn strip_code_fence(text: &str) -> &str {
    if let Some(captures) = CODE_FENCE.captures(text)
        && let Some(inner) = captures.get(1)
    {
        return inner.as_str();
    }
    text.trim()
}

fn is_absolute_uri(candidate: &str) -> bool {
    Url::parse(candidate.trim()).is_ok_and(|url| url.has_host())
}

/// Maps raw grounding references into citations, dropping entries without a
/// usable absolute URI.
fn map_citations(raw: &[RawCitation]) -> Vec<Citation> {
    raw.iter()
        .filter_map(|citation| {
            let uri = citation.uri.as_deref()?.trim();
            if !is_absolute_uri(uri) {
                return None;
            }
            let title = citation
                .title
                .as_deref()
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(ToString::to_string);
            Some(Citation {
                uri: uri.to_string(),
                title,
            })
        })
        .collect()
}
