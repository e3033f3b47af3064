//! Provider output normalizer.
//!
//! The provider's return shape varies by model family: batch image models
//! return arrays of file handles, single-output audio/video models return
//! one handle or one plain string, and some legacy models nest the value
//! under an `output` field. [`RawOutput`] decodes a raw result into one of
//! those named shapes (first match wins) and [`extract_candidates`] flattens
//! it into an ordered list of URL candidates.
//!
//! Candidates are not trusted: [`check_candidate`] rejects the junk that
//! stringifying an unexpected shape produces.

use serde::Deserialize;
use serde_json::Value;

/// What an unrecognised JSON object stringifies to. Never a usable URL.
pub const OBJECT_SENTINEL: &str = "[object Object]";

/// Placeholder strings some model wrappers emit for a missing output.
const NULLISH_SENTINELS: &[&str] = &["undefined", "null"];

/// A file handle: an object whose `url` member resolves to the asset URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileHandle {
    pub url: String,
}

/// The shapes a raw provider result can take, tried in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawOutput {
    /// A sequence where every element is a file handle.
    Handles(Vec<FileHandle>),
    /// A sequence of plain URL strings.
    Urls(Vec<String>),
    /// A sequence of mixed elements, resolved one by one.
    Sequence(Vec<Value>),
    /// A single file handle.
    Handle(FileHandle),
    /// A single plain string.
    Url(String),
    /// An object carrying the real value under `output`.
    Nested { output: Value },
    /// Anything else.
    Unknown(Value),
}

impl RawOutput {
    /// Decode a raw provider result. Never fails: shapes that match nothing
    /// else land in [`RawOutput::Unknown`].
    pub fn decode(raw: &Value) -> Self {
        match RawOutput::deserialize(raw) {
            // `{ "output": null }` carries nothing to unwrap.
            Ok(RawOutput::Nested { output: Value::Null }) => RawOutput::Unknown(raw.clone()),
            Ok(decoded) => decoded,
            Err(_) => RawOutput::Unknown(raw.clone()),
        }
    }

    /// Flatten a decoded result that is a sequence, a handle, or a string.
    ///
    /// Hands the nested and unknown shapes back so the caller decides how to
    /// treat them.
    fn into_direct_candidates(self) -> Result<Vec<String>, RawOutput> {
        match self {
            RawOutput::Handles(handles) => Ok(handles.into_iter().map(|h| h.url).collect()),
            RawOutput::Urls(urls) => Ok(urls),
            RawOutput::Sequence(items) => Ok(items.iter().map(element_candidate).collect()),
            RawOutput::Handle(handle) => Ok(vec![handle.url]),
            RawOutput::Url(url) => Ok(vec![url]),
            other => Err(other),
        }
    }
}

/// Turn a raw provider result into an ordered list of URL candidates.
///
/// Rule order:
/// 1. sequence (each element a handle, a string, or stringified),
/// 2. single handle,
/// 3. plain string,
/// 4. object with `output` (rules 1–3 applied to it, else stringified),
/// 5. anything else, stringified as one candidate.
pub fn extract_candidates(raw: &Value) -> Vec<String> {
    match RawOutput::decode(raw).into_direct_candidates() {
        Ok(candidates) => candidates,
        Err(RawOutput::Nested { output }) => {
            match RawOutput::decode(&output).into_direct_candidates() {
                Ok(candidates) => candidates,
                Err(_) => {
                    tracing::warn!(output = %output, "Unknown nested provider output shape");
                    vec![stringify(&output)]
                }
            }
        }
        Err(_) => {
            tracing::warn!(result = %raw, "Unknown provider output shape");
            vec![stringify(raw)]
        }
    }
}

/// Resolve one element of a mixed sequence.
fn element_candidate(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("url") {
            Some(Value::String(url)) => url.clone(),
            _ => {
                tracing::warn!(element = %item, "Unknown provider output element shape");
                stringify(item)
            }
        },
        other => {
            tracing::warn!(element = %other, "Unknown provider output element shape");
            stringify(other)
        }
    }
}

/// Stringify a JSON value the way a loosely-typed client would render it.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Object(_) => OBJECT_SENTINEL.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Why a URL candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Sentinel,
    NotHttp,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::Empty => "empty",
            Rejection::Sentinel => "sentinel",
            Rejection::NotHttp => "not_http",
        }
    }
}

/// Accept a candidate only if it is a non-empty `http://` or `https://` URL
/// and not one of the stringification sentinels.
pub fn check_candidate(candidate: &str) -> Result<(), Rejection> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }
    if trimmed == OBJECT_SENTINEL || NULLISH_SENTINELS.contains(&trimmed) {
        return Err(Rejection::Sentinel);
    }
    if !has_http_scheme(trimmed) {
        return Err(Rejection::NotHttp);
    }
    Ok(())
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
