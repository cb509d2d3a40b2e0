use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use thiserror::Error;

use url::Url as UrlParser;

const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Schemes a stored url may keep, anything else is treated as part of a schemeless url
const REDIRECT_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Bytes that can't appear in a `Location` header value. Non-ASCII is always encoded.
const LOCATION_ESCAPES: &AsciiSet = &CONTROLS.add(b' ');

/// A url as submitted for shortening. Stored verbatim, so two submissions only share a key when
/// they are byte-for-byte equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url(String);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlParseError {
    #[error("url is empty")]
    Empty,
}

impl Url {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Url {
    type Error = UrlParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(UrlParseError::Empty);
        }

        Ok(Url(value))
    }
}

/// The absolute url `trimmed` names, if it starts with an allowed scheme and has a host
fn explicit_target(trimmed: &str) -> Option<String> {
    let parsed = UrlParser::parse(trimmed).ok()?;

    // "localhost:8080" parses with scheme "localhost" but has no host
    let scheme = parsed.scheme();
    if !parsed.has_host() || !REDIRECT_SCHEMES.contains(&scheme) {
        return None;
    }

    let written_out = trimmed
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        && trimmed[scheme.len()..].starts_with("://");

    if written_out {
        Some(trimmed.to_string())
    } else {
        // forms like "https:a.com" only make sense after normalization
        Some(parsed.into())
    }
}

/// Turns a stored url into the `Location` of a redirect, defaulting to http when no scheme was
/// given. The result is always a valid header value.
pub fn redirect_target(stored: &str) -> String {
    // same whitespace the url parser ignores
    let trimmed = stored.trim_matches(|c: char| c <= ' ');

    let target = explicit_target(trimmed)
        .unwrap_or_else(|| format!("{DEFAULT_SCHEME_PREFIX}{trimmed}"));

    utf8_percent_encode(&target, LOCATION_ESCAPES).to_string()
}
