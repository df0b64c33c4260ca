use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ETAG, LAST_MODIFIED};

use crate::{timestamp::parse_timestamp, ProxyError, Result};

/// Cache-validation signals extracted from a metadata-only response.
///
/// At least one of the two fields is always present.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Head {
    /// Parsed `Last-Modified`, absent when missing or unparsable.
    pub last_modified: Option<DateTime<Utc>>,
    /// Strong `ETag` without its surrounding quotes.
    pub etag: Option<String>,
}

impl Head {
    /// Extracts and normalizes `Last-Modified` and `ETag` from `headers`.
    ///
    /// Fails with [`ProxyError::NoValidator`] when neither yields a usable value.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let last_modified = header_str(headers, LAST_MODIFIED).and_then(|raw| {
            let parsed = parse_timestamp(raw);
            #[cfg(feature = "tracing")]
            if parsed.is_none() {
                tracing::debug!(value = raw, "discarding unparsable Last-Modified header");
            }
            parsed
        });
        let etag = header_str(headers, ETAG).and_then(normalize_etag);

        if last_modified.is_none() && etag.is_none() {
            return Err(ProxyError::NoValidator);
        }

        Ok(Self {
            last_modified,
            etag,
        })
    }
}

/// Strips the quotes from a strong entity tag.
///
/// Weak validators (`W/"..."`) only promise semantic equivalence, so they
/// are dropped along with empty values.
pub fn normalize_etag(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('"');
    if value.is_empty() || value.starts_with("W/") {
        return None;
    }
    Some(value.to_owned())
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
