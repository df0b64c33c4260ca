use reqwest::header::HeaderMap;

/// Longest response body excerpt rendered in error messages.
const BODY_EXCERPT_CHARS: usize = 512;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a single physical attempt did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Network or request execution error from `reqwest` (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// Failure reported by a non-`reqwest` [`crate::Transport`] implementation.
    #[error("transport error: {0}")]
    Other(#[source] BoxError),
    /// The server answered with a status outside {200, 201, 204}.
    #[error("HTTP request failed, status code {0}")]
    Status(u16),
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    /// The URL could not be parsed. Never retried.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Request parameters (header names or values) are malformed. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Final failure of a logical request, annotated with the last attempt.
    #[error(
        "{source}, server response = {}, http status code = {} (after {attempts} attempt(s))",
        excerpt(.body),
        status_text(.status)
    )]
    Request {
        /// Number of physical attempts made.
        attempts: u32,
        /// Status of the last attempt, if a response was received.
        status: Option<u16>,
        /// Raw body of the last attempt, lossily decoded.
        body: String,
        /// Response headers of the last attempt; empty when no response arrived.
        headers: HeaderMap,
        #[source]
        source: AttemptError,
    },
    /// The metadata probe found neither a usable `Last-Modified` nor a strong `ETag`.
    #[error("no cache validator: neither Last-Modified nor ETag header found")]
    NoValidator,
    /// Every path segment of the URL is empty.
    #[error("unable to find a token in url '{0}'")]
    NoPathToken(String),
}

impl ProxyError {
    /// HTTP status of the last attempt, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw response body of the last attempt.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Request { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }

    /// Response headers of the last attempt, e.g. `Retry-After`.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Request { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Number of physical attempts made; zero for construction errors.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Request { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    pub fn is_no_validator(&self) -> bool {
        matches!(self, Self::NoValidator)
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}

fn status_text(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    use super::{AttemptError, ProxyError, BODY_EXCERPT_CHARS};

    #[test]
    fn request_error_message_carries_body_and_status() {
        let err = ProxyError::Request {
            attempts: 1,
            status: Some(404),
            body: "not here".to_owned(),
            headers: HeaderMap::new(),
            source: AttemptError::Status(404),
        };

        assert_eq!(
            err.to_string(),
            "HTTP request failed, status code 404, server response = not here, \
             http status code = 404 (after 1 attempt(s))"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("not here"));
    }

    #[test]
    fn long_body_is_truncated_in_message_only() {
        let body = "x".repeat(BODY_EXCERPT_CHARS * 2);
        let err = ProxyError::Request {
            attempts: 3,
            status: None,
            body: body.clone(),
            headers: HeaderMap::new(),
            source: AttemptError::Other("connection reset".into()),
        };

        let message = err.to_string();
        assert!(message.contains("..."));
        assert!(message.contains("http status code = none"));
        assert!(message.len() < body.len());
        assert_eq!(err.body().map(str::len), Some(body.len()));
        assert_eq!(err.attempts(), 3);
    }

    #[test]
    fn request_error_exposes_last_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));
        let err = ProxyError::Request {
            attempts: 1,
            status: Some(429),
            body: String::new(),
            headers,
            source: AttemptError::Status(429),
        };

        let retry_after = err.headers().and_then(|headers| headers.get(RETRY_AFTER));
        assert_eq!(retry_after, Some(&HeaderValue::from_static("120")));
        assert!(ProxyError::NoValidator.headers().is_none());
    }
}
