//! `resilient-http` is an async HTTP transport helper.
//!
//! It wraps outbound requests with fixed-delay retries and derives
//! cache-validation metadata from response headers:
//! - [`ProxyClient::execute`] retries transient failures, never 4xx
//! - [`ProxyClient::get`] returns the body of a retrieval request
//! - [`ProxyClient::head`] probes `Last-Modified` / `ETag` for conditional fetches
//! - [`last_path_token`] pulls the last non-empty path segment from a URL

mod client;
mod error;
mod metadata;
mod options;
mod request;
mod timestamp;
mod token;
mod transport;
mod types;

pub use client::{is_retryable_status, HttpProxy, ProxyClient};
pub use error::{AttemptError, BoxError, ProxyError};
pub use metadata::{normalize_etag, Head};
pub use options::{ClientOptions, RetryPolicy};
pub use request::Request;
pub use timestamp::{parse_timestamp, parse_timestamp_with, Layout, HTTP_DATE_LAYOUTS};
pub use token::last_path_token;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Response, SUCCESS_STATUSES};

pub type Result<T> = std::result::Result<T, ProxyError>;
