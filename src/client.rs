use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use tokio::time::sleep;

use crate::{
    AttemptError, ClientOptions, Head, ProxyError, Request, ReqwestTransport, Response, Result,
    RetryPolicy, Transport,
};

/// Capability set offered to callers: a raw round trip with retries, a body
/// fetch and a cache-validator probe.
///
/// Lets API clients depend on `Arc<dyn HttpProxy>` instead of a concrete
/// transport stack.
#[async_trait]
pub trait HttpProxy: Send + Sync {
    async fn execute(&self, request: &Request, policy: &RetryPolicy) -> Result<Response>;

    async fn get(&self, url: &str) -> Result<Bytes>;

    async fn head(&self, url: &str) -> Result<Head>;
}

/// HTTP client that retries transient failures with a fixed delay.
#[derive(Clone)]
pub struct ProxyClient<T = ReqwestTransport> {
    transport: T,
    options: ClientOptions,
}

impl<T> fmt::Debug for ProxyClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ProxyClient<ReqwestTransport> {
    /// Creates a client on top of a pooled `reqwest` transport.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&options)?;
        Ok(Self::with_transport(transport, options))
    }
}

impl<T: Transport> ProxyClient<T> {
    /// Creates a client on top of any [`Transport`], e.g. a test double.
    pub fn with_transport(transport: T, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends `request` until it succeeds, fails permanently, or `policy`
    /// runs out of attempts.
    ///
    /// Only 200, 201 and 204 count as success. A 4xx response is returned
    /// on first sight; network errors and every other status are retried
    /// after `policy.delay()`. When attempts run out, the error describes
    /// the last attempt.
    pub async fn execute(&self, request: &Request, policy: &RetryPolicy) -> Result<Response> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let (status, body, headers, source) = match self.transport.round_trip(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => (
                    Some(response.status),
                    response.text(),
                    response.headers,
                    AttemptError::Status(response.status),
                ),
                Err(err) => (None, String::new(), HeaderMap::new(), err),
            };

            let exhausted = attempt >= policy.max_attempts;
            if exhausted || !is_retryable_status(status) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    status = ?status,
                    error = %source,
                    url = %request.url(),
                    method = %request.method(),
                    "http request permanently rejected{}",
                    if exhausted { ", attempts exhausted" } else { "" }
                );
                return Err(ProxyError::Request {
                    attempts: attempt,
                    status,
                    body,
                    headers,
                    source,
                });
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                status = ?status,
                error = %source,
                url = %request.url(),
                method = %request.method(),
                "retrying http request after {} ms",
                policy.delay_ms
            );
            sleep(policy.delay()).await;
        }
    }

    /// Fetches `url` with the client's default retry policy and returns the body.
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let request = Request::get(url)?;
        let response = self.execute(&request, &self.options.retry).await?;
        Ok(response.body)
    }

    /// Issues a `HEAD` request and extracts its cache validators.
    ///
    /// Transport failures surface unchanged; a successful response without a
    /// usable `Last-Modified` or strong `ETag` fails with
    /// [`ProxyError::NoValidator`].
    pub async fn head(&self, url: &str) -> Result<Head> {
        let request = Request::head(url)?;
        let response = self.execute(&request, &self.options.retry).await?;
        Head::from_headers(&response.headers)
    }
}

#[async_trait]
impl<T: Transport> HttpProxy for ProxyClient<T> {
    async fn execute(&self, request: &Request, policy: &RetryPolicy) -> Result<Response> {
        ProxyClient::execute(self, request, policy).await
    }

    async fn get(&self, url: &str) -> Result<Bytes> {
        ProxyClient::get(self, url).await
    }

    async fn head(&self, url: &str) -> Result<Head> {
        ProxyClient::head(self, url).await
    }
}

/// Client errors (4xx) will never be accepted as-is; every other failure,
/// including a network error without any status, may be retried.
pub fn is_retryable_status(status: Option<u16>) -> bool {
    !matches!(status, Some(400..=499))
}
