use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{AttemptError, ClientOptions, ProxyError, Request, Response};

/// One physical HTTP round trip.
///
/// Implementations transmit the request exactly once and report whatever
/// the server answered; status classification and retries belong to
/// [`crate::ProxyClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: &Request) -> Result<Response, AttemptError>;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReqwestTransport {
    /// Builds a client with the idle pool capped at `pool_max_idle_per_host`.
    pub fn new(options: &ClientOptions) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()
            .map_err(ProxyError::Build)?;
        Ok(Self::from_client(http, options.timeout()))
    }

    /// Wraps an already configured client; `timeout` applies to every request.
    pub fn from_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(&self, request: &Request) -> Result<Response, AttemptError> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone())
            .timeout(self.timeout);
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(AttemptError::Transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        // A broken body does not turn the status into a failure.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    error = %_err,
                    status,
                    url = %request.url(),
                    "unable to read response body"
                );
                Bytes::new()
            }
        };

        Ok(Response::new(status, headers, body))
    }
}
