use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use url::Url;

use crate::{ProxyError, Result};

/// A fully formed outbound request.
///
/// The executor never mutates a request; every attempt transmits a fresh
/// copy of it.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

pub(crate) fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url.trim()).map_err(|source| ProxyError::InvalidUrl {
        url: url.to_owned(),
        source,
    })
}

impl Request {
    /// Builds a request, failing fast when `url` cannot be parsed.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self::from_url(method, parse_url(url)?))
    }

    pub fn from_url(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Metadata-only request; no body is expected in the response.
    pub fn head(url: &str) -> Result<Self> {
        Self::new(Method::HEAD, url)
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ProxyError::InvalidRequest(format!("header name '{name}': {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| ProxyError::InvalidRequest(format!("header '{name}' value: {err}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Appends query parameters to the URL.
    ///
    /// Existing pairs are kept; a key supplied twice appears twice.
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.url.query_pairs_mut().extend_pairs(pairs);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
