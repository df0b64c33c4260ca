use bytes::Bytes;
use reqwest::header::HeaderMap;

/// Status codes treated as a successful round trip.
pub const SUCCESS_STATUSES: [u16; 3] = [200, 201, 204];

/// Outcome of one physical round trip, fully buffered.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
