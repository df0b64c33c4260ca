use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed-delay retry behavior for a logical request.
///
/// `max_attempts` counts physical attempts, including the first one.
/// A value of `0` (e.g. from a hand-written config file) behaves like `1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of physical attempts.
    pub max_attempts: u32,
    /// Delay between two consecutive attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 15_000,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy, clamping `max_attempts` to at least one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// A single attempt, never retried.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Configures HTTP timeout, connection pooling and the default retry policy.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of idle keep-alive connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// Policy used by [`crate::ProxyClient::get`] and [`crate::ProxyClient::head`].
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            pool_max_idle_per_host: 5,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
