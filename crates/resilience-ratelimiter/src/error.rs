use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy)]
#[error("rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}
