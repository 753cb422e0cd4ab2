use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedPollerError {
    #[error("stream not found: {0}")]
    UnknownStream(String),

    #[error("fetch failed: {0}")]
    FetchFailed(String),
}
