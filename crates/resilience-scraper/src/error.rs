use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("job not found: {0}")]
    UnknownJob(String),

    #[error("invalid job {id}: {reason}")]
    InvalidJob { id: String, reason: String },

    #[error("robots.txt disallows {user_agent} on {path}")]
    RobotsDisallowed { user_agent: String, path: String },

    #[error("fetch failed: {0}")]
    FetchFailed(String),
}
