use thiserror::Error;

/// Transport-level failures.
///
/// These are distinct from application-level failures, which travel inside
/// the platform's response envelope and are never represented as errors by
/// this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The underlying HTTP client or request could not be constructed.
    #[error("failed to build transport: {0}")]
    Build(String),

    /// The request timed out before a response arrived.
    #[error("request timed out")]
    Timeout(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Network-level failure (connect, TLS, broken connection).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(Box::new(err))
        } else {
            TransportError::Transport(Box::new(err))
        }
    }
}
