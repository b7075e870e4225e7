use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
