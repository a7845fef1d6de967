use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned an empty output")]
    EmptyOutput,

    #[error("model response failed verdict validation: {0}")]
    InvalidVerdict(String),

    #[error("failed to encode review prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
