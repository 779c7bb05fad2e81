use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrustError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Reference source error: {0}")]
    Reference(String),
}

impl From<reqwest::Error> for TrustError {
    fn from(e: reqwest::Error) -> Self {
        TrustError::Transport(e.to_string())
    }
}

pub type TrustResult<T> = Result<T, TrustError>;
