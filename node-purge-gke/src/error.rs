use thiserror::Error;

#[derive(Debug, Error)]
pub enum GkeError {
    #[error("cluster {0} not found")]
    ClusterNotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to obtain access token: {0}")]
    Token(String),
}

pub type GkeResult<T> = Result<T, GkeError>;
