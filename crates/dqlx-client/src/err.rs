use dqlx::DqlError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to compile request: {0}")]
    Compile(#[from] DqlError),

    /// Raised by the [`Executor`](crate::Executor) implementation.
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no block named {0:?}")]
    MissingBlock(String),
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Transport(err)
    }
}
