//! Error type shared by the pagekit helpers.

use thiserror::Error;

/// Errors returned by pagekit helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid element provided. The element must be a valid DOM node.")]
    InvalidElement,

    #[error("Invalid chunk size input. The chunk size has to be greater than 0.")]
    InvalidChunkSize,

    /// A chunk callback failed and processing was stopped.
    #[error("chunk starting at index {start} failed: {source}")]
    ChunkFailed {
        start: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Prop descriptor inputs had the wrong type.
    #[error("{0}")]
    InvalidProp(&'static str),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
