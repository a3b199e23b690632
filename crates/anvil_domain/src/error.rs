use std::pin::Pin;

use derive_more::From;
use thiserror::Error;

use crate::ModelId;

// NOTE: Deriving From for every variant is a bad idea. You end up converting
// errors without context. For eg: not every String should silently become a
// `ChunkParse`, we want the conversion to be spelled out at the call site.
#[derive(Debug, Error, From)]
pub enum Error {
    #[error("AWS credentials must be in format: ACCESS_KEY:SECRET_KEY")]
    CredentialFormat,

    #[error("Model {0} is not supported. Please check the model ID.")]
    #[from(skip)]
    UnsupportedModel(ModelId),

    #[error("No response body received from AWS Bedrock")]
    MissingResponseBody,

    #[error("Failed to parse chunk: {0}")]
    #[from(skip)]
    ChunkParse(String),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Retryable(anyhow::Error),
}

pub type Result<A> = std::result::Result<A, Error>;
pub type BoxStream<A, E> =
    Pin<Box<dyn tokio_stream::Stream<Item = std::result::Result<A, E>> + Send>>;

pub type ResultStream<A, E> = std::result::Result<BoxStream<A, E>, E>;

impl Error {
    pub fn into_retryable(self) -> Self {
        use anyhow::anyhow;
        Self::Retryable(anyhow!(self))
    }
}
