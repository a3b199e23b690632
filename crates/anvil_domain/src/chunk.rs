use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// One item on the invocation output stream.
///
/// Failures travel in-band as `Error` chunks and terminate the stream; a
/// successful stream simply ends after its last `Data` chunk. Consumers
/// never see a stream of `Result`s.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamChunk {
    Data { text: String },
    Error { message: String },
}

impl StreamChunk {
    pub fn data(text: impl Into<String>) -> Self {
        Self::Data { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

pub type ChunkStream = Pin<Box<dyn tokio_stream::Stream<Item = StreamChunk> + Send>>;
