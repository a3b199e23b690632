use anvil_domain::{AdapterEvent, Error, ModelAdapter, StreamChunk};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::transport::{StreamTransport, TransportRequest};

/// Runs one complete attempt against a single candidate identifier.
///
/// The whole response is buffered before anything reaches the caller, so a
/// failed attempt that gets retried never leaks partial output. Any failure
/// (opening the stream, a mid-stream transport error, an undecodable
/// payload, an error event from the model) surfaces as `Err`, where the
/// retry predicate can see it.
pub async fn collect(
    transport: &dyn StreamTransport,
    adapter: &dyn ModelAdapter,
    request: TransportRequest,
    token: CancellationToken,
) -> anyhow::Result<Vec<StreamChunk>> {
    let mut stream = transport.invoke(request, token).await?;
    let mut chunks = Vec::new();

    while let Some(event) = stream.next().await {
        let payload = event?;
        if payload.is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_slice(&payload)
            .map_err(|parse_error| Error::ChunkParse(parse_error.to_string()))?;

        match adapter.parse_event(&value) {
            AdapterEvent::Content(text) => {
                if !text.is_empty() {
                    chunks.push(StreamChunk::data(text));
                }
            }
            AdapterEvent::Done => break,
            AdapterEvent::Error(message) => return Err(anyhow::anyhow!(message)),
            AdapterEvent::Ignored => {}
        }
    }

    if chunks.is_empty() {
        return Err(Error::MissingResponseBody.into());
    }

    debug!(chunks = chunks.len(), "Collected response stream");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anvil_domain::{BoxStream, CredentialPair, ModelId};
    use async_trait::async_trait;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::adapters::AnthropicAdapter;

    /// Transport that replays one scripted stream of payload results.
    struct ScriptedTransport {
        events: Mutex<Vec<anyhow::Result<Bytes>>>,
    }

    impl ScriptedTransport {
        fn new(events: Vec<anyhow::Result<Bytes>>) -> Self {
            Self { events: Mutex::new(events) }
        }

        fn from_values(values: Vec<serde_json::Value>) -> Self {
            Self::new(
                values
                    .into_iter()
                    .map(|value| Ok(Bytes::from(value.to_string())))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl StreamTransport for ScriptedTransport {
        async fn invoke(
            &self,
            _request: TransportRequest,
            _token: CancellationToken,
        ) -> anyhow::Result<BoxStream<Bytes, anyhow::Error>> {
            let events = std::mem::take(&mut *self.events.lock().unwrap());
            Ok(Box::pin(tokio_stream::iter(events)))
        }
    }

    fn fixture_request() -> TransportRequest {
        TransportRequest {
            credentials: CredentialPair::new("AKIAEXAMPLE", "secret"),
            region: "us-east-1".to_string(),
            model_id: ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0"),
            body: json!({}),
            content_type: "application/json".to_string(),
            accept: "application/json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_collects_data_chunks_until_done() {
        let transport = ScriptedTransport::from_values(vec![
            json!({"type": "message_start", "message": {}}),
            json!({"type": "content_block_delta", "delta": {"text": "Hel"}}),
            json!({"type": "content_block_delta", "delta": {"text": "lo"}}),
            json!({"type": "message_stop"}),
        ]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let expected = vec![StreamChunk::data("Hel"), StreamChunk::data("lo")];

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_ignored_events_do_not_end_the_stream() {
        let transport = ScriptedTransport::from_values(vec![
            json!({"type": "ping"}),
            json!({"type": "content_block_delta", "delta": {"text": "Hi"}}),
        ]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(actual, vec![StreamChunk::data("Hi")]);
    }

    #[tokio::test]
    async fn test_error_event_fails_the_attempt() {
        let transport = ScriptedTransport::from_values(vec![
            json!({"type": "content_block_delta", "delta": {"text": "Hel"}}),
            json!({"type": "error", "error": {"message": "Overloaded"}}),
        ]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(actual.unwrap_err().to_string(), "Overloaded");
    }

    #[tokio::test]
    async fn test_mid_stream_transport_failure_fails_the_attempt() {
        let transport = ScriptedTransport::new(vec![
            Ok(Bytes::from(
                json!({"type": "content_block_delta", "delta": {"text": "Hel"}}).to_string(),
            )),
            Err(anyhow::anyhow!("connection reset")),
        ]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await;

        assert!(actual.is_err());
    }

    #[tokio::test]
    async fn test_undecodable_payload_fails_the_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(Bytes::from_static(b"not json"))]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await;

        let error = actual.unwrap_err();
        assert!(error.chain().any(|cause| {
            matches!(cause.downcast_ref::<Error>(), Some(Error::ChunkParse(_)))
        }));
    }

    #[tokio::test]
    async fn test_empty_stream_is_a_missing_body() {
        let transport = ScriptedTransport::from_values(vec![]);

        let actual = collect(
            &transport,
            &AnthropicAdapter,
            fixture_request(),
            CancellationToken::new(),
        )
        .await;

        let error = actual.unwrap_err();
        assert!(error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<Error>(),
                Some(Error::MissingResponseBody)
            )
        }));
    }
}
