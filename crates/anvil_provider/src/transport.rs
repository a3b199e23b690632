use anvil_domain::{BoxStream, CredentialPair, Error, ModelId};
use anyhow::Context as _;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::retry::RetryConfig;
use aws_sdk_bedrockruntime::config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::invoke_model_with_response_stream::InvokeModelWithResponseStreamError;
use aws_sdk_bedrockruntime::types::ResponseStream;
use aws_sdk_bedrockruntime::types::error::ResponseStreamError;
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use aws_smithy_types::Blob;
use bytes::Bytes;
use derive_setters::Setters;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::failure::rate_limit::{InvokeError, MidStreamError};

/// One fully-resolved network call: a concrete candidate identifier plus the
/// family-native body the adapter produced.
#[derive(Clone, Debug, Setters)]
#[setters(into)]
pub struct TransportRequest {
    pub credentials: CredentialPair,
    pub region: String,
    pub model_id: ModelId,
    pub body: serde_json::Value,
    pub content_type: String,
    pub accept: String,
}

/// Opens the streaming invocation and yields raw event payload bytes.
///
/// Implementations perform no retrying of their own; failures carry enough
/// typed context for the classifier and inspector to act on.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn invoke(
        &self,
        request: TransportRequest,
        token: CancellationToken,
    ) -> anyhow::Result<BoxStream<Bytes, anyhow::Error>>;
}

/// [`StreamTransport`] backed by the AWS SDK.
///
/// Every call builds its own client from the request's credentials and
/// region, so concurrent invocations share nothing. The SDK's own retry
/// layer is disabled; retrying is owned by the engine.
#[derive(Debug, Default)]
pub struct BedrockTransport;

#[async_trait]
impl StreamTransport for BedrockTransport {
    async fn invoke(
        &self,
        request: TransportRequest,
        token: CancellationToken,
    ) -> anyhow::Result<BoxStream<Bytes, anyhow::Error>> {
        let credentials = aws_credential_types::Credentials::new(
            request.credentials.access_key_id(),
            request.credentials.secret_access_key(),
            None,
            None,
            "static",
        );
        let config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(request.region.clone()))
            .credentials_provider(credentials)
            .http_client(HyperClientBuilder::new().build_https())
            .retry_config(RetryConfig::disabled())
            .build();
        let client = Client::from_conf(config);

        let body =
            serde_json::to_vec(&request.body).context("Failed to serialize the request body")?;

        debug!(model_id = %request.model_id, region = %request.region, "Opening Bedrock response stream");
        let output = client
            .invoke_model_with_response_stream()
            .model_id(request.model_id.as_str())
            .content_type(&request.content_type)
            .accept(&request.accept)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_send_error)?;

        let stream = futures::stream::unfold(
            (output.body, token),
            |(mut events, token)| async move {
                loop {
                    if token.is_cancelled() {
                        return None;
                    }
                    match events.recv().await {
                        Ok(Some(ResponseStream::Chunk(part))) => {
                            let payload = part
                                .bytes
                                .map(|blob| Bytes::from(blob.into_inner()))
                                .unwrap_or_default();
                            return Some((Ok(payload), (events, token)));
                        }
                        // Event kinds added to the union later carry no payload.
                        Ok(Some(_)) => continue,
                        Ok(None) => return None,
                        Err(stream_error) => {
                            return Some((Err(map_stream_error(stream_error)), (events, token)));
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

fn is_retryable_invoke_error(error: &InvokeModelWithResponseStreamError) -> bool {
    matches!(
        error,
        InvokeModelWithResponseStreamError::ThrottlingException(_)
            | InvokeModelWithResponseStreamError::ServiceUnavailableException(_)
            | InvokeModelWithResponseStreamError::InternalServerException(_)
            | InvokeModelWithResponseStreamError::ModelStreamErrorException(_)
            | InvokeModelWithResponseStreamError::ModelNotReadyException(_)
            | InvokeModelWithResponseStreamError::ModelTimeoutException(_)
    )
}

fn is_retryable_stream_error(error: &ResponseStreamError) -> bool {
    matches!(
        error,
        ResponseStreamError::ThrottlingException(_)
            | ResponseStreamError::InternalServerException(_)
            | ResponseStreamError::ModelStreamErrorException(_)
            | ResponseStreamError::ModelTimeoutException(_)
    )
}

/// Network/timeout failures without a service response.
fn is_retryable_sdk_error<E, R>(error: &SdkError<E, R>) -> bool {
    matches!(
        error,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
    )
}

/// Keeps the typed SDK error in the chain so the classifier and inspector
/// can downcast it, and marks retryable shapes with [`Error::Retryable`].
fn map_send_error(sdk_error: InvokeError) -> anyhow::Error {
    let retryable = match &sdk_error {
        SdkError::ServiceError(service_error) => is_retryable_invoke_error(service_error.err()),
        _ => is_retryable_sdk_error(&sdk_error),
    };
    let error = anyhow::Error::new(sdk_error).context("Bedrock invocation failed");
    if retryable {
        anyhow::Error::new(Error::Retryable(error))
    } else {
        error
    }
}

fn map_stream_error(sdk_error: MidStreamError) -> anyhow::Error {
    let retryable = match &sdk_error {
        SdkError::ServiceError(service_error) => is_retryable_stream_error(service_error.err()),
        _ => is_retryable_sdk_error(&sdk_error),
    };
    let error = anyhow::Error::new(sdk_error).context("Bedrock stream failed mid-response");
    if retryable {
        anyhow::Error::new(Error::Retryable(error))
    } else {
        error
    }
}
