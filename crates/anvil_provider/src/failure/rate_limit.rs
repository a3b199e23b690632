use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::invoke_model_with_response_stream::InvokeModelWithResponseStreamError;
use aws_sdk_bedrockruntime::types::error::ResponseStreamError;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_types::event_stream::RawMessage;

/// SDK error raised when opening the response stream.
pub type InvokeError = SdkError<InvokeModelWithResponseStreamError, HttpResponse>;

/// SDK error raised while receiving events from an open stream.
pub type MidStreamError = SdkError<ResponseStreamError, RawMessage>;

/// Messages Bedrock uses for throttling conditions that surface without a
/// typed exception, e.g. relayed through a model error or a gateway.
const RATE_LIMIT_KEYWORDS: &[&str] = &[
    "too many tokens",
    "rate limit",
    "throttling",
    "quota exceeded",
    "too many requests",
    "request limit",
    "throttled",
    "rate exceeded",
];

pub fn keywords() -> &'static [&'static str] {
    RATE_LIMIT_KEYWORDS
}

/// Whether a failure is a throttling condition worth retrying in place.
///
/// Checks the typed throttling exceptions first, then the raw HTTP status,
/// and finally scans the rendered error chain for the keyword set.
pub fn is_rate_limit(error: &anyhow::Error) -> bool {
    if is_throttling_exception(error) {
        return true;
    }
    if http_status(error) == Some(429) {
        return true;
    }

    let rendered = format!("{error:#}").to_lowercase();
    RATE_LIMIT_KEYWORDS
        .iter()
        .any(|keyword| rendered.contains(keyword))
}

fn is_throttling_exception(error: &anyhow::Error) -> bool {
    if let Some(SdkError::ServiceError(service_error)) = find_invoke_error(error) {
        return matches!(
            service_error.err(),
            InvokeModelWithResponseStreamError::ThrottlingException(_)
        );
    }
    if let Some(SdkError::ServiceError(service_error)) = find_mid_stream_error(error) {
        return matches!(
            service_error.err(),
            ResponseStreamError::ThrottlingException(_)
        );
    }
    false
}

/// Finds the typed SDK error anywhere in the chain. The transport wraps
/// retryable failures in context and a retryable marker, and `downcast_ref`
/// on the top-level error alone would miss the typed value underneath.
pub(crate) fn find_invoke_error(error: &anyhow::Error) -> Option<&InvokeError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<InvokeError>())
}

pub(crate) fn find_mid_stream_error(error: &anyhow::Error) -> Option<&MidStreamError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MidStreamError>())
}

/// HTTP status of the initial call, when the chain carries one. Mid-stream
/// errors wrap a raw event-stream message, which has no status line.
pub(crate) fn http_status(error: &anyhow::Error) -> Option<u16> {
    find_invoke_error(error)
        .and_then(|sdk_error| sdk_error.raw_response())
        .map(|response| response.status().as_u16())
}
