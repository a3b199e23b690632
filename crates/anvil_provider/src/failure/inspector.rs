use anvil_domain::{Error, FaultSide, ParsedFailure};
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::RequestId;
use aws_sdk_bedrockruntime::operation::invoke_model_with_response_stream::InvokeModelWithResponseStreamError;
use aws_sdk_bedrockruntime::types::error::ResponseStreamError;

use crate::failure::rate_limit;

const SERVICE_NAME: &str = "bedrockruntime";

/// Collapses whatever is in the error chain into one [`ParsedFailure`].
///
/// This is the single place that understands the SDK's error shapes; the
/// orchestrator and its logs only ever see the canonical form.
pub fn parse(error: &anyhow::Error) -> ParsedFailure {
    let message = format!("{error:#}");
    let http_status = rate_limit::http_status(error);
    let rate_limited = rate_limit::is_rate_limit(error);
    let fault = exception_fault(error).or_else(|| http_status.and_then(status_fault));
    let retryable = rate_limited || fault == Some(FaultSide::Server) || has_retryable_marker(error);

    let mut failure = ParsedFailure::new(error_code(error), message)
        .retryable(retryable)
        .rate_limited(rate_limited);
    if let Some(status) = http_status {
        failure = failure.http_status(status);
    }
    if let Some(request_id) = request_id(error) {
        failure = failure.request_id(request_id);
    }
    if let Some(fault) = fault {
        failure = failure.fault(fault);
    }
    if let Some(kind) = sdk_error_kind(error) {
        failure = failure.service(SERVICE_NAME);
        failure.metadata.insert("sdk_error_kind".to_string(), kind.to_string());
    }
    failure
}

/// Error code, best first: SDK error metadata, then the service error
/// variant name, then the SDK failure kind, then `UnknownError`.
fn error_code(error: &anyhow::Error) -> String {
    if let Some(sdk_error) = rate_limit::find_invoke_error(error) {
        if let Some(code) = sdk_error.meta().code() {
            return code.to_string();
        }
        if let SdkError::ServiceError(service_error) = sdk_error {
            return invoke_variant_name(service_error.err()).to_string();
        }
        if let Some(kind) = sdk_error_kind(error) {
            return kind.to_string();
        }
    }
    if let Some(sdk_error) = rate_limit::find_mid_stream_error(error) {
        if let Some(code) = sdk_error.meta().code() {
            return code.to_string();
        }
        if let SdkError::ServiceError(service_error) = sdk_error {
            return stream_variant_name(service_error.err()).to_string();
        }
        if let Some(kind) = sdk_error_kind(error) {
            return kind.to_string();
        }
    }
    "UnknownError".to_string()
}

/// Request id of the initial call. Mid-stream errors wrap a raw event
/// message, which carries no response headers to take an id from.
fn request_id(error: &anyhow::Error) -> Option<String> {
    rate_limit::find_invoke_error(error)
        .and_then(|sdk_error| sdk_error.request_id())
        .map(str::to_string)
}

/// Fault side by exception class. Variants the SDK may add later fall
/// through to the HTTP-status classification.
fn exception_fault(error: &anyhow::Error) -> Option<FaultSide> {
    if let Some(SdkError::ServiceError(service_error)) = rate_limit::find_invoke_error(error) {
        return match service_error.err() {
            InvokeModelWithResponseStreamError::InternalServerException(_)
            | InvokeModelWithResponseStreamError::ServiceUnavailableException(_)
            | InvokeModelWithResponseStreamError::ModelTimeoutException(_)
            | InvokeModelWithResponseStreamError::ModelStreamErrorException(_)
            | InvokeModelWithResponseStreamError::ModelNotReadyException(_) => {
                Some(FaultSide::Server)
            }
            InvokeModelWithResponseStreamError::AccessDeniedException(_)
            | InvokeModelWithResponseStreamError::ResourceNotFoundException(_)
            | InvokeModelWithResponseStreamError::ValidationException(_)
            | InvokeModelWithResponseStreamError::ThrottlingException(_)
            | InvokeModelWithResponseStreamError::ServiceQuotaExceededException(_)
            | InvokeModelWithResponseStreamError::ModelErrorException(_) => {
                Some(FaultSide::Client)
            }
            _ => None,
        };
    }
    if let Some(SdkError::ServiceError(service_error)) = rate_limit::find_mid_stream_error(error) {
        return match service_error.err() {
            ResponseStreamError::InternalServerException(_)
            | ResponseStreamError::ModelTimeoutException(_)
            | ResponseStreamError::ModelStreamErrorException(_) => Some(FaultSide::Server),
            ResponseStreamError::ThrottlingException(_)
            | ResponseStreamError::ValidationException(_) => Some(FaultSide::Client),
            _ => None,
        };
    }
    None
}

fn status_fault(status: u16) -> Option<FaultSide> {
    match status {
        400..=499 => Some(FaultSide::Client),
        500..=599 => Some(FaultSide::Server),
        _ => None,
    }
}

/// Whether the transport already marked this failure as retryable.
fn has_retryable_marker(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::Retryable(_))))
}

fn sdk_error_kind(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(sdk_error) = rate_limit::find_invoke_error(error) {
        return Some(sdk_kind_name(sdk_error));
    }
    rate_limit::find_mid_stream_error(error).map(|sdk_error| sdk_kind_name(sdk_error))
}

fn sdk_kind_name<E, R>(sdk_error: &SdkError<E, R>) -> &'static str {
    match sdk_error {
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ServiceError(_) => "ServiceError",
        _ => "UnknownSdkError",
    }
}

fn invoke_variant_name(error: &InvokeModelWithResponseStreamError) -> &'static str {
    match error {
        InvokeModelWithResponseStreamError::AccessDeniedException(_) => "AccessDeniedException",
        InvokeModelWithResponseStreamError::InternalServerException(_) => {
            "InternalServerException"
        }
        InvokeModelWithResponseStreamError::ModelErrorException(_) => "ModelErrorException",
        InvokeModelWithResponseStreamError::ModelNotReadyException(_) => "ModelNotReadyException",
        InvokeModelWithResponseStreamError::ModelStreamErrorException(_) => {
            "ModelStreamErrorException"
        }
        InvokeModelWithResponseStreamError::ModelTimeoutException(_) => "ModelTimeoutException",
        InvokeModelWithResponseStreamError::ResourceNotFoundException(_) => {
            "ResourceNotFoundException"
        }
        InvokeModelWithResponseStreamError::ServiceQuotaExceededException(_) => {
            "ServiceQuotaExceededException"
        }
        InvokeModelWithResponseStreamError::ServiceUnavailableException(_) => {
            "ServiceUnavailableException"
        }
        InvokeModelWithResponseStreamError::ThrottlingException(_) => "ThrottlingException",
        InvokeModelWithResponseStreamError::ValidationException(_) => "ValidationException",
        _ => "UnknownError",
    }
}

fn stream_variant_name(error: &ResponseStreamError) -> &'static str {
    match error {
        ResponseStreamError::InternalServerException(_) => "InternalServerException",
        ResponseStreamError::ModelStreamErrorException(_) => "ModelStreamErrorException",
        ResponseStreamError::ModelTimeoutException(_) => "ModelTimeoutException",
        ResponseStreamError::ThrottlingException(_) => "ThrottlingException",
        ResponseStreamError::ValidationException(_) => "ValidationException",
        _ => "UnknownError",
    }
}
