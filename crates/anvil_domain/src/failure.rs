use std::collections::BTreeMap;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Which side of the wire a failure is attributed to.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FaultSide {
    Client,
    Server,
}

/// Canonical view of a raised failure, extracted from the error chain.
///
/// `code` falls back to `UnknownError` when the chain carries no AWS error
/// code at all (pure transport failures, local serialization bugs).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Setters)]
#[setters(strip_option, into)]
pub struct ParsedFailure {
    pub code: String,
    pub message: String,
    pub http_status: Option<u16>,
    pub request_id: Option<String>,
    pub retryable: bool,
    pub rate_limited: bool,
    pub fault: Option<FaultSide>,
    pub service: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl ParsedFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            http_status: None,
            request_id: None,
            retryable: false,
            rate_limited: false,
            fault: None,
            service: None,
            metadata: BTreeMap::new(),
        }
    }
}
