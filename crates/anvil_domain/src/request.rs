use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use crate::{Message, ModelId};

/// Sampling controls forwarded to the format adapter. Unset fields fall back
/// to per-family defaults inside the adapter.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Setters)]
#[setters(strip_option, into)]
pub struct InferenceParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
}

/// Everything needed to run one streaming invocation.
///
/// `credentials` is the joined `ACCESS_KEY:SECRET_KEY` form; it is validated
/// and split at invocation time, so a malformed value surfaces as a terminal
/// error chunk rather than a construction failure.
#[derive(Clone, Debug, Setters)]
#[setters(strip_option, into)]
pub struct InvocationRequest {
    pub model_id: ModelId,
    pub messages: Vec<Message>,
    pub params: InferenceParams,
    pub region: String,
    pub credentials: String,
}

impl InvocationRequest {
    pub fn new(
        model_id: impl Into<ModelId>,
        region: impl Into<String>,
        credentials: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            messages: Vec::new(),
            params: InferenceParams::default(),
            region: region.into(),
            credentials: credentials.into(),
        }
    }
}
