use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::ModelId;

/// Which rewrite produced a candidate identifier.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariationKind {
    InferenceProfile,
    Normalized,
    Legacy,
}

/// One candidate identifier to try against the API, in priority order.
///
/// Lower priority runs first. The note explains which rewrite produced the
/// candidate and surfaces in logs when a fallback succeeds.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModelIdVariation {
    pub model_id: ModelId,
    pub kind: VariationKind,
    pub priority: u8,
    pub note: String,
}

impl ModelIdVariation {
    pub fn new(
        model_id: impl Into<ModelId>,
        kind: VariationKind,
        priority: u8,
        note: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            kind,
            priority,
            note: note.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.model_id.as_str().is_empty() && self.priority >= 1
    }
}
