use std::collections::HashMap;

use async_trait::async_trait;

use crate::ModelId;

/// Answers whether a model can only be invoked through a cross-region
/// inference profile in the given region.
///
/// Lookup failures are not fatal: callers fall back to `false` and let the
/// plain identifier be attempted first.
#[async_trait]
pub trait DeploymentLookup: Send + Sync {
    async fn requires_inference_profile(
        &self,
        model_id: &ModelId,
        region: &str,
    ) -> anyhow::Result<bool>;
}

/// In-memory [`DeploymentLookup`] over an explicit map of normalized model
/// ids. Absence of a record means "not required".
#[derive(Debug, Default)]
pub struct StaticProfileRequirements {
    requirements: HashMap<ModelId, bool>,
}

impl StaticProfileRequirements {
    pub fn new<I, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (M, bool)>,
        M: Into<ModelId>,
    {
        Self {
            requirements: entries
                .into_iter()
                .map(|(model_id, required)| (model_id.into(), required))
                .collect(),
        }
    }
}

#[async_trait]
impl DeploymentLookup for StaticProfileRequirements {
    async fn requires_inference_profile(
        &self,
        model_id: &ModelId,
        _region: &str,
    ) -> anyhow::Result<bool> {
        Ok(self.requirements.get(model_id).copied().unwrap_or(false))
    }
}
