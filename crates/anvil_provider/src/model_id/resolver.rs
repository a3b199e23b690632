use anvil_domain::ModelId;
use tracing::debug;

use crate::model_id::normalizer;

/// Applies the cross-region inference profile prefix to a model id.
///
/// The profile-requirement decision is an input: callers establish it via a
/// deployment lookup and pass it down, so this stays a pure rewrite.
/// Already-prefixed ids pass through untouched regardless of the flag.
pub fn resolve(model_id: &ModelId, region: &str, requires_profile: bool) -> ModelId {
    let normalized = normalizer::normalize(model_id);

    if normalizer::has_regional_prefix(&normalized) {
        debug!(model_id = %normalized, "Model id already carries a regional prefix");
        return normalized;
    }

    if !requires_profile {
        return normalized;
    }

    let prefix = normalizer::region_prefix(region);
    let resolved = ModelId::new(format!("{prefix}.{normalized}"));
    debug!(model_id = %normalized, resolved = %resolved, region, "Applied inference profile prefix");
    resolved
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_prefixes_when_required() {
        let fixture = ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0");

        let actual = resolve(&fixture, "us-east-1", true);
        let expected = ModelId::new("us.anthropic.claude-sonnet-4-20250514-v1:0");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_resolve_keeps_id_when_not_required() {
        let fixture = ModelId::new("amazon.nova-lite-v1:0");

        let actual = resolve(&fixture, "us-east-1", false);
        let expected = ModelId::new("amazon.nova-lite-v1:0");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_resolve_is_idempotent_on_prefixed_ids() {
        let fixture = ModelId::new("eu.anthropic.claude-sonnet-4-20250514-v1:0");

        let actual = resolve(&fixture, "eu-west-1", true);

        assert_eq!(actual, fixture);
    }

    #[test]
    fn test_resolve_normalizes_before_prefixing() {
        let fixture = ModelId::new("amazon.nova-2-lite-v1:0:256k");

        let actual = resolve(&fixture, "ap-southeast-2", true);
        let expected = ModelId::new("apac.amazon.nova-2-lite-v1:0");

        assert_eq!(actual, expected);
    }
}
