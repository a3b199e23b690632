use anvil_domain::{ModelId, ModelIdVariation, VariationKind};
use tracing::{debug, info};

use crate::model_id::{normalizer, resolver};

/// Builds the ordered candidate list for one invocation.
///
/// When the profile requirement is established, exploration is pointless and
/// the profile form is the only candidate. Otherwise the list is
/// speculative: profile-prefixed first, then the normalized id, then the
/// legacy `nova-` rewrite for ids that carry the `nova-2-` generation
/// marker.
pub fn generate(
    model_id: &ModelId,
    must_use_profile: bool,
    region: &str,
) -> Vec<ModelIdVariation> {
    let normalized = normalizer::normalize(model_id);
    let with_profile = resolver::resolve(&normalized, region, true);

    if must_use_profile {
        info!(model_id = %model_id, resolved = %with_profile, "Model requires an inference profile");
        return vec![ModelIdVariation::new(
            with_profile,
            VariationKind::InferenceProfile,
            1,
            "System-defined inference profile (required)",
        )];
    }

    let mut variations = vec![ModelIdVariation::new(
        with_profile.clone(),
        VariationKind::InferenceProfile,
        1,
        "With inference profile prefix",
    )];

    if normalized != with_profile {
        variations.push(ModelIdVariation::new(
            normalized.clone(),
            VariationKind::Normalized,
            2,
            "Normalized without suffix",
        ));
    }

    if normalized.as_str().contains("nova-2-") {
        let legacy = normalized.as_str().replacen("nova-2-", "nova-", 1);
        variations.push(ModelIdVariation::new(
            legacy,
            VariationKind::Legacy,
            3,
            "Legacy format without \"2\"",
        ));
    }

    info!(model_id = %model_id, count = variations.len(), "Generated model id variations");
    debug!(
        variations = ?variations.iter().map(|v| v.model_id.as_str()).collect::<Vec<_>>(),
        "Variation candidates"
    );

    variations
}

/// First variation of [`generate`]; the list is never empty.
pub fn generate_primary(
    model_id: &ModelId,
    must_use_profile: bool,
    region: &str,
) -> ModelIdVariation {
    generate(model_id, must_use_profile, region).remove(0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_required_profile_yields_single_variation() {
        let fixture = ModelId::new("anthropic.claude-3-5-sonnet-20241022-v2:0");

        let actual = generate(&fixture, true, "us-east-1");
        let expected = vec![ModelIdVariation::new(
            "us.anthropic.claude-3-5-sonnet-20241022-v2:0",
            VariationKind::InferenceProfile,
            1,
            "System-defined inference profile (required)",
        )];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_on_demand_nova_yields_three_variations() {
        let fixture = ModelId::new("amazon.nova-2-lite-v1:0");

        let actual = generate(&fixture, false, "us-east-1");
        let expected = vec![
            ModelIdVariation::new(
                "us.amazon.nova-2-lite-v1:0",
                VariationKind::InferenceProfile,
                1,
                "With inference profile prefix",
            ),
            ModelIdVariation::new(
                "amazon.nova-2-lite-v1:0",
                VariationKind::Normalized,
                2,
                "Normalized without suffix",
            ),
            ModelIdVariation::new(
                "amazon.nova-lite-v1:0",
                VariationKind::Legacy,
                3,
                "Legacy format without \"2\"",
            ),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_suffix_is_stripped_before_expansion() {
        let fixture = ModelId::new("amazon.nova-2-lite-v1:0:256k");

        let actual = generate(&fixture, false, "us-east-1");

        assert_eq!(actual[0].model_id, ModelId::new("us.amazon.nova-2-lite-v1:0"));
        assert_eq!(actual[1].model_id, ModelId::new("amazon.nova-2-lite-v1:0"));
        assert_eq!(actual[2].model_id, ModelId::new("amazon.nova-lite-v1:0"));
    }

    #[test]
    fn test_already_prefixed_id_skips_normalized_duplicate() {
        let fixture = ModelId::new("us.amazon.nova-2-pro-v1:0");

        let actual = generate(&fixture, false, "us-east-1");

        // The prefixed form equals the normalized form, so only the profile
        // and legacy candidates remain, keeping their fixed priorities.
        assert_eq!(actual.len(), 2);
        assert_eq!(actual[0].model_id, ModelId::new("us.amazon.nova-2-pro-v1:0"));
        assert_eq!(actual[0].priority, 1);
        assert_eq!(actual[1].model_id, ModelId::new("us.amazon.nova-pro-v1:0"));
        assert_eq!(actual[1].priority, 3);
    }

    #[test]
    fn test_legacy_variation_absent_without_marker() {
        let fixture = ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0");

        let actual = generate(&fixture, false, "eu-west-1");

        assert_eq!(actual.len(), 2);
        assert!(actual.iter().all(|v| v.kind != VariationKind::Legacy));
    }

    #[test]
    fn test_priorities_strictly_increase() {
        let fixture = ModelId::new("amazon.nova-2-micro-v1:0");

        let actual = generate(&fixture, false, "us-east-1");

        let priorities: Vec<u8> = actual.iter().map(|v| v.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(priorities, sorted);
        assert_eq!(priorities[0], 1);
    }

    #[test]
    fn test_generate_primary_returns_first() {
        let fixture = ModelId::new("amazon.nova-2-lite-v1:0");

        let actual = generate_primary(&fixture, false, "us-east-1");

        assert_eq!(actual.model_id, ModelId::new("us.amazon.nova-2-lite-v1:0"));
        assert_eq!(actual.priority, 1);
    }
}
