use anvil_domain::ModelId;
use tracing::{debug, warn};

/// Capacity suffixes that some catalogs append to a model id but the API
/// does not accept. Matched case-insensitively at the end of the id.
const KNOWN_SUFFIXES: &[&str] = &[":8k", ":20k", ":24k", ":128k", ":256k", ":300k", ":1000k", ":mm"];

const REGIONAL_PREFIXES: &[&str] = &["us.", "eu.", "apac."];

pub fn known_suffixes() -> &'static [&'static str] {
    KNOWN_SUFFIXES
}

/// Returns the trailing capacity suffix as written in the input, if any.
pub fn extract_suffix(model_id: &ModelId) -> Option<&str> {
    let id = model_id.as_str();
    KNOWN_SUFFIXES.iter().find_map(|suffix| {
        let split = id.len().checked_sub(suffix.len())?;
        let tail = id.get(split..)?;
        tail.eq_ignore_ascii_case(suffix).then_some(tail)
    })
}

pub fn has_suffix(model_id: &ModelId) -> bool {
    extract_suffix(model_id).is_some()
}

/// Strips at most one known capacity suffix. Idempotent, and ids without a
/// known suffix pass through untouched.
pub fn normalize(model_id: &ModelId) -> ModelId {
    match extract_suffix(model_id) {
        Some(suffix) => {
            let id = model_id.as_str();
            let normalized = &id[..id.len() - suffix.len()];
            debug!(model_id = %model_id, normalized, "Removed capacity suffix from model id");
            ModelId::new(normalized)
        }
        None => model_id.clone(),
    }
}

pub fn has_regional_prefix(model_id: &ModelId) -> bool {
    REGIONAL_PREFIXES
        .iter()
        .any(|prefix| model_id.as_str().starts_with(prefix))
}

/// Removes one leading `us.` / `eu.` / `apac.` prefix, if present.
pub fn strip_prefix(model_id: &ModelId) -> ModelId {
    REGIONAL_PREFIXES
        .iter()
        .find_map(|prefix| model_id.as_str().strip_prefix(prefix))
        .map(ModelId::new)
        .unwrap_or_else(|| model_id.clone())
}

/// Maps an AWS region to the prefix class used by cross-region inference
/// profiles. Unrecognized regions fall back to `us`.
pub fn region_prefix(region: &str) -> &'static str {
    if region.starts_with("ap-") {
        return "apac";
    }
    match region.split('-').next() {
        Some("us") => "us",
        Some("eu") => "eu",
        _ => {
            warn!(region, "Unrecognized region format, defaulting to us prefix");
            "us"
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize_strips_known_suffix() {
        let fixture = ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0:200k");

        // :200k is not a known suffix, so nothing is removed.
        let actual = normalize(&fixture);
        let expected = ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0:200k");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_normalize_removes_each_known_suffix() {
        for suffix in known_suffixes() {
            let fixture = ModelId::new(format!("amazon.nova-2-lite-v1:0{suffix}"));

            let actual = normalize(&fixture);
            let expected = ModelId::new("amazon.nova-2-lite-v1:0");

            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_normalize_is_case_insensitive_on_suffix() {
        let fixture = ModelId::new("amazon.nova-2-pro-v1:0:128K");

        let actual = normalize(&fixture);
        let expected = ModelId::new("amazon.nova-2-pro-v1:0");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let fixture = ModelId::new("amazon.nova-2-lite-v1:0:256k:256k");

        let once = normalize(&fixture);
        let twice = normalize(&once);

        // Only one suffix is removed per pass.
        assert_eq!(once, ModelId::new("amazon.nova-2-lite-v1:0:256k"));
        assert_eq!(twice, ModelId::new("amazon.nova-2-lite-v1:0"));
    }

    #[test]
    fn test_extract_suffix_preserves_input_case() {
        let fixture = ModelId::new("amazon.nova-2-pro-v1:0:MM");

        let actual = extract_suffix(&fixture);
        let expected = Some(":MM");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_extract_suffix_ignores_version_colon() {
        let fixture = ModelId::new("anthropic.claude-3-haiku-20240307-v1:0");

        assert_eq!(extract_suffix(&fixture), None);
        assert!(!has_suffix(&fixture));
    }

    #[test]
    fn test_regional_prefix_detection() {
        assert!(has_regional_prefix(&ModelId::new("us.anthropic.claude-sonnet-4")));
        assert!(has_regional_prefix(&ModelId::new("eu.amazon.nova-lite-v1:0")));
        assert!(has_regional_prefix(&ModelId::new("apac.amazon.nova-lite-v1:0")));
        assert!(!has_regional_prefix(&ModelId::new("anthropic.claude-sonnet-4")));
    }

    #[test]
    fn test_strip_prefix_removes_one_prefix() {
        let fixture = ModelId::new("apac.anthropic.claude-sonnet-4");

        let actual = strip_prefix(&fixture);
        let expected = ModelId::new("anthropic.claude-sonnet-4");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_strip_prefix_passes_through_bare_ids() {
        let fixture = ModelId::new("anthropic.claude-sonnet-4");

        let actual = strip_prefix(&fixture);

        assert_eq!(actual, fixture);
    }

    #[test]
    fn test_region_prefix_classes() {
        assert_eq!(region_prefix("us-east-1"), "us");
        assert_eq!(region_prefix("us-gov-west-1"), "us");
        assert_eq!(region_prefix("eu-west-1"), "eu");
        assert_eq!(region_prefix("ap-southeast-2"), "apac");
        assert_eq!(region_prefix("sa-east-1"), "us");
        assert_eq!(region_prefix(""), "us");
    }
}
