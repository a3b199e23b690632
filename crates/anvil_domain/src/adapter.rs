use derive_setters::Setters;

use crate::{InferenceParams, Message, ModelId};

/// Outcome of parsing one decoded stream event.
///
/// `Ignored` covers housekeeping events (message starts, ping frames) that
/// carry no content and must not terminate the stream.
#[derive(Clone, Debug, PartialEq)]
pub enum AdapterEvent {
    Content(String),
    Done,
    Error(String),
    Ignored,
}

/// A family-native request body plus the HTTP media types to send it with.
#[derive(Clone, Debug, PartialEq, Setters)]
#[setters(into)]
pub struct FormattedRequest {
    pub body: serde_json::Value,
    pub content_type: String,
    pub accept: String,
}

impl FormattedRequest {
    pub fn new(body: serde_json::Value) -> Self {
        Self {
            body,
            content_type: "application/json".to_string(),
            accept: "application/json".to_string(),
        }
    }
}

/// Translates between the neutral message format and one model family's
/// native request/response wire shapes.
pub trait ModelAdapter: Send + Sync {
    /// Adapter name used in log fields.
    fn name(&self) -> &str;

    /// Model id patterns this adapter claims. `*` matches any run of
    /// characters; a pattern without `*` must match exactly.
    fn patterns(&self) -> &[&str];

    /// Builds the family-native request. The model id is the bare form,
    /// without any regional prefix; families that span several wire formats
    /// branch on it.
    fn format_request(
        &self,
        model_id: &ModelId,
        messages: &[Message],
        params: &InferenceParams,
    ) -> FormattedRequest;

    /// Interprets one decoded JSON event from the response stream.
    fn parse_event(&self, event: &serde_json::Value) -> AdapterEvent;

    /// Matches against the bare model id, without any regional prefix.
    fn supports(&self, model_id: &ModelId) -> bool {
        self.patterns()
            .iter()
            .any(|pattern| wildcard_match(pattern, model_id.as_str()))
    }
}

pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }

    let mut remainder = value;
    let mut segments = pattern.split('*').peekable();

    if let Some(first) = segments.next() {
        match remainder.strip_prefix(first) {
            Some(rest) => remainder = rest,
            None => return false,
        }
    }

    while let Some(segment) = segments.next() {
        // The segment after the final `*` anchors at the end of the value.
        if segments.peek().is_none() {
            return segment.is_empty() || remainder.ends_with(segment);
        }
        if segment.is_empty() {
            continue;
        }
        match remainder.find(segment) {
            Some(position) => remainder = &remainder[position + segment.len()..],
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exact_pattern_requires_equality() {
        assert!(wildcard_match("amazon.titan-text-express-v1", "amazon.titan-text-express-v1"));
        assert!(!wildcard_match("amazon.titan-text-express-v1", "amazon.titan-text-lite-v1"));
    }

    #[test]
    fn test_trailing_wildcard_matches_prefix() {
        assert!(wildcard_match("anthropic.claude-*", "anthropic.claude-sonnet-4-20250514-v1:0"));
        assert!(!wildcard_match("anthropic.claude-*", "amazon.nova-pro-v1:0"));
    }

    #[test]
    fn test_wildcard_spans_middle() {
        assert!(wildcard_match("amazon.*-v1:0", "amazon.nova-pro-v1:0"));
        assert!(!wildcard_match("amazon.*-v1:0", "amazon.nova-pro-v2:0"));
    }

    #[test]
    fn test_lone_wildcard_matches_everything() {
        assert!(wildcard_match("*", "anything.goes"));
    }

    #[test]
    fn test_formatted_request_defaults_to_json() {
        let fixture = FormattedRequest::new(serde_json::json!({"x": 1}));

        assert_eq!(fixture.content_type, "application/json");
        assert_eq!(fixture.accept, "application/json");
    }
}
