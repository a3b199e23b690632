use anvil_domain::{AdapterEvent, FormattedRequest, InferenceParams, Message, ModelAdapter, ModelId};
use serde_json::{Value, json};

use crate::adapters::wire_number;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Claude models on Bedrock, using the Anthropic messages wire format.
#[derive(Debug, Default)]
pub struct AnthropicAdapter;

impl ModelAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn patterns(&self) -> &[&str] {
        &["anthropic.*"]
    }

    fn format_request(
        &self,
        _model_id: &ModelId,
        messages: &[Message],
        params: &InferenceParams,
    ) -> FormattedRequest {
        // System messages travel in a dedicated top-level field, not in the
        // message list.
        let system = messages
            .iter()
            .filter(|message| message.is_system())
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let chat: Vec<Value> = messages
            .iter()
            .filter(|message| !message.is_system())
            .map(|message| {
                json!({
                    "role": match message.role {
                        anvil_domain::Role::Assistant => "assistant",
                        _ => "user",
                    },
                    "content": message.content,
                })
            })
            .collect();

        let mut body = json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": chat,
            "temperature": params.temperature.map(wire_number).unwrap_or(DEFAULT_TEMPERATURE),
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }
        if let Some(top_k) = params.top_k {
            body["top_k"] = json!(top_k);
        }
        if let Some(stop_sequences) = params.stop_sequences.as_ref() {
            body["stop_sequences"] = json!(stop_sequences);
        }

        FormattedRequest::new(body)
    }

    fn parse_event(&self, event: &Value) -> AdapterEvent {
        match event.get("type").and_then(Value::as_str) {
            Some("content_block_delta") => {
                match event
                    .pointer("/delta/text")
                    .and_then(Value::as_str)
                {
                    Some(text) => AdapterEvent::Content(text.to_string()),
                    None => AdapterEvent::Ignored,
                }
            }
            Some("message_stop") => AdapterEvent::Done,
            Some("error") => AdapterEvent::Error(error_message(event)),
            _ => {
                if event.get("error").is_some() {
                    AdapterEvent::Error(error_message(event))
                } else {
                    AdapterEvent::Ignored
                }
            }
        }
    }
}

fn error_message(event: &Value) -> String {
    event
        .pointer("/error/message")
        .or_else(|| event.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown error event from model stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fixture() -> AnthropicAdapter {
        AnthropicAdapter
    }

    fn fixture_model() -> ModelId {
        ModelId::new("anthropic.claude-sonnet-4-20250514-v1:0")
    }

    #[test]
    fn test_supports_claude_family_only() {
        assert!(fixture().supports(&fixture_model()));
        assert!(!fixture().supports(&ModelId::new("amazon.nova-pro-v1:0")));
    }

    #[test]
    fn test_format_request_separates_system_message() {
        let messages = vec![
            Message::system("You are terse."),
            Message::user("Hello"),
            Message::assistant("Hi"),
        ];

        let actual = fixture()
            .format_request(&fixture_model(), &messages, &InferenceParams::default())
            .body;
        let expected = json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": 4096,
            "messages": [
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi"},
            ],
            "temperature": 1.0,
            "system": "You are terse.",
        });

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_format_request_forwards_optional_params() {
        let params = InferenceParams::default()
            .max_tokens(512u32)
            .top_k(40u32)
            .stop_sequences(vec!["END".to_string()]);

        let actual = fixture()
            .format_request(&fixture_model(), &[Message::user("hi")], &params)
            .body;

        assert_eq!(actual["max_tokens"], json!(512));
        assert_eq!(actual["top_k"], json!(40));
        assert_eq!(actual["stop_sequences"], json!(["END"]));
    }

    #[test]
    fn test_format_request_keeps_decimal_temperature_exact() {
        let params = InferenceParams::default().temperature(0.3f32);

        let actual = fixture()
            .format_request(&fixture_model(), &[Message::user("hi")], &params)
            .body;

        assert_eq!(actual["temperature"], json!(0.3));
    }

    #[test]
    fn test_parse_content_delta() {
        let event = json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "Hel"}});

        let actual = fixture().parse_event(&event);
        let expected = AdapterEvent::Content("Hel".to_string());

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parse_message_stop_is_done() {
        let event = json!({"type": "message_stop"});

        assert_eq!(fixture().parse_event(&event), AdapterEvent::Done);
    }

    #[test]
    fn test_parse_housekeeping_events_are_ignored() {
        for event in [
            json!({"type": "message_start", "message": {}}),
            json!({"type": "content_block_start", "index": 0}),
            json!({"type": "ping"}),
        ] {
            assert_eq!(fixture().parse_event(&event), AdapterEvent::Ignored);
        }
    }

    #[test]
    fn test_parse_error_event() {
        let event = json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}});

        let actual = fixture().parse_event(&event);
        let expected = AdapterEvent::Error("Overloaded".to_string());

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parse_untyped_error_object() {
        let event = json!({"error": {"message": "throttled mid-stream"}});

        let actual = fixture().parse_event(&event);
        let expected = AdapterEvent::Error("throttled mid-stream".to_string());

        assert_eq!(actual, expected);
    }
}
