use anvil_domain::{
    AdapterEvent, FormattedRequest, InferenceParams, Message, ModelAdapter, ModelId, Role,
};
use serde_json::{Value, json};
use tracing::warn;

use crate::adapters::wire_number;

const NOVA_DEFAULT_MAX_TOKENS: u32 = 2048;
const NOVA_DEFAULT_TEMPERATURE: f64 = 0.7;
const NOVA_DEFAULT_TOP_P: f64 = 0.9;

/// Amazon first-party models on Bedrock. Nova uses a messages body, Titan a
/// flat prompt; unknown Amazon ids get the Nova shape.
#[derive(Debug, Default)]
pub struct AmazonAdapter;

impl ModelAdapter for AmazonAdapter {
    fn name(&self) -> &str {
        "amazon"
    }

    fn patterns(&self) -> &[&str] {
        &["amazon.*"]
    }

    fn format_request(
        &self,
        model_id: &ModelId,
        messages: &[Message],
        params: &InferenceParams,
    ) -> FormattedRequest {
        let id = model_id.as_str();
        if id.contains("titan") {
            return FormattedRequest::new(titan_body(messages, params));
        }
        if !id.contains("nova") {
            warn!(model_id = %model_id, "Unknown Amazon model, assuming the Nova wire format");
        }
        FormattedRequest::new(nova_body(messages, params))
    }

    fn parse_event(&self, event: &Value) -> AdapterEvent {
        if let Some(error) = event.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error event from model stream");
            return AdapterEvent::Error(message.to_string());
        }
        // Nova delta events.
        if let Some(text) = event
            .pointer("/contentBlockDelta/delta/text")
            .and_then(Value::as_str)
        {
            return AdapterEvent::Content(text.to_string());
        }
        // Titan chunks carry the text directly.
        if let Some(text) = event.get("outputText").and_then(Value::as_str) {
            return AdapterEvent::Content(text.to_string());
        }
        if event.get("messageStop").is_some() || event.get("completionReason").is_some() {
            return AdapterEvent::Done;
        }
        AdapterEvent::Ignored
    }
}

fn nova_body(messages: &[Message], params: &InferenceParams) -> Value {
    let system: Vec<Value> = messages
        .iter()
        .filter(|message| message.is_system())
        .map(|message| json!({"text": message.content}))
        .collect();

    let chat: Vec<Value> = messages
        .iter()
        .filter(|message| !message.is_system())
        .map(|message| {
            json!({
                "role": match message.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                },
                "content": [{"text": message.content}],
            })
        })
        .collect();

    let mut inference_config = json!({
        "maxTokens": params.max_tokens.unwrap_or(NOVA_DEFAULT_MAX_TOKENS),
        "temperature": params.temperature.map(wire_number).unwrap_or(NOVA_DEFAULT_TEMPERATURE),
        "topP": params.top_p.map(wire_number).unwrap_or(NOVA_DEFAULT_TOP_P),
    });
    if let Some(stop_sequences) = params.stop_sequences.as_ref() {
        inference_config["stopSequences"] = json!(stop_sequences);
    }

    let mut body = json!({
        "messages": chat,
        "inferenceConfig": inference_config,
    });
    if !system.is_empty() {
        body["system"] = json!(system);
    }
    body
}

fn titan_body(messages: &[Message], params: &InferenceParams) -> Value {
    let input_text = messages
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::System => "System",
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{role}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut config = json!({
        "maxTokenCount": params.max_tokens.unwrap_or(NOVA_DEFAULT_MAX_TOKENS),
        "temperature": params.temperature.map(wire_number).unwrap_or(NOVA_DEFAULT_TEMPERATURE),
        "topP": params.top_p.map(wire_number).unwrap_or(NOVA_DEFAULT_TOP_P),
    });
    if let Some(stop_sequences) = params.stop_sequences.as_ref() {
        config["stopSequences"] = json!(stop_sequences);
    }

    json!({
        "inputText": input_text,
        "textGenerationConfig": config,
    })
}
