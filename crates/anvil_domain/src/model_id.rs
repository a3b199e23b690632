use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// Bedrock model identifier, e.g. `anthropic.claude-sonnet-4-20250514-v1:0`.
///
/// The identifier may carry a regional prefix (`us.`, `eu.`, `apac.`) and a
/// capacity suffix (`:200k`); normalization and prefixing are handled by the
/// engine, this type is just the value.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Hash, Eq, Display)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        ModelId(value)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        ModelId(value.to_string())
    }
}

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
