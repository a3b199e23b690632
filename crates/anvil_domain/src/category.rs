use std::fmt::Write;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Failure family used to pick the user-facing message and suggested actions.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Unavailable,
    PermissionError,
    AuthenticationError,
    RateLimit,
    Timeout,
    ConfigurationError,
    QualityIssue,
    NetworkError,
    UnknownError,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// A raw failure mapped to a category, with guidance the caller can show
/// directly to the user. The raw error text is preserved alongside the
/// friendly message for logs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CategorizedFailure {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub original_error: String,
    pub suggested_actions: Vec<String>,
    /// Whether retrying later without any configuration change can succeed.
    pub temporary: bool,
}

impl CategorizedFailure {
    pub fn new(
        category: ErrorCategory,
        severity: ErrorSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            original_error: String::new(),
            suggested_actions: Vec::new(),
            temporary: false,
        }
    }

    pub fn original_error(mut self, original_error: impl Into<String>) -> Self {
        self.original_error = original_error.into();
        self
    }

    pub fn suggested_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Renders the terminal message delivered in-band on the chunk stream:
    /// the friendly message followed by a numbered list of suggestions.
    pub fn to_user_message(&self) -> String {
        let mut out = self.message.clone();
        if !self.suggested_actions.is_empty() {
            out.push_str("\n\nSuggestions:");
            for (index, action) in self.suggested_actions.iter().enumerate() {
                // Writing to a String cannot fail.
                let _ = write!(out, "\n{}. {}", index + 1, action);
            }
        }
        out
    }
}

/// Maps a raw failure message to a category with user-facing guidance.
///
/// Consulted only on the terminal path, after every candidate and retry is
/// exhausted; implementations must not perform IO.
pub trait ErrorCategorizer: Send + Sync {
    fn categorize(&self, raw_error: &str) -> CategorizedFailure;
}
