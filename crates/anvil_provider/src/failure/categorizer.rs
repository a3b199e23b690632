use anvil_domain::{CategorizedFailure, ErrorCategorizer, ErrorCategory, ErrorSeverity};
use tracing::debug;

struct Rule {
    category: ErrorCategory,
    severity: ErrorSeverity,
    keywords: &'static [&'static str],
    message: &'static str,
    actions: &'static [&'static str],
    temporary: bool,
}

/// Priority-ordered rules; the first category with a keyword hit wins.
/// Order matters: an expired token mentions "token" and "denied", so
/// authentication outranks the broader permission wording, and both outrank
/// the configuration catch-alls.
const RULES: &[Rule] = &[
    Rule {
        category: ErrorCategory::Unavailable,
        severity: ErrorSeverity::High,
        keywords: &["service unavailable", "model not ready", "unavailable", "internal server"],
        message: "The model is temporarily unavailable.",
        actions: &[
            "Wait a few minutes and try again",
            "Try a different model in the same region",
            "Check the AWS service health dashboard",
        ],
        temporary: true,
    },
    Rule {
        category: ErrorCategory::AuthenticationError,
        severity: ErrorSeverity::Critical,
        keywords: &[
            "unrecognizedclient",
            "invalid signature",
            "security token",
            "signature does not match",
            "authentication",
        ],
        message: "AWS could not authenticate the provided credentials.",
        actions: &[
            "Verify the access key and secret key are correct",
            "Check that the credentials have not expired or been rotated",
        ],
        temporary: false,
    },
    Rule {
        category: ErrorCategory::PermissionError,
        severity: ErrorSeverity::Critical,
        keywords: &["access denied", "accessdenied", "not authorized", "forbidden"],
        message: "The credentials are valid but lack access to this model.",
        actions: &[
            "Request model access in the AWS Bedrock console",
            "Check the IAM policy attached to this access key",
            "Confirm the model is enabled in the selected region",
        ],
        temporary: false,
    },
    Rule {
        category: ErrorCategory::RateLimit,
        severity: ErrorSeverity::Medium,
        keywords: &[
            "throttl",
            "rate limit",
            "too many requests",
            "quota exceeded",
            "too many tokens",
            "rate exceeded",
            "request limit",
        ],
        message: "AWS Bedrock is rate limiting requests for this model.",
        actions: &[
            "Wait a minute before sending the next message",
            "Reduce the request rate or message size",
            "Request a service quota increase for this model",
        ],
        temporary: true,
    },
    Rule {
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        keywords: &["timed out", "timeout", "deadline exceeded"],
        message: "The request to AWS Bedrock timed out.",
        actions: &[
            "Try again; timeouts are usually transient",
            "Reduce max_tokens or the size of the conversation",
        ],
        temporary: true,
    },
    Rule {
        category: ErrorCategory::ConfigurationError,
        severity: ErrorSeverity::High,
        keywords: &[
            "resourcenotfound",
            "on-demand throughput",
            "inference profile",
            "invalid model",
            "model identifier",
            "is not supported",
            "validation",
        ],
        message: "The model identifier or request configuration was rejected.",
        actions: &[
            "Check the model ID against the AWS Bedrock model catalog",
            "Confirm the model is available in the selected region",
            "Verify whether the model requires an inference profile",
        ],
        temporary: false,
    },
    Rule {
        category: ErrorCategory::QualityIssue,
        severity: ErrorSeverity::Low,
        keywords: &["content filter", "guardrail", "blocked by"],
        message: "The response was blocked by a content policy.",
        actions: &[
            "Rephrase the request",
            "Review the guardrail configuration for this model",
        ],
        temporary: false,
    },
    Rule {
        category: ErrorCategory::NetworkError,
        severity: ErrorSeverity::Medium,
        keywords: &[
            "connection reset",
            "connection refused",
            "dispatch failure",
            "dns error",
            "network",
            "connection",
        ],
        message: "Could not reach AWS Bedrock.",
        actions: &[
            "Check the network connection",
            "Verify the region name is correct",
            "Try again in a few seconds",
        ],
        temporary: true,
    },
];

/// Keyword-driven [`ErrorCategorizer`] used as the orchestrator default.
#[derive(Debug, Default)]
pub struct KeywordCategorizer;

impl ErrorCategorizer for KeywordCategorizer {
    fn categorize(&self, raw_error: &str) -> CategorizedFailure {
        let haystack = raw_error.to_lowercase();
        let rule = RULES.iter().find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| haystack.contains(keyword))
        });

        match rule {
            Some(rule) => {
                debug!(category = %rule.category, "Categorized terminal failure");
                CategorizedFailure::new(rule.category, rule.severity, rule.message)
                    .original_error(raw_error)
                    .suggested_actions(rule.actions.iter().copied())
                    .temporary(rule.temporary)
            }
            None => CategorizedFailure::new(
                ErrorCategory::UnknownError,
                ErrorSeverity::Medium,
                "The request failed for an unrecognized reason.",
            )
            .original_error(raw_error)
            .suggested_actions([
                "Try again",
                "Check the application logs for the full error",
            ]),
        }
    }
}
