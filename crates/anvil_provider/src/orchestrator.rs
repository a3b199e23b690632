use std::sync::Arc;

use anvil_domain::{
    ChunkStream, CredentialPair, DeploymentLookup, Error, ErrorCategorizer, InvocationRequest,
    ModelAdapter, ModelId, RetryPolicy, StaticProfileRequirements, StreamChunk,
};
use async_stream::stream;
use derive_setters::Setters;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::adapters::{AmazonAdapter, AnthropicAdapter};
use crate::collector;
use crate::failure::categorizer::KeywordCategorizer;
use crate::failure::{inspector, rate_limit};
use crate::model_id::{normalizer, variations};
use crate::retry::executor::{RetryExecutor, RetryHooks};
use crate::transport::{BedrockTransport, StreamTransport, TransportRequest};

/// Drives one logical chat request through the candidate-identifier loop.
///
/// Candidates are tried strictly in priority order, one at a time; within a
/// candidate, throttling failures are retried with backoff. The first
/// candidate that streams successfully ends the whole orchestration. All
/// collaborators are injected; the defaults wire the real Bedrock transport
/// with the two reference adapters.
#[derive(Clone, Setters)]
#[setters(into)]
pub struct InvocationOrchestrator {
    transport: Arc<dyn StreamTransport>,
    adapters: Arc<Vec<Arc<dyn ModelAdapter>>>,
    lookup: Arc<dyn DeploymentLookup>,
    categorizer: Arc<dyn ErrorCategorizer>,
    policy: RetryPolicy,
}

impl Default for InvocationOrchestrator {
    fn default() -> Self {
        Self::new(Arc::new(BedrockTransport))
    }
}

impl InvocationOrchestrator {
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            transport,
            adapters: Arc::new(vec![
                Arc::new(AnthropicAdapter) as Arc<dyn ModelAdapter>,
                Arc::new(AmazonAdapter) as Arc<dyn ModelAdapter>,
            ]),
            lookup: Arc::new(StaticProfileRequirements::default()),
            categorizer: Arc::new(KeywordCategorizer),
            policy: RetryPolicy::default(),
        }
    }

    /// Returns the invocation output stream: zero or more data chunks, or
    /// exactly one terminal error chunk. Fatal input errors surface without
    /// any network call being made.
    pub fn invoke(&self, request: InvocationRequest, token: CancellationToken) -> ChunkStream {
        let orchestrator = self.clone();
        Box::pin(stream! {
            match orchestrator.run(request, token).await {
                Ok(chunks) => {
                    for chunk in chunks {
                        yield chunk;
                    }
                }
                Err(message) => yield StreamChunk::error(message),
            }
        })
    }

    /// The attempt loop. Returns the buffered data chunks of the first
    /// successful candidate, or the terminal error message.
    async fn run(
        &self,
        request: InvocationRequest,
        token: CancellationToken,
    ) -> Result<Vec<StreamChunk>, String> {
        // Fatal path 1: malformed credentials.
        let credentials: CredentialPair = request
            .credentials
            .parse()
            .map_err(|parse_error: Error| parse_error.to_string())?;

        // Fatal path 2: no adapter claims this model family. Matching is on
        // the bare id, without suffix or regional prefix.
        let normalized = normalizer::normalize(&request.model_id);
        let bare_id = normalizer::strip_prefix(&normalized);
        let adapter = self
            .find_adapter(&bare_id)
            .ok_or_else(|| Error::UnsupportedModel(request.model_id.clone()).to_string())?;
        debug!(model_id = %bare_id, adapter = adapter.name(), "Resolved format adapter");

        let must_use_profile = self.requires_profile(&normalized, &request.region).await;
        let candidates = variations::generate(&request.model_id, must_use_profile, &request.region);

        let formatted = adapter.format_request(&bare_id, &request.messages, &request.params);
        let executor = RetryExecutor::new(self.policy.clone());
        let mut last_failure: Option<anyhow::Error> = None;

        for candidate in &candidates {
            info!(
                model_id = %candidate.model_id,
                priority = candidate.priority,
                note = %candidate.note,
                "Attempting model id variation"
            );

            let transport_request = TransportRequest {
                credentials: credentials.clone(),
                region: request.region.clone(),
                model_id: candidate.model_id.clone(),
                body: formatted.body.clone(),
                content_type: formatted.content_type.clone(),
                accept: formatted.accept.clone(),
            };

            let candidate_id = candidate.model_id.clone();
            let hooks = RetryHooks::default().on_retry(move |attempt, delay, _| {
                warn!(
                    model_id = %candidate_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, retrying this candidate after backoff"
                );
                Ok(())
            });

            let outcome = executor
                .execute(
                    || {
                        collector::collect(
                            self.transport.as_ref(),
                            adapter.as_ref(),
                            transport_request.clone(),
                            token.clone(),
                        )
                    },
                    rate_limit::is_rate_limit,
                    hooks,
                    token.clone(),
                )
                .await;

            match outcome.result {
                Ok(chunks) => {
                    info!(
                        model_id = %candidate.model_id,
                        attempts = outcome.attempts,
                        "Variation succeeded"
                    );
                    return Ok(chunks);
                }
                Err(failure) => {
                    let parsed = inspector::parse(&failure);
                    warn!(
                        model_id = %candidate.model_id,
                        code = %parsed.code,
                        http_status = parsed.http_status,
                        attempts = outcome.attempts,
                        "Variation failed, moving to the next candidate"
                    );
                    last_failure = Some(failure);
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
        }

        if token.is_cancelled() {
            return Err(Error::Cancelled.to_string());
        }

        let raw_error = last_failure
            .map(|failure| format!("{failure:#}"))
            .unwrap_or_else(|| "No model id variation could be attempted".to_string());
        error!(
            model_id = %request.model_id,
            candidates = candidates.len(),
            error = %raw_error,
            "All model id variations exhausted"
        );
        let categorized = self.categorizer.categorize(&raw_error);
        Err(categorized.to_user_message())
    }

    fn find_adapter(&self, bare_id: &ModelId) -> Option<Arc<dyn ModelAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.supports(bare_id))
            .cloned()
    }

    /// Lookup failures downgrade to "not required" so a broken store can
    /// never block an invocation outright.
    async fn requires_profile(&self, model_id: &ModelId, region: &str) -> bool {
        match self.lookup.requires_inference_profile(model_id, region).await {
            Ok(required) => required,
            Err(lookup_error) => {
                debug!(
                    model_id = %model_id,
                    error = %lookup_error,
                    "Profile requirement lookup failed, treating as not required"
                );
                false
            }
        }
    }
}
