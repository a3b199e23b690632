//! Model-invocation resilience engine for AWS Bedrock.
//!
//! Turns a nominal model id into an ordered list of candidate identifiers,
//! tries them sequentially with throttling-aware retries, and exposes the
//! result as a single chunk stream.

pub mod adapters;
pub mod collector;
pub mod failure;
pub mod model_id;
pub mod orchestrator;
pub mod retry;
pub mod transport;

pub use adapters::{AmazonAdapter, AnthropicAdapter};
pub use failure::categorizer::KeywordCategorizer;
pub use orchestrator::InvocationOrchestrator;
pub use retry::backoff::BackoffCalculator;
pub use retry::executor::{RetryExecutor, RetryHooks};
pub use transport::{BedrockTransport, StreamTransport, TransportRequest};
