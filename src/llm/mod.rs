//! LLM provider abstraction.
//!
//! The orchestration layer treats the model as a black box: prompt in,
//! text out. The response may be malformed or hallucinate unsupported
//! facts; callers are responsible for validating it.

mod api;

pub use api::ApiLlmProvider;

use async_trait::async_trait;

/// Trait for LLM completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> crate::error::Result<String>;
}
