// Generative model providers
//
// The service depends on exactly one outbound collaborator: a model API that
// takes a system instruction plus ordered text/image parts and returns text.
// The trait keeps that seam swappable (tests plug in a recording stub).

use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;
pub mod types;

pub use gemini::GeminiProvider;
pub use types::GenerationRequest;

/// Trait for generative model providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one generation call and return the model's text verbatim
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider name (e.g., "gemini")
    fn name(&self) -> &str;
}
