// Dispatcher: exactly one outbound generation call per inbound request
//
// Per-request lifecycle is validating -> dispatching -> completed | failed.
// No retries and no partial results; the provider's client timeout bounds
// the only suspension point.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::assembler::assemble;
use super::parts::ContentPart;
use super::policy::GenerationPolicy;
use super::request::PromptRequest;
use crate::error::ProcessorError;
use crate::knowledge::KnowledgeBlock;
use crate::providers::{GenerationRequest, LlmProvider};

/// Lifecycle phase of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Validating,
    Dispatching,
    Completed,
    Failed,
}

impl RequestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Dispatching => "dispatching",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends assembled parts to the provider under a fixed policy
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn LlmProvider>,
    policy: Arc<GenerationPolicy>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: GenerationPolicy) -> Self {
        Self {
            provider,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Single generation call. Any provider failure becomes `UpstreamFailure`.
    pub async fn generate(
        &self,
        parts: Vec<ContentPart>,
        system_instruction: &str,
    ) -> Result<String, ProcessorError> {
        let request = GenerationRequest::new(self.policy.model.as_str(), parts, system_instruction);

        self.provider
            .generate(&request)
            .await
            .map_err(|e| ProcessorError::UpstreamFailure(format!("{:#}", e)))
    }

    /// Validate, assemble and dispatch one request under this dispatcher's policy
    pub async fn process(
        &self,
        request: &PromptRequest,
        knowledge: &KnowledgeBlock,
    ) -> Result<String, ProcessorError> {
        let started = Instant::now();

        tracing::debug!(phase = %RequestPhase::Validating, "Processing prompt request");
        let parts = match assemble(request, knowledge) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::info!(phase = %RequestPhase::Failed, error = %e, "Request rejected");
                return Err(e);
            }
        };

        tracing::info!(
            phase = %RequestPhase::Dispatching,
            provider = self.provider.name(),
            model = %self.policy.model,
            has_prompt = request.prompt.is_some(),
            has_selfie = request.selfie.is_some(),
            has_reference = request.reference.is_some(),
            knowledge_degraded = knowledge.is_degraded(),
            "Dispatching generation request"
        );

        match self.generate(parts, &self.policy.system_instruction).await {
            Ok(text) => {
                tracing::info!(
                    phase = %RequestPhase::Completed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    chars = text.chars().count(),
                    "Generation completed"
                );
                Ok(text)
            }
            Err(e) => {
                tracing::error!(
                    phase = %RequestPhase::Failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Generation failed"
                );
                Err(e)
            }
        }
    }
}
