// Provider-agnostic request type

use crate::prompt::ContentPart;

/// One generation call: steering instruction, ordered content, model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    /// Sent on the provider's system channel, never mixed into `parts`
    pub system_instruction: String,
    pub parts: Vec<ContentPart>,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        parts: Vec<ContentPart>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            parts,
        }
    }

    /// Number of inline image parts
    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_image()).count()
    }
}
