// Request assembly: PromptRequest + knowledge block -> ordered content parts

use super::parts::ContentPart;
use super::request::PromptRequest;
use crate::error::ProcessorError;
use crate::knowledge::KnowledgeBlock;

/// Label placed before the user's own words
pub const USER_REQUEST_LABEL: &str = "Petición del usuario";

/// Cue following the selfie image part
pub const SELFIE_MARKER: &str = "[IMAGEN DE SELFIE ADJUNTADA. UTILIZA ESTE ROSTRO EXACTO.]";

/// Cue following the reference image part
pub const REFERENCE_MARKER: &str =
    "[IMAGEN DE REFERENCIA ADJUNTADA. UTILIZA ESTE ESTILO, ATMÓSFERA Y ENTORNO.]";

/// Build the ordered part sequence for one request.
///
/// Order: knowledge block, labelled user prompt (if any), selfie image and
/// its marker (if any), reference image and its marker (if any). The system
/// instruction is not part of the sequence; it goes on its own channel.
pub fn assemble(
    request: &PromptRequest,
    knowledge: &KnowledgeBlock,
) -> Result<Vec<ContentPart>, ProcessorError> {
    request.validate()?;

    let mut parts = Vec::with_capacity(6);
    parts.push(ContentPart::text(knowledge.as_str()));

    if let Some(prompt) = &request.prompt {
        parts.push(ContentPart::text(format!(
            "{}: \"{}\"",
            USER_REQUEST_LABEL, prompt
        )));
    }

    if let Some(selfie) = &request.selfie {
        parts.push(ContentPart::inline_image(&selfie.data, &selfie.mime_type));
        parts.push(ContentPart::text(SELFIE_MARKER));
    }

    if let Some(reference) = &request.reference {
        parts.push(ContentPart::inline_image(
            &reference.data,
            &reference.mime_type,
        ));
        parts.push(ContentPart::text(REFERENCE_MARKER));
    }

    Ok(parts)
}
