// Inbound request model
//
// `PromptRequestBody` is the JSON wire shape. `PromptRequest` is the
// normalized form: blank fields are gone, images carry a MIME type, and
// `validate` enforces that something was actually supplied.

use serde::Deserialize;

use crate::config::constants::DEFAULT_IMAGE_MIME_TYPE;
use crate::error::ProcessorError;

/// Request body as posted by the frontend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequestBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub selfie_image: Option<String>,
    #[serde(default)]
    pub selfie_mime_type: Option<String>,
    #[serde(default)]
    pub reference_image: Option<String>,
    #[serde(default)]
    pub reference_mime_type: Option<String>,
    /// Older single-image field; applies to the reference image when
    /// `referenceMimeType` is absent
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A base64 image plus its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub data: String,
    pub mime_type: String,
}

impl ImageInput {
    /// Build from a raw field value, accepting `data:<mime>;base64,<payload>` URLs.
    ///
    /// An explicit MIME type wins over the one embedded in a data URL.
    /// Returns `None` for blank input, including a data URL with no payload.
    pub fn from_field(raw: Option<String>, explicit_mime: Option<String>) -> Option<Self> {
        let raw = present(raw)?;
        let explicit_mime = present(explicit_mime);

        let (data, embedded_mime) = match split_data_url(&raw) {
            Some((mime, payload)) => (payload.to_string(), mime.map(str::to_string)),
            None => (raw, None),
        };
        let data = present(Some(data))?;

        let mime_type = explicit_mime
            .or(embedded_mime)
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string());

        Some(Self { data, mime_type })
    }
}

/// Normalized request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: Option<String>,
    pub selfie: Option<ImageInput>,
    pub reference: Option<ImageInput>,
}

impl PromptRequest {
    pub fn from_body(body: PromptRequestBody) -> Self {
        Self {
            prompt: present(body.prompt),
            selfie: ImageInput::from_field(body.selfie_image, body.selfie_mime_type),
            reference: ImageInput::from_field(
                body.reference_image,
                present(body.reference_mime_type).or(body.mime_type),
            ),
        }
    }

    /// Text-only request
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: present(Some(prompt.into())),
            ..Default::default()
        }
    }

    pub fn has_images(&self) -> bool {
        self.selfie.is_some() || self.reference.is_some()
    }

    /// Valid iff at least one of prompt, selfie or reference is set
    pub fn validate(&self) -> Result<(), ProcessorError> {
        if self.prompt.is_none() && !self.has_images() {
            return Err(ProcessorError::InvalidRequest(
                "no prompt, selfieImage or referenceImage supplied".to_string(),
            ));
        }
        Ok(())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Split `data:<mime>;base64,<payload>` into (mime, payload)
fn split_data_url(raw: &str) -> Option<(Option<&str>, &str)> {
    let rest = raw.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    Some((mime, payload))
}
