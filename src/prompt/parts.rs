// Ordered content parts sent to the generative model

use serde::{Deserialize, Serialize};

/// One element of the request payload.
///
/// Order matters: the model reads parts positionally, so image parts sit
/// next to the text that announces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    InlineImage {
        /// Base64 payload, passed through untouched
        data: String,
        mime_type: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline_image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::InlineImage {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::InlineImage { .. })
    }

    /// Text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::InlineImage { .. } => None,
        }
    }
}
