// Project-wide constants
//
// Centralised here so ports, paths and model names have one source of truth.
// Import via `use crate::config::constants::*;`.

/// Default bind address for the HTTP service.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8888";

/// Directory (relative to the working directory) holding the knowledge files.
pub const DEFAULT_KNOWLEDGE_DIR: &str = "knowledge";

/// Gemini model used when neither config nor environment override it.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL of the Gemini REST API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Outbound request timeout. The hosting platform gave no bound, so we do.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Inbound body limit. Requests carry up to two base64 images.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// MIME type assumed for images sent without one.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Environment variable carrying the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
