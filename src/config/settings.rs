// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_HTTP_ADDR, DEFAULT_KNOWLEDGE_DIR, DEFAULT_MAX_BODY_BYTES, DEFAULT_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_BASE_URL,
};

fn default_true() -> bool {
    true
}

#[derive(Clone, Default)]
pub struct Config {
    /// Gemini API key. Empty means every generation call fails upstream.
    pub api_key: String,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Knowledge base location and caching
    pub knowledge: KnowledgeConfig,

    /// Outbound model settings
    pub generation: GenerationConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8888")
    pub bind_address: String,
    /// Answer with permissive CORS headers (browser frontends call us cross-origin)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            cors_enabled: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory of `.txt` / `.md` files prepended to every request
    pub directory: PathBuf,
    /// Re-read the directory on each request instead of once at start-up
    pub reload_per_request: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_KNOWLEDGE_DIR),
            reload_per_request: false,
        }
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model identifier sent to the API
    pub model: String,
    /// API base URL (overridable for proxies and tests)
    pub base_url: String,
    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
    /// Optional file replacing the built-in system instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction_path: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            system_instruction_path: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key_set", &self.has_api_key())
            .field("server", &self.server)
            .field("knowledge", &self.knowledge)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            bail!(
                "Invalid bind address '{}': expected host:port such as {}",
                self.server.bind_address,
                DEFAULT_HTTP_ADDR
            );
        }

        if self.generation.model.trim().is_empty() {
            bail!("generation.model must not be empty");
        }

        if self.generation.timeout_secs == 0 {
            bail!("generation.timeout_secs must be greater than zero");
        }

        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than zero");
        }

        // A missing key is tolerated: requests fail at the API-call stage instead.
        if self.api_key.is_empty() {
            tracing::warn!("No Gemini API key configured; generation requests will fail");
        }

        Ok(())
    }

    /// Whether an API key is present
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert!(config.server.cors_enabled);
        assert!(!config.knowledge.reload_per_request);
    }

    #[test]
    fn test_invalid_bind_address_rejected() {
        let mut config = Config::default();
        config.server.bind_address = "not-an-address".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid bind address"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: "AIza-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("api_key_set: true"));
    }

    #[test]
    fn test_missing_api_key_is_not_fatal() {
        let config = Config::default();
        assert!(!config.has_api_key());
        assert!(config.validate().is_ok());
    }
}
