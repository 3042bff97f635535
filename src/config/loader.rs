// Configuration loader
// Layers defaults, ~/.promptraits/config.toml, environment variables and CLI flags

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::API_KEY_ENV;
use super::settings::{Config, GenerationConfig, KnowledgeConfig, ServerConfig};

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub knowledge_dir: Option<PathBuf>,
    pub model: Option<String>,
}

/// Load configuration from the config file, the process environment and CLI flags
pub fn load_config(cli: &CliOverrides) -> Result<Config> {
    let path = match &cli.config_path {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|p| p.exists()),
    };

    load_config_from(path.as_deref(), |key| std::env::var(key).ok(), cli)
}

/// Load configuration with an explicit file and environment lookup
pub fn load_config_from<F>(path: Option<&Path>, env: F, cli: &CliOverrides) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    apply_env(&mut config, env);
    apply_cli(&mut config, cli);

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".promptraits").join("config.toml"))
}

fn read_config_file(path: &Path) -> Result<Config> {
    #[derive(serde::Deserialize)]
    struct TomlConfig {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        server: Option<ServerConfig>,
        #[serde(default)]
        knowledge: Option<KnowledgeConfig>,
        #[serde(default)]
        generation: Option<GenerationConfig>,
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let toml_config: TomlConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    tracing::debug!("Loaded configuration from {}", path.display());

    Ok(Config {
        api_key: toml_config.api_key.unwrap_or_default(),
        server: toml_config.server.unwrap_or_default(),
        knowledge: toml_config.knowledge.unwrap_or_default(),
        generation: toml_config.generation.unwrap_or_default(),
    })
}

fn apply_env<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(api_key) = non_empty(API_KEY_ENV) {
        config.api_key = api_key;
    }
    if let Some(bind) = non_empty("PROMPTRAITS_BIND") {
        config.server.bind_address = bind;
    }
    if let Some(dir) = non_empty("PROMPTRAITS_KNOWLEDGE_DIR") {
        config.knowledge.directory = PathBuf::from(dir);
    }
    if let Some(model) = non_empty("PROMPTRAITS_MODEL") {
        config.generation.model = model;
    }
}

fn apply_cli(config: &mut Config, cli: &CliOverrides) {
    if let Some(bind) = &cli.bind_address {
        config.server.bind_address = bind.clone();
    }
    if let Some(dir) = &cli.knowledge_dir {
        config.knowledge.directory = dir.clone();
    }
    if let Some(model) = &cli.model {
        config.generation.model = model.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = load_config_from(None, env_of(&[]), &CliOverrides::default()).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8888");
        assert_eq!(config.knowledge.directory, PathBuf::from("knowledge"));
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_env_supplies_api_key() {
        let config = load_config_from(
            None,
            env_of(&[("GEMINI_API_KEY", "secret")]),
            &CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.api_key, "secret");
    }

    #[test]
    fn test_toml_file_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
api_key = "from-file"

[server]
bind_address = "0.0.0.0:9000"
cors_enabled = false

[knowledge]
directory = "/srv/knowledge"
reload_per_request = true

[generation]
model = "gemini-1.5-flash"
timeout_secs = 15
"#,
        )
        .unwrap();

        let config =
            load_config_from(Some(path.as_path()), env_of(&[]), &CliOverrides::default())
                .unwrap();
        assert_eq!(config.api_key, "from-file");
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert!(!config.server.cors_enabled);
        assert_eq!(config.knowledge.directory, PathBuf::from("/srv/knowledge"));
        assert!(config.knowledge.reload_per_request);
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.generation.timeout_secs, 15);
        // Unset keys keep their defaults
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_precedence_file_then_env_then_cli() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[generation]\nmodel = \"file-model\"\n").unwrap();

        let env = env_of(&[("PROMPTRAITS_MODEL", "env-model")]);
        let config =
            load_config_from(Some(path.as_path()), &env, &CliOverrides::default()).unwrap();
        assert_eq!(config.generation.model, "env-model");

        let cli = CliOverrides {
            model: Some("cli-model".to_string()),
            ..Default::default()
        };
        let config = load_config_from(Some(path.as_path()), &env, &cli).unwrap();
        assert_eq!(config.generation.model, "cli-model");
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let config = load_config_from(
            None,
            env_of(&[("GEMINI_API_KEY", "  ")]),
            &CliOverrides::default(),
        )
        .unwrap();
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[server\nbind_address = ").unwrap();

        let err = load_config_from(Some(path.as_path()), env_of(&[]), &CliOverrides::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
