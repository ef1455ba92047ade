//! Configuration management for BioBuddy
//!
//! TOML-based configuration with defaults, environment overrides and validation.
//! Location: ~/.biobuddy/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Complete configuration for BioBuddy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings fixed when the answer pipeline is constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of passages fetched per question
    pub retrieval_k: usize,
    /// Sampling temperature handed to the generator at startup
    pub generation_temperature: f32,
    /// Who the biography is about
    pub subject: String,
    /// Replacement for the built-in prompt template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    /// Upper bound on assembled context length, in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context_chars: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retrieval_k: 4,
            generation_temperature: 0.5,
            subject: "the subject".to_string(),
            prompt_template: None,
            max_context_chars: None,
        }
    }
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "qwen2.5:7b-instruct".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Which backend turns text into vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Ollama `/api/embed`
    Ollama,
    /// In-process BERT model via candle
    Local,
}

/// Embedding backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Ollama embedding model
    pub model: String,
    /// HuggingFace repo for the local model
    pub local_model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            local_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

/// Where passages are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    Qdrant,
    Memory,
}

/// Passage store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub provider: StoreProvider,
    pub qdrant_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    /// Payload field holding the passage text
    pub content_field: String,
    /// Biography file for the in-memory store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passages_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Qdrant,
            qdrant_url: "http://localhost:6334".to_string(),
            qdrant_api_key: None,
            collection: "bio_index".to_string(),
            content_field: "text".to_string(),
            passages_path: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the default file, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config.with_env_overrides());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config.with_env_overrides())
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path, self.to_toml()?).context("Failed to write config file")?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Directory holding config and REPL history
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".biobuddy"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Apply `BIOBUDDY_*` environment variables on top of file values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BIOBUDDY_OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = lookup("BIOBUDDY_MODEL") {
            self.ollama.model = model;
        }
        if let Some(url) = lookup("BIOBUDDY_QDRANT_URL") {
            self.store.qdrant_url = url;
        }
        if let Some(key) = lookup("BIOBUDDY_QDRANT_API_KEY") {
            self.store.qdrant_api_key = Some(key);
        }
        self
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.pipeline.validate()?;

        if self.store.provider == StoreProvider::Memory && self.store.passages_path.is_none() {
            return Err(ConfigError::Invalid(
                "store.passages_path is required for the memory store".to_string(),
            ));
        }
        if self.ollama.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ollama.request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.retrieval_k == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.retrieval_k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation_temperature) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.generation_temperature {} is outside 0.0..=2.0",
                self.generation_temperature
            )));
        }
        if self.max_context_chars == Some(0) {
            return Err(ConfigError::Invalid(
                "pipeline.max_context_chars must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.pipeline.retrieval_k, 4);
        assert_eq!(config.pipeline.generation_temperature, 0.5);
        assert!(config.pipeline.prompt_template.is_none());
        assert!(config.pipeline.max_context_chars.is_none());
        assert_eq!(config.store.collection, "bio_index");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pipeline]
            retrieval_k = 6
            subject = "Ada Lovelace"

            [store]
            provider = "memory"
            passages_path = "bio.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.retrieval_k, 6);
        assert_eq!(config.pipeline.subject, "Ada Lovelace");
        assert_eq!(config.pipeline.generation_temperature, 0.5);
        assert_eq!(config.store.provider, StoreProvider::Memory);
        assert_eq!(config.ollama, OllamaConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.pipeline.max_context_chars = Some(4000);
        config.embedding.provider = EmbeddingProvider::Local;
        config.save_to(&path).unwrap();

        let loaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from(&temp_dir.path().join("absent.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BIOBUDDY_OLLAMA_URL", "http://gpu-box:11434"),
            ("BIOBUDDY_QDRANT_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.store.qdrant_api_key.as_deref(), Some("secret"));
        assert_eq!(config.ollama.model, "qwen2.5:7b-instruct");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pipeline.retrieval_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.generation_temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.max_context_chars = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.store.provider = StoreProvider::Memory;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
