//! Minimal configuration loading for Woodshed.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `~/.config/woodshed/config.toml` (user)
//! 2. `./woodshed.toml` (local override)
//! 3. Environment variables (`WOODSHED_*`)
//!
//! # Example Config
//!
//! ```toml
//! [model]
//! base_url = "https://api.deepseek.com/v1"
//! model = "deepseek-chat"
//!
//! [store]
//! db_path = "woodshed.db"
//! ```
//!
//! The API key is never read from files; set `WOODSHED_API_KEY`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("model API key is not configured (set WOODSHED_API_KEY)")]
    MissingApiKey,

    #[error("invalid model client configuration: {0}")]
    InvalidModelClient(String),
}

/// Complete Woodshed configuration.
#[derive(Debug, Clone)]
pub struct ShedConfig {
    pub model: ModelConfig,
    pub store: StoreConfig,
}

/// Generative-model backend settings (OpenAI-compatible API).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Base URL of the chat-completions endpoint
    pub base_url: String,

    /// Model identifier, e.g. "deepseek-chat"
    pub model: String,

    /// API key; optional for local backends
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// The API key, or the configuration error the caller must surface.
    /// Missing credentials are fatal: there is no fallback for them.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// Persistent store settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl Default for ShedConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                base_url: "https://api.deepseek.com/v1".to_string(),
                model: "deepseek-chat".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            store: StoreConfig {
                db_path: PathBuf::from("woodshed.db"),
            },
        }
    }
}

/// One config file layer: every field optional, later layers win per field.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    model: ModelFile,
    #[serde(default)]
    store: StoreFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ModelFile {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoreFile {
    db_path: Option<PathBuf>,
}

impl ShedConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally preferring an explicit file over the
    /// local `./woodshed.toml` override.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = ShedConfig::default();

        for path in discover_config_files(config_path) {
            let layer = load_file(&path)?;
            apply_layer(&mut config, layer);
        }

        apply_env_overrides(&mut config);
        Ok(config)
    }
}

fn discover_config_files(config_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Some(dirs) = directories::ProjectDirs::from("", "", "woodshed") {
        let user = dirs.config_dir().join("config.toml");
        if user.is_file() {
            files.push(user);
        }
    }

    match config_path {
        Some(explicit) => files.push(explicit.to_path_buf()),
        None => {
            let local = PathBuf::from("woodshed.toml");
            if local.is_file() {
                files.push(local);
            }
        }
    }

    files
}

fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn apply_layer(config: &mut ShedConfig, layer: ConfigFile) {
    if let Some(v) = layer.model.base_url {
        config.model.base_url = v;
    }
    if let Some(v) = layer.model.model {
        config.model.model = v;
    }
    if let Some(v) = layer.model.timeout_secs {
        config.model.timeout_secs = v;
    }
    if let Some(v) = layer.store.db_path {
        config.store.db_path = v;
    }
}

fn apply_env_overrides(config: &mut ShedConfig) {
    if let Ok(v) = std::env::var("WOODSHED_MODEL_URL") {
        config.model.base_url = v;
    }
    if let Ok(v) = std::env::var("WOODSHED_MODEL") {
        config.model.model = v;
    }
    if let Ok(v) = std::env::var("WOODSHED_API_KEY") {
        if !v.is_empty() {
            config.model.api_key = Some(v);
        }
    }
    if let Ok(v) = std::env::var("WOODSHED_DB_PATH") {
        config.store.db_path = PathBuf::from(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = ShedConfig::default();
        assert_eq!(config.model.timeout_secs, 30);
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[model]\nbase_url = \"http://localhost:11434/v1\"\nmodel = \"llama3\"\n\n[store]\ndb_path = \"/tmp/test.db\"\n"
        )
        .unwrap();

        let config = ShedConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.model.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.store.db_path, PathBuf::from("/tmp/test.db"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[model]\nmodel = \"gpt-4o-mini\"\n").unwrap();

        let config = ShedConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.base_url, "https://api.deepseek.com/v1");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[model\nnope").unwrap();

        let err = ShedConfig::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let config = ShedConfig::default();
        assert!(matches!(
            config.model.require_api_key(),
            Err(ConfigError::MissingApiKey)
        ));
    }
}
