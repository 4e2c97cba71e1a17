// src/config/mod.rs
// Config file (~/.screener/config.toml) plus .env loading.
// Resolution order: CLI args > env vars (handled by clap) > config file > defaults

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::classifier::{DEFAULT_CLASSIFIER_MODEL, DEFAULT_CLASSIFIER_URL};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration file contents; every key is optional
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    /// Gemini API key for chat
    pub gemini_api_key: Option<String>,

    /// Gemini model id
    pub gemini_model: Option<String>,

    /// Gemini API base URL
    pub gemini_url: Option<String>,

    /// Hugging Face API token for the classifier
    pub hf_api_token: Option<String>,

    /// Inference API base URL
    pub classifier_url: Option<String>,

    /// Zero-shot model id
    pub classifier_model: Option<String>,

    /// Per-request classifier timeout
    pub classifier_timeout_secs: Option<u64>,

    /// Plain-text file replacing the built-in rubric
    pub rubric_path: Option<PathBuf>,

    /// `serve` bind host
    pub host: Option<String>,

    /// `serve` bind port
    pub port: Option<u16>,
}

impl Config {
    /// Load config from ~/.screener/config.toml
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from `path`, falling back to defaults when it is absent or broken
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn classifier_url(&self) -> String {
        self.classifier_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string())
    }

    pub fn classifier_model(&self) -> String {
        self.classifier_model
            .clone()
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string())
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(
            self.classifier_timeout_secs
                .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
        )
    }
}

/// ~/.screener
pub fn config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".screener")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load a .env file (from ~/.screener/.env or current dir)
pub fn load_dotenv() {
    let env_path = Some(config_dir().join(".env")).filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv();
    }
}
