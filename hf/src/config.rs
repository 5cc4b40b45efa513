//! HolidayFinder configuration types and loading
//!
//! Built once at startup and handed around by reference.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main HolidayFinder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Interview shape and ranking limits
    pub interview: InterviewConfig,

    /// Property catalog location
    pub catalog: CatalogConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate the interview shape; every command needs this
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.interview.rounds == 0 {
            return Err(eyre::eyre!("interview.rounds must be at least 1"));
        }
        if self.interview.top_n == 0 {
            return Err(eyre::eyre!("interview.top-n must be at least 1"));
        }
        Ok(())
    }

    /// Check the model credential is present; only commands that call the model need this
    pub fn validate_credentials(&self) -> Result<()> {
        if self.llm.get_api_key().is_none() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .holidayfinder.yml
        let local_config = PathBuf::from(".holidayfinder.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/holidayfinder/holidayfinder.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("holidayfinder").join("holidayfinder.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `HOLIDAYFINDER_*` overrides from the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("HOLIDAYFINDER_MODEL") {
            tracing::debug!(%model, "apply_overrides: model");
            self.llm.model = model;
        }
        if let Some(rounds) = lookup("HOLIDAYFINDER_ROUNDS") {
            self.interview.rounds = rounds
                .trim()
                .parse()
                .context(format!("HOLIDAYFINDER_ROUNDS is not a number: {rounds}"))?;
        }
        if let Some(top_n) = lookup("HOLIDAYFINDER_TOP_N") {
            self.interview.top_n = top_n
                .trim()
                .parse()
                .context(format!("HOLIDAYFINDER_TOP_N is not a number: {top_n}"))?;
        }
        if let Some(path) = lookup("HOLIDAYFINDER_CATALOG") {
            self.catalog.path = PathBuf::from(path);
        }
        Ok(())
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Temperature for conversational calls; tag extraction always uses 0
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 1024,
            timeout_ms: 60_000,
            temperature: 0.7,
        }
    }
}

impl LlmConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn get_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Interview shape and ranking limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Number of user turns
    pub rounds: usize,

    /// Cap on best-overlap candidates
    #[serde(rename = "top-n")]
    pub top_n: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self { rounds: 5, top_n: 3 }
    }
}

/// Property catalog location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the line-oriented catalog file
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("properties.txt"),
        }
    }
}
