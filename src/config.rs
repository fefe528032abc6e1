//! Application configuration.
//!
//! Values come from an optional TOML file, then environment overrides.
//! Credentials are only ever read from the file or the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::error::{TutorError, TutorResult};

pub const ENV_CONFIG: &str = "MATHTUTOR_CONFIG";
pub const ENV_API_KEY: &str = "MATHTUTOR_API_KEY";
pub const ENV_API_BASE: &str = "MATHTUTOR_API_BASE";
pub const ENV_MODEL: &str = "MATHTUTOR_MODEL";
pub const ENV_AUTH_KEY: &str = "MATHTUTOR_AUTH_KEY";
pub const ENV_DATA: &str = "MATHTUTOR_DATA";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path of the problem dataset (JSON)
    pub dataset: Option<PathBuf>,
    pub service: ServiceConfig,
    pub auth: AuthConfig,
}

/// Hint/solution generation service (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub hint_max_tokens: u32,
    pub solution_max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.perplexity.ai".to_string(),
            model: "sonar".to_string(),
            api_key: None,
            hint_max_tokens: 200,
            solution_max_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

/// Identity provider (Identity Toolkit REST API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from `$MATHTUTOR_CONFIG`, or defaults; then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> TutorResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                let text = fs::read_to_string(&path).map_err(|e| {
                    TutorError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> TutorResult<Self> {
        toml::from_str(text).map_err(|e| TutorError::config(e.to_string()))
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.service.api_key = Some(key);
        }
        if let Some(base) = lookup(ENV_API_BASE) {
            self.service.base_url = base;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.service.model = model;
        }
        if let Some(key) = lookup(ENV_AUTH_KEY) {
            self.auth.api_key = Some(key);
        }
        if let Some(data) = lookup(ENV_DATA) {
            self.dataset = Some(PathBuf::from(data));
        }
    }
}
