use crate::constants::{
    DEFAULT_GENERATION_API_BASE, DEFAULT_GENERATION_MODEL, DEFAULT_OUTPUT_DIR,
    DEFAULT_USERS_API_BASE, GENERATION_API_KEY_ENV,
};
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub users_api: UsersApiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersApiConfig {
    #[serde(default = "default_users_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_users_base_url() -> String {
    DEFAULT_USERS_API_BASE.to_string()
}

fn default_generation_base_url() -> String {
    DEFAULT_GENERATION_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    80
}

fn default_temperature() -> f32 {
    0.8
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for UsersApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_users_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users_api: UsersApiConfig::default(),
            generation: GenerationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to the
    /// built-in demo defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Reads the generation API key from the environment. The key is injected
/// configuration; it never lives in a source constant or the config file.
pub fn generation_api_key() -> Result<String> {
    std::env::var(GENERATION_API_KEY_ENV).map_err(|_| {
        EtlError::Config(format!(
            "Generation API key not set: export {GENERATION_API_KEY_ENV}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_demo_services() {
        let config = Config::default();
        assert_eq!(config.users_api.base_url, DEFAULT_USERS_API_BASE);
        assert_eq!(config.generation.model, DEFAULT_GENERATION_MODEL);
        assert_eq!(config.generation.max_tokens, 80);
        assert_eq!(config.output.dir, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let toml_str = r#"
            [generation]
            base_url = "http://localhost:8080"
            model = "test-model"

            [output]
            dir = "out"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.base_url, "http://localhost:8080");
        assert_eq!(config.generation.model, "test-model");
        // Untouched sections keep their defaults
        assert_eq!(config.generation.temperature, 0.8);
        assert_eq!(config.users_api.base_url, DEFAULT_USERS_API_BASE);
        assert_eq!(config.output.dir, "out");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from("definitely_not_here.toml").unwrap();
        assert_eq!(config.output.dir, DEFAULT_OUTPUT_DIR);
    }
}
