//! Configuration management for Courseforge
//!
//! Configuration is loaded from a YAML file, then overridden by
//! environment variables (`COURSEFORGE_*`) and CLI flags, and finally
//! validated.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CourseforgeError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generation service settings (outline + content streams)
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Content-management backend settings (publishing)
    #[serde(default)]
    pub backend: BackendConfig,
    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of the generation service
    #[serde(default = "default_generator_api_base")]
    pub api_base: String,
    /// Structural depth knob sent with outline requests, 1-10
    #[serde(default = "default_course_depth")]
    pub course_depth: u8,
    /// Per-request timeout; also bounds each stream read
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_generator_api_base() -> String {
    "http://localhost:8000".to_string()
}

fn default_course_depth() -> u8 {
    3
}

fn default_timeout_seconds() -> u64 {
    300
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: default_generator_api_base(),
            course_depth: default_course_depth(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Content-management backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the publishing REST surface
    #[serde(default = "default_backend_api_base")]
    pub api_base: String,
    /// Institute whose catalog receives published courses
    #[serde(default)]
    pub institute_id: String,
}

fn default_backend_api_base() -> String {
    "http://localhost:9000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_backend_api_base(),
            institute_id: String::new(),
        }
    }
}

/// Local persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the embedded mirror database
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    "courseforge.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CourseforgeError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CourseforgeError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("COURSEFORGE_GENERATOR_API_BASE") {
            self.generator.api_base = api_base;
        }

        if let Ok(api_base) = std::env::var("COURSEFORGE_BACKEND_API_BASE") {
            self.backend.api_base = api_base;
        }

        if let Ok(institute_id) = std::env::var("COURSEFORGE_INSTITUTE_ID") {
            self.backend.institute_id = institute_id;
        }

        if let Ok(path) = std::env::var("COURSEFORGE_STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Ok(depth) = std::env::var("COURSEFORGE_COURSE_DEPTH") {
            if let Ok(value) = depth.parse() {
                self.generator.course_depth = value;
            } else {
                tracing::warn!("Invalid COURSEFORGE_COURSE_DEPTH: {}", depth);
            }
        }

        if let Ok(timeout) = std::env::var("COURSEFORGE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.generator.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid COURSEFORGE_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(storage_path) = &cli.storage_path {
            self.storage.path = storage_path.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any value is out of range or a base URL does not
    /// parse.
    pub fn validate(&self) -> Result<()> {
        if self.generator.api_base.is_empty() {
            return Err(
                CourseforgeError::Config("generator.api_base cannot be empty".to_string()).into(),
            );
        }
        if url::Url::parse(&self.generator.api_base).is_err() {
            return Err(CourseforgeError::Config(format!(
                "generator.api_base is not a valid URL: {}",
                self.generator.api_base
            ))
            .into());
        }

        if url::Url::parse(&self.backend.api_base).is_err() {
            return Err(CourseforgeError::Config(format!(
                "backend.api_base is not a valid URL: {}",
                self.backend.api_base
            ))
            .into());
        }

        if self.generator.course_depth == 0 || self.generator.course_depth > 10 {
            return Err(CourseforgeError::Config(
                "generator.course_depth must be between 1 and 10".to_string(),
            )
            .into());
        }

        if self.generator.timeout_seconds == 0 {
            return Err(CourseforgeError::Config(
                "generator.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.path.is_empty() {
            return Err(
                CourseforgeError::Config("storage.path cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            backend: BackendConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.api_base, "http://localhost:8000");
        assert_eq!(config.generator.course_depth, 3);
        assert_eq!(config.generator.timeout_seconds, 300);
        assert_eq!(config.storage.path, "courseforge.db");
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_api_base() {
        let mut config = Config::default();
        config.generator.api_base = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.backend.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_depth_range() {
        let mut config = Config::default();
        config.generator.course_depth = 0;
        assert!(config.validate().is_err());
        config.generator.course_depth = 11;
        assert!(config.validate().is_err());
        config.generator.course_depth = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.generator.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
generator:
  api_base: https://gen.example.com
  course_depth: 5
backend:
  api_base: https://cms.example.com
  institute_id: inst-42
storage:
  path: /tmp/forge.db
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generator.api_base, "https://gen.example.com");
        assert_eq!(config.generator.course_depth, 5);
        // Unspecified fields keep their defaults.
        assert_eq!(config.generator.timeout_seconds, 300);
        assert_eq!(config.backend.institute_id, "inst-42");
        assert_eq!(config.storage.path, "/tmp/forge.db");
    }

    #[test]
    fn test_config_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("generator:\n  course_depth: 2\n").unwrap();
        assert_eq!(config.generator.course_depth, 2);
        assert_eq!(config.generator.api_base, "http://localhost:8000");
        assert_eq!(config.backend.api_base, "http://localhost:9000");
    }
}
