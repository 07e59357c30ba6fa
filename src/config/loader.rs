use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/flowkit/config.toml` on Unix/macOS, or the
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("flowkit").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::info!(path = %path.display(), routes = config.routes.len(), "Loaded config");
        Ok(config)
    }

    /// Parses TOML without validating.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - At least one route is configured
    /// - Route ids are unique
    /// - `initial_route`, `fallback_route` and every `then` name a declared route
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.is_empty() {
            return Err(invalid("At least one route must be configured".to_string()));
        }

        let mut ids = HashSet::new();
        for route in &self.routes {
            if route.id.trim().is_empty() {
                return Err(invalid("Route id must not be empty".to_string()));
            }
            if !ids.insert(route.id.as_str()) {
                return Err(invalid(format!("Route '{}' is declared twice", route.id)));
            }
        }

        let check = |what: &str, target: &str| {
            if ids.contains(target) {
                Ok(())
            } else {
                Err(invalid(format!(
                    "{what} '{target}' not found in configured routes"
                )))
            }
        };

        check("Initial route", &self.app.initial_route)?;
        if let Some(fallback) = &self.app.fallback_route {
            check("Fallback route", fallback)?;
        }
        for route in &self.routes {
            if let Some(then) = &route.then {
                check(&format!("Hand-off of route '{}'", route.id), then)?;
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError { message }
}
