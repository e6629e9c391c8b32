//! Dockhand configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main dockhand configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Container engine configuration
    pub engine: EngineConfig,

    /// Project-relative paths
    pub paths: PathsConfig,

    /// Default build options applied when flags are omitted
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .dockhand.yml
        let local_config = PathBuf::from(".dockhand.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// External container engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine binary to invoke (docker, podman, ...)
    pub program: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }
}

/// Project-relative paths the tool reads and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The generated build file
    pub build_file: PathBuf,

    /// Root of the snapshot store
    pub backup_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_file: PathBuf::from("Dockerfile"),
            backup_dir: PathBuf::from(".dockhand/backups"),
        }
    }
}

/// Fallback build options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Runtime base-image version
    pub runtime_version: String,

    /// Application port
    pub port: String,

    /// Application entry point
    pub entry_point: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            runtime_version: "18".to_string(),
            port: "3000".to_string(),
            entry_point: "index.js".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.program, "docker");
        assert_eq!(config.paths.build_file, PathBuf::from("Dockerfile"));
        assert_eq!(config.paths.backup_dir, PathBuf::from(".dockhand/backups"));
        assert_eq!(config.defaults.runtime_version, "18");
        assert_eq!(config.defaults.port, "3000");
        assert_eq!(config.defaults.entry_point, "index.js");
    }

    #[test]
    fn test_load_from_file_partial() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("dockhand.yml");
        fs::write(&path, "engine:\n  program: podman\ndefaults:\n  port: \"8080\"\n").expect("write config");

        let config = Config::load(Some(&path)).expect("load config");
        assert_eq!(config.engine.program, "podman");
        assert_eq!(config.defaults.port, "8080");
        // Unspecified sections keep their defaults
        assert_eq!(config.defaults.runtime_version, "18");
        assert_eq!(config.paths.build_file, PathBuf::from("Dockerfile"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(&PathBuf::from("/nonexistent/dockhand.yml")));
        assert!(result.is_err());
    }
}
