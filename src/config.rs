//! Planner configuration.

use crate::registration::RegistrationSettings;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the HTTP bind address.
pub const HTTP_ADDR_ENV: &str = "TASKPLAN_HTTP_ADDR";

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "taskplan.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid http address '{0}'")]
    InvalidAddr(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Export settings handed to the registration payload builder
    #[serde(default)]
    pub registration: RegistrationSettings,

    /// Bind address of the HTTP server
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Plan document loaded at startup, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<PathBuf>,
}

fn default_http_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            registration: RegistrationSettings::default(),
            http_addr: default_http_addr(),
            plan_path: None,
        }
    }
}

impl PlannerConfig {
    /// Load config from `path`, or from `taskplan.json` in the working
    /// directory, or fall back to defaults. The environment override is
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_addr_override(std::env::var(HTTP_ADDR_ENV).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PlannerConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_addr_override(mut self, addr: Option<String>) -> Self {
        if let Some(addr) = addr.filter(|value| !value.trim().is_empty()) {
            self.http_addr = addr.trim().to_string();
        }
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.http_addr.clone()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::RelationMode;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskplan.json");
        std::fs::write(&path, r#"{"registration":{"relation_mode":"dependency"}}"#).unwrap();
        let config = PlannerConfig::from_file(&path).unwrap();
        assert_eq!(config.registration.relation_mode, RelationMode::Dependency);
        assert_eq!(config.http_addr, "0.0.0.0:3000");
        assert!(config.plan_path.is_none());
    }

    #[test]
    fn addr_override_and_parse() {
        let config = PlannerConfig::default().with_addr_override(Some("127.0.0.1:8088".into()));
        assert_eq!(config.socket_addr().unwrap().port(), 8088);
        let config = config.with_addr_override(Some("   ".into()));
        assert_eq!(config.http_addr, "127.0.0.1:8088");
        let bad = PlannerConfig::default().with_addr_override(Some("nowhere".into()));
        assert!(matches!(bad.socket_addr(), Err(ConfigError::InvalidAddr(_))));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = PlannerConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
