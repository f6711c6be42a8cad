//! Configuration management for `qms`.
//!
//! Configuration is resolved in layers, later layers winning:
//! - Built-in defaults
//! - YAML file (`--config PATH`, or `qms.yaml` in the working directory)
//! - Environment variable overrides
//! - CLI flags (applied by the command itself)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "qms.yaml";

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_JWT_SECRET: &str = "qms-dev-secret";
const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub data: DataConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret.
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Load the demo data set at startup.
    pub seed: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit JSON log lines.
    pub json: bool,
}

impl Config {
    /// Parse a YAML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the document is not valid config YAML.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Parse` if it is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    /// Load from an explicit path, or from `qms.yaml` under `dir` if it
    /// exists, or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed. An
    /// explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            return Self::from_file(&candidate);
        }
        Ok(Self::default())
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// `QMS_BIND` beats `PORT`; `PORT` alone binds every interface.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnv` for a value that doesn't parse.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("QMS_BIND") {
            self.server.bind = bind;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: "PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
            self.server.bind = format!("0.0.0.0:{port}");
        }

        if let Some(secret) = lookup("QMS_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(ttl) = lookup("QMS_TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = ttl.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: "QMS_TOKEN_TTL_HOURS",
                    value: ttl.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(seed) = lookup("QMS_SEED") {
            self.data.seed = parse_bool(&seed).ok_or_else(|| ConfigError::InvalidEnv {
                var: "QMS_SEED",
                value: seed.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }

        Ok(())
    }

    /// Defaults, then file, then process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment value is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::discover(explicit, &dir)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
