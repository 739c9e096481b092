// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol configuration

use crate::errors::ErrorCodec;
use crate::message::Envelope;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Envelope key used when nothing else is configured
pub const DEFAULT_NAMESPACE: &str = "__ns__flow-proxy";

/// Environment variable overriding the namespace
pub const NAMESPACE_ENV: &str = "FLOW_PROXY_NAMESPACE";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("namespace must not be empty")]
    EmptyNamespace,
}

/// Settings shared by both ends of a channel
///
/// Both ends must agree on the namespace, otherwise each ignores the other's
/// traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Defaults, overridden by `FLOW_PROXY_NAMESPACE` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(namespace) = std::env::var(NAMESPACE_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            config.namespace = namespace;
        }
        config
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        Ok(())
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::new(self.namespace.clone())
    }

    /// Marker key for serialized errors, derived from the namespace
    pub fn error_marker(&self) -> String {
        format!("{}_error", self.namespace)
    }

    pub fn error_codec(&self) -> ErrorCodec {
        ErrorCodec::new(self.error_marker())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
