//! Adapter configuration: RPC endpoint, chain, transport limits.
//!
//! Load from: env `ANYONE_STAKING_CONFIG_PATH`, or `./config/anyone_staking.json`,
//! or `./anyone_staking.json`. Env `ANYONE_STAKING_RPC_URL` overrides the endpoint.

use crate::chain::RpcConfig;
use crate::staking::{Chain, RegistryError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

pub const CONFIG_PATH_ENV: &str = "ANYONE_STAKING_CONFIG_PATH";
pub const RPC_URL_ENV: &str = "ANYONE_STAKING_RPC_URL";

const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_BACKOFF_MS: u64 = 60_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rpc url {0:?}: {1}")]
    RpcUrl(String, url::ParseError),
    #[error("{field} = {value} exceeds limit {limit}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        limit: u64,
    },
    #[error("{0}")]
    Chain(#[from] RegistryError),
}

fn check_limit(field: &'static str, value: u64, limit: u64) -> Result<(), ConfigError> {
    if value > limit {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            limit,
        });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        let rpc = RpcConfig::default();
        Self {
            rpc_url: rpc.rpc_url,
            chain_id: Chain::Ethereum.id(),
            rate_limit_ms: rpc.rate_limit_ms,
            max_retries: rpc.max_retries,
            retry_backoff_ms: rpc.retry_backoff_ms,
            timeout_secs: rpc.timeout_secs,
        }
    }
}

impl AdapterConfig {
    /// Missing fields fall back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load config: env path, then the two default locations, else defaults.
    /// A file that fails to parse is reported and skipped.
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            candidates.push(path);
        }
        candidates.push("./config/anyone_staking.json".to_string());
        candidates.push("./anyone_staking.json".to_string());

        let mut config = candidates
            .iter()
            .map(Path::new)
            .filter(|p| p.exists())
            .find_map(|p| match Self::load_from_path(p) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring config file");
                    None
                }
            })
            .unwrap_or_default();
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            config.rpc_url = url;
        }
        config
    }

    pub fn chain(&self) -> Result<Chain, ConfigError> {
        Ok(Chain::from_id(self.chain_id)?)
    }

    pub fn rpc_config(&self) -> Result<RpcConfig, ConfigError> {
        url::Url::parse(&self.rpc_url).map_err(|e| ConfigError::RpcUrl(self.rpc_url.clone(), e))?;
        check_limit(
            "max_retries",
            u64::from(self.max_retries),
            u64::from(MAX_RETRIES_LIMIT),
        )?;
        check_limit("retry_backoff_ms", self.retry_backoff_ms, MAX_BACKOFF_MS)?;
        Ok(RpcConfig {
            rpc_url: self.rpc_url.clone(),
            rate_limit_ms: self.rate_limit_ms,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
            timeout_secs: self.timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_target_mainnet() {
        let c = AdapterConfig::default();
        assert_eq!(c.chain().unwrap(), Chain::Ethereum);
        assert!(c.rpc_config().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"rpc_url": "http://localhost:8545", "max_retries": 0}}"#).unwrap();
        let c = AdapterConfig::load_from_path(tmp.path()).unwrap();
        assert_eq!(c.rpc_url, "http://localhost:8545");
        assert_eq!(c.max_retries, 0);
        assert_eq!(c.chain_id, 1);
        assert_eq!(c.timeout_secs, AdapterConfig::default().timeout_secs);
    }

    #[test]
    fn bad_values_rejected() {
        let c = AdapterConfig {
            chain_id: 137,
            rpc_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(c.chain(), Err(ConfigError::Chain(_))));
        assert!(matches!(c.rpc_config(), Err(ConfigError::RpcUrl(..))));
    }

    #[test]
    fn retry_settings_bounded() {
        let many_retries = AdapterConfig {
            max_retries: 64,
            ..Default::default()
        };
        assert!(matches!(
            many_retries.rpc_config(),
            Err(ConfigError::OutOfRange {
                field: "max_retries",
                value: 64,
                ..
            })
        ));

        let long_backoff = AdapterConfig {
            retry_backoff_ms: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            long_backoff.rpc_config(),
            Err(ConfigError::OutOfRange {
                field: "retry_backoff_ms",
                ..
            })
        ));

        let at_limit = AdapterConfig {
            max_retries: MAX_RETRIES_LIMIT,
            retry_backoff_ms: MAX_BACKOFF_MS,
            ..Default::default()
        };
        assert!(at_limit.rpc_config().is_ok());
    }

    #[test]
    fn malformed_file_is_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{{not json").unwrap();
        assert!(matches!(
            AdapterConfig::load_from_path(tmp.path()),
            Err(ConfigError::Json(_))
        ));
    }
}
