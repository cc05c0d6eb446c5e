//! Simple config loader using TOML and serde.
//! The config struct is intentionally small and typed for the DKG node surfaces.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct DkgConfig {
    /// Chain identifier signed into every off-chain DKG message.
    pub chain_id: Option<String>,

    /// Round cadence in blocks. Zero or absent falls back to the default
    /// cadence at coordinator construction.
    pub dkg_num_blocks: Option<u64>,

    /// RPC endpoint of the local node (e.g. "tcp://localhost:26657").
    pub node_endpoint: Option<String>,

    /// Home directory for the client keystore.
    pub cli_home: Option<String>,
}

impl Default for DkgConfig {
    fn default() -> Self {
        DkgConfig {
            chain_id: Some("rchain".to_string()),
            dkg_num_blocks: None,
            node_endpoint: Some("tcp://localhost:26657".to_string()),
            cli_home: Some("~/.rcli".to_string()),
        }
    }
}

/// Load config from a TOML file path.
/// If the file is missing or parse fails, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<DkgConfig, ConfigError> {
    let s = fs::read_to_string(path.as_ref())?;
    let cfg: DkgConfig = toml::from_str(&s)?;
    Ok(cfg)
}
