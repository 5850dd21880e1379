//! Configuration system for rollclaim.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $ROLLCLAIM_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/rollclaim/config.toml
//!   3. ~/.config/rollclaim/config.toml

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollclaimConfig {
    pub network: NetworkConfig,
    pub dapp: DappConfig,
    pub submit: SubmitConfig,
    pub inspect: InspectConfig,
    pub ipfs: IpfsConfig,
    /// Known chains, keyed by chain id (e.g. "0x7a69").
    pub chains: BTreeMap<String, ChainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain id of the currently connected network.
    pub chain_id: String,
}

/// One entry of the chain table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub token: String,
    pub label: String,
    pub rpc_url: String,
    /// Base URL of the rollup inspect server. Empty = no inspect interface.
    pub inspect_api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DappConfig {
    /// Address of the rollup application inputs are sent to.
    pub address: String,
    /// Address of the InputBox contract.
    pub input_box: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    /// Account that signs inputs. Empty = first account reported by the node.
    pub sender: String,
    /// Payloads above this many bytes are sent as `validateChunk` inputs.
    pub max_chunk_size: usize,
    pub chunk_encoding: ChunkEncoding,
}

/// How an oversized validation payload is cut into `validateChunk` inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkEncoding {
    /// Compressed, hex frames with index headers (what the application reassembles).
    Framed,
    /// Raw text fragments.
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub on_empty: EmptyReportPolicy,
}

/// What a view does with a previously displayed value when an inspect call
/// returns no reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyReportPolicy {
    Retain,
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpfsConfig {
    pub gateway: String,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const LOCAL_CHAIN_ID: &str = "0x7a69";

impl Default for RollclaimConfig {
    fn default() -> Self {
        let mut chains = BTreeMap::new();
        chains.insert(
            LOCAL_CHAIN_ID.to_string(),
            ChainConfig {
                token: "ETH".to_string(),
                label: "localhost".to_string(),
                rpc_url: "http://localhost:8545".to_string(),
                inspect_api_url: "http://localhost:5005".to_string(),
            },
        );
        Self {
            network: NetworkConfig::default(),
            dapp: DappConfig::default(),
            submit: SubmitConfig::default(),
            inspect: InspectConfig::default(),
            ipfs: IpfsConfig::default(),
            chains,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: LOCAL_CHAIN_ID.to_string(),
        }
    }
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            address: "0x142105FC8dA71191b3a13C738Ba0cF4BC33325e2".to_string(),
            input_box: "0x59b22D57D4f067708AB0c00552767405926dc768".to_string(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            max_chunk_size: 409_600,
            chunk_encoding: ChunkEncoding::Framed,
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            on_empty: EmptyReportPolicy::Retain,
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            gateway: "https://ipfs.io/ipfs".to_string(),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("rollclaim")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("chain {0} is not configured")]
    UnknownChain(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl RollclaimConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            RollclaimConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file without applying env overrides.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("ROLLCLAIM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&RollclaimConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// The chain table entry for the currently connected network.
    pub fn active_chain(&self) -> Result<&ChainConfig, ConfigError> {
        self.chains
            .get(&self.network.chain_id)
            .ok_or_else(|| ConfigError::UnknownChain(self.network.chain_id.clone()))
    }

    /// Apply ROLLCLAIM_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ROLLCLAIM_NETWORK__CHAIN_ID") {
            self.network.chain_id = v;
        }
        if let Ok(v) = std::env::var("ROLLCLAIM_DAPP__ADDRESS") {
            self.dapp.address = v;
        }
        if let Ok(v) = std::env::var("ROLLCLAIM_DAPP__INPUT_BOX") {
            self.dapp.input_box = v;
        }
        if let Ok(v) = std::env::var("ROLLCLAIM_SUBMIT__SENDER") {
            self.submit.sender = v;
        }
        if let Ok(v) = std::env::var("ROLLCLAIM_SUBMIT__MAX_CHUNK_SIZE") {
            if let Ok(n) = v.parse() {
                self.submit.max_chunk_size = n;
            }
        }
        if let Ok(v) = std::env::var("ROLLCLAIM_IPFS__GATEWAY") {
            self.ipfs.gateway = v;
        }
    }
}
