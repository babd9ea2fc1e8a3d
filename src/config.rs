//! Configuration management

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::path::Path;
use std::str::FromStr;

use crate::tx_builder::{
    DEFAULT_FALLBACK_UNITS, MAX_COMPUTE_UNIT_LIMIT, MAX_TRANSACTION_SIZE, SIMULATION_MARGIN_UNITS,
};

/// Environment variable overriding the RPC endpoint
pub const RPC_ENV: &str = "NEXT_PUBLIC_RPC";
/// Environment variable overriding the compute-unit price
pub const MICROLAMPORTS_ENV: &str = "NEXT_PUBLIC_MICROLAMPORTS";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,

    /// processed, confirmed or finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// Priority fee per compute unit
    #[serde(default = "default_micro_lamports")]
    pub micro_lamports: u64,

    /// Limit requested when simulation is unusable
    #[serde(default = "default_fallback_units")]
    pub fallback_units: u32,

    /// Headroom added to simulated consumption
    #[serde(default = "default_margin_units")]
    pub margin_units: u32,

    /// Limit in slot 0 while a transaction is sized and simulated
    #[serde(default = "default_placeholder_units")]
    pub placeholder_units: u32,

    #[serde(default = "default_max_transaction_size")]
    pub max_transaction_size: usize,
}

fn default_rpc_endpoint() -> String { "https://api.devnet.solana.com".to_string() }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_micro_lamports() -> u64 { 1001 }
fn default_fallback_units() -> u32 { DEFAULT_FALLBACK_UNITS }
fn default_margin_units() -> u32 { SIMULATION_MARGIN_UNITS }
fn default_placeholder_units() -> u32 { MAX_COMPUTE_UNIT_LIMIT }
fn default_max_transaction_size() -> usize { MAX_TRANSACTION_SIZE }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            commitment: default_commitment(),
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            micro_lamports: default_micro_lamports(),
            fallback_units: default_fallback_units(),
            margin_units: default_margin_units(),
            placeholder_units: default_placeholder_units(),
            max_transaction_size: default_max_transaction_size(),
        }
    }
}

impl MintConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: MintConfig = toml::from_str(content).context("Invalid configuration TOML")?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration with `.env` and environment overrides.
    ///
    /// A missing file means defaults; the environment still applies.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `NEXT_PUBLIC_RPC` / `NEXT_PUBLIC_MICROLAMPORTS` from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(endpoint) = lookup(RPC_ENV).filter(|value| !value.trim().is_empty()) {
            self.rpc.endpoint = endpoint.trim().to_string();
        }

        if let Some(raw) = lookup(MICROLAMPORTS_ENV).filter(|value| !value.trim().is_empty()) {
            self.compute.micro_lamports = raw
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid u64: {}", MICROLAMPORTS_ENV, raw))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.endpoint.is_empty() {
            bail!("rpc.endpoint must not be empty");
        }
        self.commitment_config()?;

        let compute = &self.compute;
        if compute.fallback_units == 0 || compute.fallback_units > MAX_COMPUTE_UNIT_LIMIT {
            bail!(
                "compute.fallback_units must be in 1..={}, got {}",
                MAX_COMPUTE_UNIT_LIMIT,
                compute.fallback_units
            );
        }
        if compute.placeholder_units == 0 || compute.placeholder_units > MAX_COMPUTE_UNIT_LIMIT {
            bail!(
                "compute.placeholder_units must be in 1..={}, got {}",
                MAX_COMPUTE_UNIT_LIMIT,
                compute.placeholder_units
            );
        }
        if compute.max_transaction_size == 0 || compute.max_transaction_size > MAX_TRANSACTION_SIZE {
            bail!(
                "compute.max_transaction_size must be in 1..={}, got {}",
                MAX_TRANSACTION_SIZE,
                compute.max_transaction_size
            );
        }
        Ok(())
    }

    pub fn commitment_config(&self) -> anyhow::Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.rpc.commitment)
            .map_err(|e| anyhow::anyhow!("Invalid rpc.commitment {:?}: {}", self.rpc.commitment, e))
    }

    /// Nonblocking RPC client for the configured endpoint
    pub fn rpc_client(&self) -> anyhow::Result<RpcClient> {
        Ok(RpcClient::new_with_commitment(
            self.rpc.endpoint.clone(),
            self.commitment_config()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MintConfig::default();
        assert_eq!(config.rpc.endpoint, "https://api.devnet.solana.com");
        assert_eq!(config.compute.micro_lamports, 1001);
        assert_eq!(config.compute.fallback_units, 800_000);
        assert_eq!(config.compute.margin_units, 20_000);
        assert_eq!(config.compute.placeholder_units, 1_400_000);
        assert_eq!(config.compute.max_transaction_size, 1232);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = MintConfig::from_toml_str(
            r#"
            [compute]
            micro_lamports = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.compute.micro_lamports, 5);
        assert_eq!(config.compute.fallback_units, 800_000);
        assert_eq!(config.rpc, RpcConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (RPC_ENV, "https://rpc.example.org"),
            (MICROLAMPORTS_ENV, " 42 "),
        ]
        .into_iter()
        .collect();

        let mut config = MintConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.rpc.endpoint, "https://rpc.example.org");
        assert_eq!(config.compute.micro_lamports, 42);
    }

    #[test]
    fn test_bad_microlamports_is_rejected() {
        let mut config = MintConfig::default();
        let result = config.apply_overrides(|key| (key == MICROLAMPORTS_ENV).then(|| "lots".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_limits() {
        let mut config = MintConfig::default();
        config.compute.placeholder_units = 2_000_000;
        assert!(config.validate().is_err());

        let mut config = MintConfig::default();
        config.compute.max_transaction_size = 4096;
        assert!(config.validate().is_err());

        let mut config = MintConfig::default();
        config.rpc.commitment = "eventually".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[rpc]\nendpoint = \"http://localhost:8899\"\ncommitment = \"finalized\""
        )
        .unwrap();

        let config = MintConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rpc.endpoint, "http://localhost:8899");
        assert_eq!(
            config.commitment_config().unwrap(),
            CommitmentConfig::finalized()
        );
    }
}
