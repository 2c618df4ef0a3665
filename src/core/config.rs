use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::core::errors::BridgeError;

/// Public mainnet endpoint used when neither an RPC URL nor an Alchemy key is set.
pub const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";
/// Ethereum mainnet.
pub const MAINNET_CHAIN_ID: u64 = 1;
/// Roughly one mainnet block.
pub const DEFAULT_BALANCE_POLL_SECS: u64 = 12;
/// Name the page announces to wallets.
pub const APP_NAME: &str = "TipJar";

/// Network section of the optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkFileConfig {
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
}

/// Balance section of the optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceFileConfig {
    pub poll_interval_secs: Option<u64>,
}

/// Shape of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub network: NetworkFileConfig,
    #[serde(default)]
    pub balance: BalanceFileConfig,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self, BridgeError> {
        toml::from_str(content).map_err(|e| BridgeError::Config(format!("invalid config file: {}", e)))
    }
}

/// Page configuration.
///
/// `alchemy_id` and `walletconnect_project_id` are opaque pass-through values:
/// the first only selects the RPC endpoint, the second is handed to the
/// wallet session as its network identity.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub alchemy_id: Option<SecretString>,
    pub walletconnect_project_id: String,
    pub rpc_url: Option<String>,
    pub chain_id: u64,
    pub balance_poll_interval: Duration,
    pub wallet_private_key: Option<SecretString>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            alchemy_id: None,
            walletconnect_project_id: "default".to_string(),
            rpc_url: None,
            chain_id: MAINNET_CHAIN_ID,
            balance_poll_interval: Duration::from_secs(DEFAULT_BALANCE_POLL_SECS),
            wallet_private_key: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file at `path` (or `CONFIG_PATH`) if any, then
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, BridgeError> {
        let mut config = Self::default();

        let file_path = path
            .map(|p| p.to_path_buf())
            .or_else(|| std::env::var("CONFIG_PATH").ok().map(Into::into));
        if let Some(file_path) = file_path {
            let content = std::fs::read_to_string(&file_path).map_err(|e| {
                BridgeError::Config(format!("cannot read {}: {}", file_path.display(), e))
            })?;
            config.apply_file(FileConfig::from_toml(&content)?);
            info!(path = %file_path.display(), "Loaded config file");
        }

        config.apply_env()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables only.
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(url) = file.network.rpc_url {
            self.rpc_url = Some(url);
        }
        if let Some(chain_id) = file.network.chain_id {
            self.chain_id = chain_id;
        }
        if let Some(secs) = file.balance.poll_interval_secs {
            self.balance_poll_interval = Duration::from_secs(secs.max(1));
        }
    }

    pub fn apply_env(&mut self) -> Result<(), BridgeError> {
        if let Some(key) = non_empty_var("ALCHEMY_API_KEY") {
            self.alchemy_id = Some(SecretString::new(key));
        }
        if let Some(id) = non_empty_var("WALLETCONNECT_PROJECT_ID") {
            self.walletconnect_project_id = id;
        }
        if let Some(url) = non_empty_var("BRIDGE_RPC_URL") {
            self.rpc_url = Some(url);
        }
        if let Some(chain_id) = non_empty_var("BRIDGE_CHAIN_ID") {
            self.chain_id = chain_id
                .parse()
                .map_err(|_| BridgeError::Config(format!("BRIDGE_CHAIN_ID is not a number: {}", chain_id)))?;
        }
        if let Some(secs) = non_empty_var("BRIDGE_BALANCE_POLL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                BridgeError::Config(format!("BRIDGE_BALANCE_POLL_SECS is not a number: {}", secs))
            })?;
            self.balance_poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(key) = non_empty_var("WALLET_PRIVATE_KEY") {
            self.wallet_private_key = Some(SecretString::new(key));
        }
        Ok(())
    }

    /// The chain-access endpoint: explicit URL, else Alchemy, else the public default.
    pub fn resolved_rpc_url(&self) -> String {
        if let Some(url) = &self.rpc_url {
            return url.trim().to_string();
        }
        match &self.alchemy_id {
            Some(key) => format!("https://eth-mainnet.g.alchemy.com/v2/{}", key.expose_secret()),
            None => DEFAULT_RPC_URL.to_string(),
        }
    }

    /// Endpoint label safe for logs.
    pub fn rpc_label(&self) -> String {
        match (&self.rpc_url, &self.alchemy_id) {
            (Some(url), _) => url.clone(),
            (None, Some(_)) => "alchemy (mainnet)".to_string(),
            (None, None) => DEFAULT_RPC_URL.to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_mainnet() {
        let config = AppConfig::default();
        assert_eq!(config.chain_id, MAINNET_CHAIN_ID);
        assert_eq!(config.walletconnect_project_id, "default");
        assert_eq!(config.resolved_rpc_url(), DEFAULT_RPC_URL);
        assert_eq!(config.app_name, "TipJar");
    }

    #[test]
    fn alchemy_key_selects_alchemy_endpoint() {
        let config = AppConfig {
            alchemy_id: Some(SecretString::new("abc123".to_string())),
            ..AppConfig::default()
        };
        assert_eq!(config.resolved_rpc_url(), "https://eth-mainnet.g.alchemy.com/v2/abc123");
        assert!(!config.rpc_label().contains("abc123"));
    }

    #[test]
    fn explicit_rpc_wins_over_alchemy() {
        let config = AppConfig {
            alchemy_id: Some(SecretString::new("abc123".to_string())),
            rpc_url: Some(" http://127.0.0.1:8545 ".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.resolved_rpc_url(), "http://127.0.0.1:8545");
    }

    #[test]
    fn file_overrides_defaults() {
        let file = FileConfig::from_toml(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            chain_id = 11155111

            [balance]
            poll_interval_secs = 0
            "#,
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.apply_file(file);
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.balance_poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn empty_file_is_fine() {
        let mut config = AppConfig::default();
        config.apply_file(FileConfig::from_toml("").unwrap());
        assert!(config.rpc_url.is_none());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let err = FileConfig::from_toml("[network]\nchain_id = \"one\"").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
