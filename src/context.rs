//! Process-wide collaborators shared by the page: configuration, the wallet
//! session and the balance feed.

use ethers::types::{Address, H160};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::blockchain::ethereum::{EthereumSession, ProviderBalanceFeed};
use crate::blockchain::mock::{ManualBalanceFeed, MockWalletSession};
use crate::blockchain::traits::{BalanceFeed, BalanceReading, WalletSession};
use crate::core::config::AppConfig;
use crate::core::errors::BridgeError;

/// Account used by `--demo`.
pub const DEMO_ADDRESS: Address = H160([0xde; 20]);
/// Balance shown by `--demo`.
pub const DEMO_BALANCE: &str = "2.5";

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub session: Arc<dyn WalletSession>,
    pub balances: Arc<dyn BalanceFeed>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("app_name", &self.config.app_name)
            .field("chain_id", &self.config.chain_id)
            .field("connection", &self.session.connection())
            .finish()
    }
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        session: Arc<dyn WalletSession>,
        balances: Arc<dyn BalanceFeed>,
    ) -> Self {
        Self { config, session, balances }
    }

    /// Live context: ethers provider over HTTP, local signer, block-driven balance.
    pub fn ethereum(config: AppConfig) -> Result<Self, BridgeError> {
        let session = EthereumSession::from_config(&config)?;
        let balances =
            ProviderBalanceFeed::new(session.provider().clone(), config.balance_poll_interval);
        info!(chain_id = config.chain_id, rpc = %config.rpc_label(), "Ethereum context ready");
        Ok(Self::new(config, Arc::new(session), Arc::new(balances)))
    }

    /// Offline context: nothing leaves the process.
    pub fn demo(config: AppConfig) -> Self {
        let session = MockWalletSession::new(DEMO_ADDRESS).with_send_delay(Duration::from_millis(800));
        let balances = ManualBalanceFeed::new(BalanceReading::known(DEMO_BALANCE));
        info!(address = ?DEMO_ADDRESS, "Demo context ready");
        Self::new(config, Arc::new(session), Arc::new(balances))
    }
}

static CONTEXT: OnceCell<AppContext> = OnceCell::new();

/// Installs the context for the rest of the process. Fails if called twice.
pub fn init_context(ctx: AppContext) -> Result<&'static AppContext, BridgeError> {
    CONTEXT
        .set(ctx)
        .map_err(|_| BridgeError::Context("context already initialized".to_string()))?;
    context()
}

/// The installed context, or an error if [`init_context`] has not run.
pub fn context() -> Result<&'static AppContext, BridgeError> {
    CONTEXT
        .get()
        .ok_or_else(|| BridgeError::Context("context read before initialization".to_string()))
}
