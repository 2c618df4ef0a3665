use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, BlockId, BlockNumber, U256, U64},
    utils::format_ether,
};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::blockchain::traits::{
    BalanceFeed, BalanceReading, BalanceSubscription, ConnectionState, SendCapability,
    SubmissionReceipt, WalletSession,
};
use crate::bridge::request::TransferRequest;
use crate::core::config::AppConfig;
use crate::core::errors::BridgeError;

/// Signing client used once a wallet is connected.
pub type SignerClient<P> = SignerMiddleware<Provider<P>, LocalWallet>;

/// Builds the HTTP provider for the configured endpoint.
pub fn http_provider(config: &AppConfig) -> Result<Provider<Http>, BridgeError> {
    let rpc_url = config.resolved_rpc_url();
    let parsed_url = reqwest::Url::parse(&rpc_url).map_err(|e| {
        BridgeError::Config(format!("Invalid RPC URL '{}': {}", config.rpc_label(), e))
    })?;

    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));
    if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
        if let Ok(p) = reqwest::Proxy::all(proxy) {
            builder = builder.proxy(p);
        }
    }
    let client = builder
        .build()
        .map_err(|e| BridgeError::Config(format!("Failed to build HTTP client: {}", e)))?;

    info!(rpc = %config.rpc_label(), "Using chain-access endpoint");
    Ok(Provider::new(Http::new_with_client(parsed_url, client)))
}

/// Wallet session backed by a local signing key and an ethers provider.
///
/// `connect` loads the configured key and checks the endpoint's chain id;
/// `prepare_send` fills gas, fees and nonce; `send` signs and broadcasts.
pub struct EthereumSession<P: JsonRpcClient + Clone = Http> {
    provider: Provider<P>,
    chain_id: u64,
    app_name: String,
    walletconnect_project_id: String,
    private_key: Option<SecretString>,
    signer: RwLock<Option<Arc<SignerClient<P>>>>,
    connection: watch::Sender<ConnectionState>,
}

impl EthereumSession<Http> {
    pub fn from_config(config: &AppConfig) -> Result<Self, BridgeError> {
        Ok(Self::with_provider(http_provider(config)?, config))
    }
}

impl<P> EthereumSession<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    /// Creates a session over any provider, e.g. a `MockProvider` in tests.
    pub fn with_provider(provider: Provider<P>, config: &AppConfig) -> Self {
        let (connection, _) = watch::channel(ConnectionState::disconnected());
        Self {
            provider,
            chain_id: config.chain_id,
            app_name: config.app_name.clone(),
            walletconnect_project_id: config.walletconnect_project_id.clone(),
            private_key: config.wallet_private_key.clone(),
            signer: RwLock::new(None),
            connection,
        }
    }

    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer(&self) -> Result<Arc<SignerClient<P>>, BridgeError> {
        self.signer.read().clone().ok_or(BridgeError::NotConnected)
    }

    fn load_wallet(&self) -> Result<LocalWallet, BridgeError> {
        let key = self.private_key.as_ref().ok_or_else(|| {
            BridgeError::Wallet("no wallet key configured (set WALLET_PRIVATE_KEY)".to_string())
        })?;
        // Never echo the key or the parse error source.
        LocalWallet::from_str(key.expose_secret().trim())
            .map_err(|_| BridgeError::Wallet("WALLET_PRIVATE_KEY is not a valid private key".to_string()))
    }
}

#[async_trait]
impl<P> WalletSession for EthereumSession<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    async fn connect(&self) -> Result<Address, BridgeError> {
        let wallet = self.load_wallet()?;

        let remote_chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| BridgeError::Blockchain(format!("Failed to get chain ID: {}", e)))?
            .as_u64();
        if remote_chain_id != self.chain_id {
            return Err(BridgeError::Config(format!(
                "RPC endpoint is on chain {} but the page expects chain {}",
                remote_chain_id, self.chain_id
            )));
        }

        let wallet = wallet.with_chain_id(self.chain_id);
        let address = wallet.address();
        let client = SignerMiddleware::new(self.provider.clone(), wallet);
        *self.signer.write() = Some(Arc::new(client));
        self.connection.send_replace(ConnectionState::connected(address));

        info!(
            address = ?address,
            chain_id = self.chain_id,
            app = %self.app_name,
            "Wallet connected"
        );
        debug!(project = %self.walletconnect_project_id, "Wallet network identity");
        Ok(address)
    }

    fn disconnect(&self) {
        *self.signer.write() = None;
        self.connection.send_replace(ConnectionState::disconnected());
        info!("Wallet disconnected");
    }

    fn connection(&self) -> ConnectionState {
        self.connection.borrow().clone()
    }

    fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    async fn prepare_send(
        &self,
        destination: Address,
        value: U256,
    ) -> Result<SendCapability, BridgeError> {
        let client = self.signer()?;
        let request = TransferRequest { to: destination, value };
        let mut transaction = request.to_transaction(Some(client.address()));

        client.fill_transaction(&mut transaction, None).await.map_err(|e| {
            BridgeError::Unavailable(format!("Failed to prepare transaction: {}", e))
        })?;

        debug!(to = ?destination, value = %value, gas = ?transaction.gas(), "Send prepared");
        Ok(SendCapability { request, transaction })
    }

    async fn send(&self, capability: SendCapability) -> Result<SubmissionReceipt, BridgeError> {
        let client = self.signer()?;
        let from = client.address();

        let hash = client
            .send_transaction(capability.transaction, None)
            .await
            .map_err(|e| BridgeError::TransactionFailed(format!("Failed to send transaction: {}", e)))?
            .tx_hash();

        info!(tx_hash = ?hash, "Transaction sent");
        Ok(SubmissionReceipt {
            hash,
            from: Some(from),
            to: capability.request.to,
            value: capability.request.value,
        })
    }
}

/// Balance feed that re-reads the balance whenever the chain head moves.
pub struct ProviderBalanceFeed<P: JsonRpcClient + Clone = Http> {
    provider: Provider<P>,
    interval: Duration,
}

impl<P> ProviderBalanceFeed<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    pub fn new(provider: Provider<P>, interval: Duration) -> Self {
        Self { provider, interval }
    }
}

impl<P> BalanceFeed for ProviderBalanceFeed<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    fn subscribe(&self, address: Address) -> BalanceSubscription {
        let (sender, receiver) = watch::channel(BalanceReading::loading());
        let task = tokio::spawn(watch_balance(self.provider.clone(), address, self.interval, sender));
        BalanceSubscription::new(address, receiver, Some(task))
    }
}

async fn watch_balance<P>(
    provider: Provider<P>,
    address: Address,
    interval: Duration,
    sender: watch::Sender<BalanceReading>,
) where
    P: JsonRpcClient + Clone + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_block: Option<U64> = None;
    let mut last_amount = "0".to_string();

    loop {
        ticker.tick().await;
        if sender.is_closed() {
            break;
        }

        let block = match provider.get_block_number().await {
            Ok(block) => block,
            Err(e) => {
                warn!(address = ?address, error = %e, "Failed to read block number");
                last_block = None;
                sender.send_replace(BalanceReading::failed(last_amount.clone()));
                continue;
            }
        };
        if last_block == Some(block) {
            continue;
        }

        let at = BlockId::Number(BlockNumber::Number(block));
        match provider.get_balance(address, Some(at)).await {
            Ok(wei) => {
                last_block = Some(block);
                last_amount = format_ether(wei);
                debug!(address = ?address, block = %block, balance = %last_amount, "Balance refreshed");
                sender.send_replace(BalanceReading::known(last_amount.clone()));
            }
            Err(e) => {
                warn!(address = ?address, error = %e, "Failed to read balance");
                last_block = None;
                sender.send_replace(BalanceReading::failed(last_amount.clone()));
            }
        }
    }
}
