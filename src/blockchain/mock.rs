// In-process wallet session and balance feed for tests and `--demo` mode.
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::blockchain::traits::{
    BalanceFeed, BalanceReading, BalanceSubscription, ConnectionState, SendCapability,
    SubmissionReceipt, WalletSession,
};
use crate::bridge::request::TransferRequest;
use crate::core::errors::BridgeError;

/// How the mock answers `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSendOutcome {
    Succeed,
    Reject(String),
}

/// Wallet session that signs nothing and returns deterministic hashes.
pub struct MockWalletSession {
    address: Address,
    connection: watch::Sender<ConnectionState>,
    prepare_error: Mutex<Option<String>>,
    send_outcome: Mutex<MockSendOutcome>,
    send_delay: Duration,
    sent: Mutex<Vec<SendCapability>>,
}

impl MockWalletSession {
    pub fn new(address: Address) -> Self {
        let (connection, _) = watch::channel(ConnectionState::disconnected());
        Self {
            address,
            connection,
            prepare_error: Mutex::new(None),
            send_outcome: Mutex::new(MockSendOutcome::Succeed),
            send_delay: Duration::ZERO,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Delays every `send` answer, simulating a wallet waiting on the user.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Makes every subsequent preparation fail with `reason`, or succeed again with `None`.
    pub fn set_prepare_error(&self, reason: Option<&str>) {
        *self.prepare_error.lock() = reason.map(str::to_string);
    }

    pub fn set_send_outcome(&self, outcome: MockSendOutcome) {
        *self.send_outcome.lock() = outcome;
    }

    /// Capabilities passed to `send`, in order.
    pub fn sent(&self) -> Vec<SendCapability> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl WalletSession for MockWalletSession {
    async fn connect(&self) -> Result<Address, BridgeError> {
        self.connection.send_replace(ConnectionState::connected(self.address));
        info!(address = ?self.address, "Mock wallet connected");
        Ok(self.address)
    }

    fn disconnect(&self) {
        self.connection.send_replace(ConnectionState::disconnected());
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
        let from = self.connection().active_address().ok_or(BridgeError::NotConnected)?;
        let prepare_error = self.prepare_error.lock().clone();
        if let Some(reason) = prepare_error {
            return Err(BridgeError::Unavailable(reason));
        }
        let request = TransferRequest { to: destination, value };
        let transaction = request.to_transaction(Some(from));
        Ok(SendCapability { request, transaction })
    }

    async fn send(&self, capability: SendCapability) -> Result<SubmissionReceipt, BridgeError> {
        let from = self.connection().active_address().ok_or(BridgeError::NotConnected)?;
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        let outcome = self.send_outcome.lock().clone();
        match outcome {
            MockSendOutcome::Succeed => {
                let receipt = {
                    let mut sent = self.sent.lock();
                    sent.push(capability.clone());
                    SubmissionReceipt {
                        hash: H256::from_low_u64_be(sent.len() as u64),
                        from: Some(from),
                        to: capability.request.to,
                        value: capability.request.value,
                    }
                };
                Ok(receipt)
            }
            MockSendOutcome::Reject(reason) => Err(BridgeError::TransactionFailed(reason)),
        }
    }
}

/// Balance feed whose readings are pushed by hand.
pub struct ManualBalanceFeed {
    sender: watch::Sender<BalanceReading>,
}

impl ManualBalanceFeed {
    pub fn new(initial: BalanceReading) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Publishes a reading to every subscriber.
    pub fn push(&self, reading: BalanceReading) {
        self.sender.send_replace(reading);
    }
}

impl BalanceFeed for ManualBalanceFeed {
    fn subscribe(&self, address: Address) -> BalanceSubscription {
        BalanceSubscription::new(address, self.sender.subscribe(), None)
    }
}
