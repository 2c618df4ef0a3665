use async_trait::async_trait;
use ethers::types::{transaction::eip2718::TypedTransaction, Address, H256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bridge::request::TransferRequest;
use crate::core::errors::BridgeError;

/// Connection as reported by the wallet session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub address: Option<Address>,
    pub connected: bool,
}

impl ConnectionState {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address) -> Self {
        Self { address: Some(address), connected: true }
    }

    /// The account address, only while connected.
    pub fn active_address(&self) -> Option<Address> {
        if self.connected {
            self.address
        } else {
            None
        }
    }
}

/// One balance observation pushed by a [`BalanceFeed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReading {
    /// Decimal ether string, full precision.
    pub amount: String,
    pub loading: bool,
    pub error: bool,
}

impl BalanceReading {
    pub fn loading() -> Self {
        Self { amount: "0".to_string(), loading: true, error: false }
    }

    pub fn known(amount: impl Into<String>) -> Self {
        Self { amount: amount.into(), loading: false, error: false }
    }

    /// Marks the reading as failed, keeping the last amount for reference.
    pub fn failed(last_amount: impl Into<String>) -> Self {
        Self { amount: last_amount.into(), loading: false, error: true }
    }

    /// The balance as a decimal, or `None` while it is unknown (loading,
    /// erroring or unparseable).
    pub fn value(&self) -> Option<Decimal> {
        if self.loading || self.error {
            return None;
        }
        Decimal::from_str(self.amount.trim()).ok()
    }
}

/// A send the wallet session has prepared and is ready to sign.
#[derive(Debug, Clone, PartialEq)]
pub struct SendCapability {
    pub request: TransferRequest,
    pub transaction: TypedTransaction,
}

/// What the wallet session reports once a transaction has been handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub hash: H256,
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
}

/// The wallet side of the page: connection, preparation and sending.
///
/// Implementations own the connection state; the page only observes it.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Connects the wallet and returns the account address.
    async fn connect(&self) -> Result<Address, BridgeError>;

    /// Drops the connection. Idempotent.
    fn disconnect(&self);

    /// Current connection snapshot.
    fn connection(&self) -> ConnectionState;

    /// Receiver that is notified on every connection change.
    fn watch_connection(&self) -> watch::Receiver<ConnectionState>;

    /// Builds a ready-to-sign transaction for `value` wei to `destination`.
    async fn prepare_send(
        &self,
        destination: Address,
        value: U256,
    ) -> Result<SendCapability, BridgeError>;

    /// Signs and broadcasts a prepared transaction.
    async fn send(&self, capability: SendCapability) -> Result<SubmissionReceipt, BridgeError>;
}

/// Push-based balance source.
pub trait BalanceFeed: Send + Sync {
    /// Starts watching `address`. Must be called inside a tokio runtime.
    fn subscribe(&self, address: Address) -> BalanceSubscription;
}

/// A live balance stream for one address. Dropping it stops the watcher.
pub struct BalanceSubscription {
    address: Address,
    receiver: watch::Receiver<BalanceReading>,
    task: Option<JoinHandle<()>>,
}

impl BalanceSubscription {
    pub fn new(
        address: Address,
        receiver: watch::Receiver<BalanceReading>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self { address, receiver, task }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Latest reading without waiting.
    pub fn current(&mut self) -> BalanceReading {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next reading.
    pub async fn changed(&mut self) -> Result<BalanceReading, BridgeError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| BridgeError::Blockchain("balance feed closed".to_string()))?;
        Ok(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for BalanceSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_value_is_unknown_while_loading_or_failed() {
        assert_eq!(BalanceReading::loading().value(), None);
        assert_eq!(BalanceReading::failed("2.0").value(), None);
        assert_eq!(BalanceReading::known("not a number").value(), None);
        assert_eq!(BalanceReading::known("2.000000000000000000").value(), Decimal::from_str("2").ok());
    }

    #[test]
    fn active_address_requires_connection() {
        let addr = Address::repeat_byte(0x11);
        assert_eq!(ConnectionState::connected(addr).active_address(), Some(addr));
        let stale = ConnectionState { address: Some(addr), connected: false };
        assert_eq!(stale.active_address(), None);
    }

    #[test]
    fn receipt_serializes_camel_case() {
        let receipt = SubmissionReceipt {
            hash: H256::from_low_u64_be(1),
            from: None,
            to: Address::zero(),
            value: U256::from(5u64),
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["value"], "0x5");
        assert!(json.get("hash").is_some());
    }
}
