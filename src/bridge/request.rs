//! Turning a typed amount into a transfer and handing it to the wallet session.

use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, Eip1559TransactionRequest, H160, U256,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::blockchain::traits::{SendCapability, SubmissionReceipt, WalletSession};
use crate::core::errors::{AmountError, BridgeError};
use crate::core::units::parse_ether_exact;

/// Destination of every submission, as shown to users.
pub const BRIDGE_CONTRACT_HEX: &str = "0x49048044d57e1c92a77f79988d21fa8faf74e97e";

/// Destination of every submission.
pub const BRIDGE_CONTRACT: Address = H160([
    0x49, 0x04, 0x80, 0x44, 0xd5, 0x7e, 0x1c, 0x92, 0xa7, 0x7f, 0x79, 0x98, 0x8d, 0x21, 0xfa, 0x8f,
    0xaf, 0x74, 0xe9, 0x7e,
]);

/// A plain value transfer to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
}

impl TransferRequest {
    /// Builds the bridge transfer for a typed ether amount.
    pub fn from_amount(raw: &str) -> Result<Self, AmountError> {
        Ok(Self { to: BRIDGE_CONTRACT, value: parse_ether_exact(raw)? })
    }

    /// Unsigned EIP-1559 transaction carrying this transfer. Gas, fees and
    /// nonce are left for the wallet session to fill.
    pub fn to_transaction(&self, from: Option<Address>) -> TypedTransaction {
        let mut tx = Eip1559TransactionRequest::new().to(self.to).value(self.value);
        if let Some(from) = from {
            tx = tx.from(from);
        }
        tx.into()
    }
}

/// Dispatches preparation and submission to the wallet session without
/// blocking the caller. Completion is observed through the returned handles.
#[derive(Clone)]
pub struct TransactionRequester {
    session: Arc<dyn WalletSession>,
}

impl TransactionRequester {
    pub fn new(session: Arc<dyn WalletSession>) -> Self {
        Self { session }
    }

    /// Asks the session to prepare `request`. Must be called inside a tokio runtime.
    pub fn prepare(&self, request: TransferRequest) -> PreparationHandle {
        let session = Arc::clone(&self.session);
        let (to, value) = (request.to, request.value);
        let task = tokio::spawn(async move { session.prepare_send(to, value).await });
        PreparationHandle { request, task }
    }

    /// Sends a prepared capability. Must be called inside a tokio runtime.
    pub fn invoke(&self, capability: SendCapability) -> SubmissionHandle {
        let session = Arc::clone(&self.session);
        info!(to = ?capability.request.to, value = %capability.request.value, "Submitting bridge transfer");
        let task = tokio::spawn(async move {
            let outcome = session.send(capability).await;
            match &outcome {
                Ok(receipt) => info!(tx_hash = ?receipt.hash, "Bridge transfer submitted"),
                Err(e) => warn!(error = %e, "Bridge transfer failed"),
            }
            outcome
        });
        SubmissionHandle { task }
    }
}

/// In-flight preparation. Dropping it aborts the preparation.
pub struct PreparationHandle {
    request: TransferRequest,
    task: JoinHandle<Result<SendCapability, BridgeError>>,
}

impl PreparationHandle {
    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    /// Waits for the session's answer.
    pub async fn join(&mut self) -> Result<SendCapability, BridgeError> {
        (&mut self.task).await?
    }
}

impl Drop for PreparationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// In-flight submission. Dropping the handle detaches it; a dispatched
/// submission is never cancelled.
pub struct SubmissionHandle {
    task: JoinHandle<Result<SubmissionReceipt, BridgeError>>,
}

impl SubmissionHandle {
    /// True while the wallet has not answered yet.
    pub fn is_loading(&self) -> bool {
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the wallet's answer.
    pub async fn join(&mut self) -> Result<SubmissionReceipt, BridgeError> {
        (&mut self.task).await?
    }
}
