//! State of the bridge form: the amount, what the wallet and balance feed
//! last reported, and where the send button stands.
//!
//! The form never talks to the wallet itself. The page loop asks it for work
//! ([`BridgeForm::take_preparation_job`], [`BridgeForm::submit`]) and feeds the
//! answers back in ([`BridgeForm::on_prepared`], [`BridgeForm::on_submitted`]).

use tracing::debug;

use crate::blockchain::traits::{BalanceReading, ConnectionState, SendCapability, SubmissionReceipt};
use crate::bridge::amount::{Affordability, AmountInput};
use crate::bridge::request::TransferRequest;
use crate::core::errors::BridgeError;

/// Preparation of the send capability for the current request.
#[derive(Debug, Clone, PartialEq)]
pub enum PrepareStatus {
    NotStarted,
    InFlight,
    Ready(SendCapability),
    Unavailable(String),
}

/// Send button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Preparing,
    Ready,
    Pending,
    Settled,
}

/// Last answer from the wallet for an invoked send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted(SubmissionReceipt),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct BridgeForm {
    input: AmountInput,
    request: Option<TransferRequest>,
    connection: ConnectionState,
    balance: Option<BalanceReading>,
    prepare: PrepareStatus,
    pending: bool,
    settled: bool,
    outcome: Option<SubmissionOutcome>,
    wallet_notice: Option<String>,
}

impl Default for BridgeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeForm {
    pub fn new() -> Self {
        Self {
            input: AmountInput::new(),
            request: None,
            connection: ConnectionState::disconnected(),
            balance: None,
            prepare: PrepareStatus::NotStarted,
            pending: false,
            settled: false,
            outcome: None,
            wallet_notice: None,
        }
    }

    pub fn raw(&self) -> &str {
        self.input.raw()
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn balance(&self) -> Option<&BalanceReading> {
        self.balance.as_ref()
    }

    pub fn request(&self) -> Option<&TransferRequest> {
        self.request.as_ref()
    }

    pub fn prepare_status(&self) -> &PrepareStatus {
        &self.prepare
    }

    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    pub fn wallet_notice(&self) -> Option<&str> {
        self.wallet_notice.as_deref()
    }

    /// Replaces the amount text. Any prepared capability is discarded.
    pub fn set_input(&mut self, raw: impl Into<String>) {
        self.input.set(raw);
        self.settled = false;
        self.refresh_request();
    }

    fn refresh_request(&mut self) {
        self.request = if self.input.is_numeric() {
            TransferRequest::from_amount(self.input.raw()).ok()
        } else {
            None
        };
        self.prepare = PrepareStatus::NotStarted;
    }

    /// Takes a new connection snapshot. Returns true when it changed.
    pub fn on_connection(&mut self, state: ConnectionState) -> bool {
        if self.connection == state {
            return false;
        }
        if self.connection.active_address() != state.active_address() {
            self.balance = None;
            self.prepare = PrepareStatus::NotStarted;
        }
        if state.connected {
            self.wallet_notice = None;
        }
        self.connection = state;
        true
    }

    pub fn on_balance(&mut self, reading: BalanceReading) {
        self.balance = Some(reading);
    }

    pub fn on_connect_error(&mut self, error: &BridgeError) {
        self.wallet_notice = Some(error.to_string());
    }

    pub fn is_numeric(&self) -> bool {
        self.input.is_numeric()
    }

    /// `None` when the amount is not numeric. Unknown while disconnected.
    pub fn affordability(&self) -> Option<Affordability> {
        let balance = if self.connection.connected { self.balance.as_ref() } else { None };
        self.input.affordability(balance)
    }

    pub fn shows_insufficient_funds(&self) -> bool {
        self.affordability() == Some(Affordability::Insufficient)
    }

    pub fn send_ready(&self) -> bool {
        matches!(self.prepare, PrepareStatus::Ready(_))
    }

    /// True while a submission is waiting on the wallet.
    pub fn check_wallet(&self) -> bool {
        self.pending
    }

    pub fn can_submit(&self) -> bool {
        !self.pending
            && !self.input.is_empty()
            && self.input.is_numeric()
            && self.connection.connected
            && self.affordability().is_some_and(Affordability::is_affordable)
            && self.send_ready()
    }

    /// Hands out the request to prepare, if one is due. Marks it in flight.
    pub fn take_preparation_job(&mut self) -> Option<TransferRequest> {
        if self.pending || self.prepare != PrepareStatus::NotStarted || !self.connection.connected {
            return None;
        }
        let request = self.request.clone()?;
        self.prepare = PrepareStatus::InFlight;
        Some(request)
    }

    /// Records a preparation answer. Answers for a request that is no longer
    /// current are dropped; returns false in that case.
    pub fn on_prepared(
        &mut self,
        request: &TransferRequest,
        result: Result<SendCapability, BridgeError>,
    ) -> bool {
        if self.prepare != PrepareStatus::InFlight || self.request.as_ref() != Some(request) {
            debug!(value = %request.value, "Dropping stale preparation");
            return false;
        }
        self.prepare = match result {
            Ok(capability) if &capability.request == request => PrepareStatus::Ready(capability),
            Ok(_) => PrepareStatus::Unavailable("prepared transfer does not match amount".to_string()),
            Err(e) => PrepareStatus::Unavailable(e.to_string()),
        };
        true
    }

    /// Starts a submission. No-op unless [`Self::can_submit`] holds.
    pub fn submit(&mut self) -> Option<SendCapability> {
        if !self.can_submit() {
            return None;
        }
        let PrepareStatus::Ready(capability) = &self.prepare else {
            return None;
        };
        let capability = capability.clone();
        self.pending = true;
        self.settled = false;
        self.outcome = None;
        Some(capability)
    }

    /// Records the wallet's answer. Success clears the amount; failure keeps
    /// it and re-prepares so the user can retry.
    pub fn on_submitted(&mut self, result: Result<SubmissionReceipt, BridgeError>) {
        self.pending = false;
        self.settled = true;
        match result {
            Ok(receipt) => {
                self.outcome = Some(SubmissionOutcome::Submitted(receipt));
                self.input.clear();
                self.refresh_request();
            }
            Err(e) => {
                let reason = match e {
                    BridgeError::TransactionFailed(reason) => reason,
                    other => other.to_string(),
                };
                self.outcome = Some(SubmissionOutcome::Failed(reason));
                self.prepare = PrepareStatus::NotStarted;
            }
        }
    }

    /// `Settled` holds after an answer until the amount is edited or a
    /// retry becomes submittable.
    pub fn submit_state(&self) -> SubmitState {
        if self.pending {
            return SubmitState::Pending;
        }
        if self.can_submit() {
            return SubmitState::Ready;
        }
        if self.settled {
            return SubmitState::Settled;
        }
        match self.prepare {
            PrepareStatus::InFlight => SubmitState::Preparing,
            _ => SubmitState::Idle,
        }
    }
}
