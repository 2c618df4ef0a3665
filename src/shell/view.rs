use ethers::types::Address;
use ethers::utils::to_checksum;
use std::fmt;

use crate::bridge::form::{BridgeForm, SubmissionOutcome, SubmitState};
use crate::core::units::format_display_amount;

pub const TITLE: &str = "Burn the Boats";
pub const DESCRIPTION: &str = "One-way ticket to Base";
pub const BALANCE_TITLE: &str = "Your Balance";
pub const INPUT_LABEL: &str = "Enter amount in ETH";
pub const SEND_LABEL: &str = "Send to Base";
pub const INSUFFICIENT_FUNDS: &str = "You dont have enough ETH...";
pub const CHECK_WALLET: &str = "Check Wallet";
pub const BALANCE_DISCONNECTED: &str = "0 ETH";
pub const BALANCE_LOADING: &str = "Fetching balance…";
pub const BALANCE_ERROR: &str = "Error fetching balance";

pub const WARNINGS: [&str; 3] = [
    "This app is NOT TESTED and exists FOR DEMONSTRATION PURPOSES ONLY!!",
    "You can only use this app to bridge to Base. YOU CANT BRIDGE BACK!!!",
    "It will take 5 minutes+ for funds to arrive on Base",
];

/// Connect affordance at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletBlock {
    Disconnected { error: Option<String> },
    Connected { address: Address },
}

/// Everything the page shows, derived from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub wallet: WalletBlock,
    pub balance: String,
    pub raw: String,
    pub button: SubmitState,
    pub can_submit: bool,
    pub insufficient_funds: bool,
    pub check_wallet: bool,
    pub result: Option<String>,
    pub message: Option<String>,
}

impl PageView {
    pub fn from_form(form: &BridgeForm) -> Self {
        let connection = form.connection();
        let wallet = match connection.active_address() {
            Some(address) => WalletBlock::Connected { address },
            None => WalletBlock::Disconnected { error: form.wallet_notice().map(str::to_string) },
        };

        Self {
            wallet,
            balance: balance_text(form),
            raw: form.raw().to_string(),
            button: form.submit_state(),
            can_submit: form.can_submit(),
            insufficient_funds: form.shows_insufficient_funds(),
            check_wallet: form.check_wallet(),
            result: form.outcome().map(result_text),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn balance_text(form: &BridgeForm) -> String {
    if !form.connection().connected {
        return BALANCE_DISCONNECTED.to_string();
    }
    match form.balance() {
        None => BALANCE_LOADING.to_string(),
        Some(reading) if reading.loading => BALANCE_LOADING.to_string(),
        Some(reading) if reading.error => BALANCE_ERROR.to_string(),
        Some(reading) => match format_display_amount(&reading.amount) {
            Some(amount) => format!("{} ETH", amount),
            None => BALANCE_ERROR.to_string(),
        },
    }
}

fn result_text(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Submitted(receipt) => {
            let json = serde_json::to_string(receipt).unwrap_or_else(|_| format!("{:?}", receipt));
            format!("Transaction: {}", json)
        }
        SubmissionOutcome::Failed(reason) => format!("Transaction failed: {}", reason),
    }
}

fn button_hint(state: SubmitState, enabled: bool) -> &'static str {
    match state {
        SubmitState::Pending => "pending",
        SubmitState::Settled => "settled",
        SubmitState::Preparing => "preparing",
        SubmitState::Ready if enabled => "ready (:send)",
        _ => "disabled",
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wallet {
            WalletBlock::Connected { address } => {
                writeln!(f, "[ {} ]  (:disconnect)", to_checksum(address, None))?
            }
            WalletBlock::Disconnected { error } => {
                writeln!(f, "[ Connect Wallet ]  (:connect)")?;
                if let Some(error) = error {
                    writeln!(f, "  {}", error)?;
                }
            }
        }
        writeln!(f)?;
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", DESCRIPTION)?;
        writeln!(f)?;
        writeln!(f, "{}", BALANCE_TITLE)?;
        writeln!(f, "  {}", self.balance)?;
        writeln!(f)?;
        writeln!(f, "{}", INPUT_LABEL)?;
        writeln!(f, "> {}", self.raw)?;
        writeln!(f, "[ {} ]  {}", SEND_LABEL, button_hint(self.button, self.can_submit))?;
        if self.insufficient_funds {
            writeln!(f, "{}", INSUFFICIENT_FUNDS)?;
        }
        if self.check_wallet {
            writeln!(f, "{}", CHECK_WALLET)?;
        }
        if let Some(result) = &self.result {
            writeln!(f, "{}", result)?;
        }
        writeln!(f)?;
        for warning in WARNINGS {
            writeln!(f, "  - {}", warning)?;
        }
        if let Some(message) = &self.message {
            writeln!(f)?;
            writeln!(f, "{}", message)?;
        }
        Ok(())
    }
}
