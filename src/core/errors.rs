use thiserror::Error;

/// Errors raised while turning typed text into an on-chain amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Nothing was typed.
    #[error("Amount cannot be empty")]
    Empty,
    /// The text is not a plain decimal number (`1`, `1.5`, `.5`).
    #[error("Not a plain decimal amount: {0}")]
    NotDecimal(String),
    /// Zero or negative amounts.
    #[error("Amount must be positive")]
    NotPositive,
    /// A non-zero digit sits beyond the unit's precision.
    #[error("Amount has more than {max} fractional digits")]
    TooPrecise { max: usize },
    /// The value does not fit in 256 bits of base units.
    #[error("Amount overflows the base unit range")]
    Overflow,
}

/// Errors surfaced by the wallet session, the chain client and the page plumbing.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The amount could not be converted into a transfer value.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    /// An operation needed a connected wallet.
    #[error("Wallet not connected")]
    NotConnected,
    /// Wallet/signer errors (missing key, rejected connection).
    #[error("Wallet error: {0}")]
    Wallet(String),
    /// RPC and chain interaction errors.
    #[error("Blockchain error: {0}")]
    Blockchain(String),
    /// The session could not prepare a send for the requested transfer.
    #[error("Send unavailable: {0}")]
    Unavailable(String),
    /// The transaction was rejected or failed to broadcast.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// Global context misuse.
    #[error("Context error: {0}")]
    Context(String),
    /// A spawned task panicked or was aborted.
    #[error("Task error: {0}")]
    Task(String),
    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Errors the user can clear by trying again without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Blockchain(_) | BridgeError::Unavailable(_))
    }
}

impl From<tokio::task::JoinError> for BridgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        BridgeError::Task(err.to_string())
    }
}
