pub mod ethereum;
pub mod mock;
pub mod traits;

pub use ethereum::{EthereumSession, ProviderBalanceFeed};
pub use mock::{ManualBalanceFeed, MockSendOutcome, MockWalletSession};
pub use traits::{
    BalanceFeed, BalanceReading, BalanceSubscription, ConnectionState, SendCapability,
    SubmissionReceipt, WalletSession,
};
