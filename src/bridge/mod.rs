pub mod amount;
pub mod form;
pub mod request;

pub use amount::{Affordability, AmountInput};
pub use form::{BridgeForm, PrepareStatus, SubmissionOutcome, SubmitState};
pub use request::{
    PreparationHandle, SubmissionHandle, TransactionRequester, TransferRequest, BRIDGE_CONTRACT,
    BRIDGE_CONTRACT_HEX,
};
