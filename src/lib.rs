// src/lib.rs

pub mod blockchain;
pub mod bridge;
pub mod cli;
pub mod context;
pub mod core;
pub mod shell;

pub use crate::bridge::{BridgeForm, TransferRequest, BRIDGE_CONTRACT};
pub use crate::context::{context, init_context, AppContext};
pub use crate::core::errors::{AmountError, BridgeError};
