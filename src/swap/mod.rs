//! DEX token swaps through an injected wallet.
//!
//! The widget never talks to a chain directly: everything goes through a
//! [`WalletProvider`], which makes the flow testable against a mock.

mod provider;
pub mod router;
mod rpc;
mod tokens;
mod widget;

pub use provider::{ContractCall, WalletProvider};
pub use rpc::{JsonRpcWallet, USER_REJECTED_CODE};
pub use tokens::{Token, TokenCategory, TokenRegistry, WBNB};
pub use widget::{SwapOutcome, SwapRequest, SwapState, SwapStatus, SwapWidget};

#[cfg(test)]
pub use provider::MockWalletProvider;
