//! Wallet provider capability.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::error::WalletError;

/// A contract interaction: transaction to send or read-only call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    /// Native value attached to the call, in wei.
    pub value: U256,
}

impl ContractCall {
    /// A call without attached value.
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    /// Set the sender.
    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Attach native value.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// 4-byte function selector, if present.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// An injected wallet: account access plus contract send/call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to grant account access.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Accounts already granted.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Sign and submit a transaction.
    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, WalletError>;

    /// Execute a read-only call against the latest block.
    async fn call(&self, call: ContractCall) -> Result<Bytes, WalletError>;
}
