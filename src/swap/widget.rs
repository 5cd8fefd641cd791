//! Swap form state machine.
//!
//! `Disconnected -> Connecting -> Connected -> Submitting -> Connected`.
//! A failed connect returns to `Disconnected`; a finished swap, successful
//! or not, returns to `Connected` with the outcome recorded.

use alloy_primitives::{Address, TxHash, U256};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::router;
use super::{ContractCall, Token, TokenRegistry, WalletProvider};
use crate::config::{MinOutPolicy, WalletConfig};
use crate::error::{Error, Result, WalletError};

/// Connection status of the swap widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Submitting,
}

impl SwapStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Submitting => "Submitting...",
        }
    }
}

/// Result of the last submitted swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Succeeded { tx: TxHash },
    Failed { message: String },
}

/// Observable widget state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapState {
    pub status: SwapStatus,
    pub account: Option<Address>,
    pub last_outcome: Option<SwapOutcome>,
    /// Last connect or validation error.
    pub last_error: Option<String>,
}

/// A swap the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub slippage_percent: Decimal,
}

/// Builds and submits router swaps through an injected wallet.
pub struct SwapWidget {
    provider: Option<Arc<dyn WalletProvider>>,
    router: Address,
    native_symbol: String,
    deadline_secs: u64,
    policy: MinOutPolicy,
    tokens: TokenRegistry,
    state: Arc<watch::Sender<SwapState>>,
}

impl SwapWidget {
    /// Create a widget. `provider` is `None` when no wallet is injected.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, config: &WalletConfig) -> Result<Self> {
        let router = config
            .router_address
            .parse::<Address>()
            .map_err(|e| Error::config(format!("invalid router address: {e}")))?;
        let (state, _) = watch::channel(SwapState::default());

        Ok(Self {
            provider,
            router,
            native_symbol: config.native_symbol.clone(),
            deadline_secs: config.deadline_secs,
            policy: config.min_out_policy,
            tokens: TokenRegistry::default(),
            state: Arc::new(state),
        })
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    pub fn subscribe(&self) -> watch::Receiver<SwapState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SwapState {
        self.state.borrow().clone()
    }

    /// Request account access from the provider.
    pub async fn connect(&self) -> Result<Address> {
        let Some(provider) = self.provider.clone() else {
            let err = WalletError::Unavailable;
            self.state.send_modify(|s| s.last_error = Some(err.to_string()));
            return Err(err.into());
        };

        let previous = self.snapshot();
        if let (SwapStatus::Connected | SwapStatus::Submitting, Some(account)) =
            (previous.status, previous.account)
        {
            return Ok(account);
        }

        self.state.send_modify(|s| {
            s.status = SwapStatus::Connecting;
            s.last_error = None;
        });

        let accounts = match provider.request_accounts().await {
            Ok(accounts) if accounts.is_empty() => provider.accounts().await,
            other => other,
        };

        match accounts.map(|a| a.first().copied()) {
            Ok(Some(account)) => {
                info!(%account, "Wallet connected");
                self.state.send_modify(|s| {
                    s.status = SwapStatus::Connected;
                    s.account = Some(account);
                });
                Ok(account)
            }
            Ok(None) => self.connect_failed(WalletError::Unavailable),
            Err(err) => self.connect_failed(err),
        }
    }

    fn connect_failed(&self, err: WalletError) -> Result<Address> {
        warn!(error = %err, "Wallet connect failed");
        self.state.send_modify(|s| {
            s.status = SwapStatus::Disconnected;
            s.account = None;
            s.last_error = Some(err.to_string());
        });
        Err(err.into())
    }

    /// Forget the connected account.
    pub fn disconnect(&self) {
        self.state.send_replace(SwapState::default());
    }

    /// Validate, build and submit a swap. Requires a connected wallet.
    pub async fn swap(&self, request: &SwapRequest) -> Result<TxHash> {
        let (provider, account) = match self.validate(request) {
            Ok(ready) => ready,
            Err(err) => {
                self.state.send_modify(|s| s.last_error = Some(err.user_message("")));
                return Err(err);
            }
        };
        let from = self.tokens.require(&request.from)?.clone();
        let to = self.tokens.require(&request.to)?.clone();

        self.state.send_modify(|s| {
            s.status = SwapStatus::Submitting;
            s.last_error = None;
        });
        info!(from = from.symbol, to = to.symbol, amount = %request.amount, "Submitting swap");

        let result = self
            .submit(provider.as_ref(), account, &from, &to, request)
            .await;

        let outcome = match &result {
            Ok(tx) => {
                info!(%tx, "Swap submitted");
                SwapOutcome::Succeeded { tx: *tx }
            }
            Err(err) => {
                warn!(error = %err, "Swap failed");
                SwapOutcome::Failed {
                    message: err.user_message("Swap failed"),
                }
            }
        };
        self.state.send_modify(|s| {
            s.status = SwapStatus::Connected;
            s.last_outcome = Some(outcome);
        });
        result
    }

    fn validate(&self, request: &SwapRequest) -> Result<(Arc<dyn WalletProvider>, Address)> {
        let provider = self.provider.clone().ok_or(WalletError::Unavailable)?;
        let state = self.snapshot();
        let account = match (state.status, state.account) {
            (SwapStatus::Connected, Some(account)) => account,
            _ => return Err(Error::invalid_input("connect a wallet first")),
        };
        if request.amount <= Decimal::ZERO {
            return Err(Error::invalid_input("amount must be greater than zero"));
        }
        let from = self.tokens.require(&request.from)?;
        let to = self.tokens.require(&request.to)?;
        if from.address == to.address {
            return Err(Error::invalid_input("choose two different tokens"));
        }
        Ok((provider, account))
    }

    async fn submit(
        &self,
        provider: &dyn WalletProvider,
        account: Address,
        from: &Token,
        to: &Token,
        request: &SwapRequest,
    ) -> Result<TxHash> {
        let amount_in = from.to_base_units(request.amount)?;
        let path = vec![from.address, to.address];
        let amount_out_min = self
            .amount_out_min(provider, account, amount_in, &path, request.slippage_percent)
            .await?;

        let calls = self.plan(account, from, amount_in, amount_out_min, path);
        let mut tx = TxHash::ZERO;
        for call in calls {
            tx = provider
                .send_transaction(call)
                .await
                .map_err(|e| Error::contract(e.to_string()))?;
        }
        Ok(tx)
    }

    /// Transactions for one swap, in submission order.
    pub fn plan(
        &self,
        account: Address,
        from: &Token,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
    ) -> Vec<ContractCall> {
        let deadline = self.deadline();
        if from.symbol.eq_ignore_ascii_case(&self.native_symbol) {
            vec![
                router::swap_exact_native_for_tokens(
                    self.router,
                    amount_in,
                    amount_out_min,
                    path,
                    account,
                    deadline,
                )
                .sender(account),
            ]
        } else {
            vec![
                router::approve(from.address, self.router, amount_in).sender(account),
                router::swap_exact_tokens_for_tokens(
                    self.router,
                    amount_in,
                    amount_out_min,
                    path,
                    account,
                    deadline,
                )
                .sender(account),
            ]
        }
    }

    async fn amount_out_min(
        &self,
        provider: &dyn WalletProvider,
        account: Address,
        amount_in: U256,
        path: &[Address],
        slippage_percent: Decimal,
    ) -> Result<U256> {
        match self.policy {
            MinOutPolicy::Unprotected => {
                warn!("Submitting swap with amountOutMin = 0; no slippage protection");
                Ok(U256::ZERO)
            }
            MinOutPolicy::FromQuote => {
                let quote = router::get_amounts_out(self.router, amount_in, path.to_vec())
                    .sender(account);
                let data = provider
                    .call(quote)
                    .await
                    .map_err(|e| Error::contract(e.to_string()))?;
                let quoted = router::decode_last_amount(&data)?;
                router::apply_slippage(quoted, slippage_percent)
            }
        }
    }

    fn deadline(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        now.saturating_add(self.deadline_secs)
    }
}
