//! Swap tab form.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::swap::{SwapRequest, SwapState};

/// Slippage step used by the `+`/`-` keys.
const SLIPPAGE_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 1);
const MAX_SLIPPAGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Form fields plus the widget's published state.
#[derive(Debug, Clone)]
pub struct SwapFormState {
    pub wallet: SwapState,
    pub from: &'static str,
    pub to: &'static str,
    pub amount: String,
    pub slippage_percent: Decimal,
}

impl Default for SwapFormState {
    fn default() -> Self {
        Self {
            wallet: SwapState::default(),
            from: "BNB",
            to: "CBN",
            amount: String::new(),
            slippage_percent: Decimal::from_parts(5, 0, 0, false, 1),
        }
    }
}

impl SwapFormState {
    pub fn with_slippage(slippage_percent: f64) -> Self {
        Self {
            slippage_percent: Decimal::from_f64_retain(slippage_percent)
                .map(|d| d.round_dp(2))
                .unwrap_or(Decimal::from_parts(5, 0, 0, false, 1)),
            ..Self::default()
        }
    }

    /// Build a swap request from the form. The amount must parse as a
    /// decimal; range checks happen in the widget.
    pub fn request(&self) -> Result<SwapRequest> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| Error::invalid_input(format!("invalid amount: {:?}", self.amount)))?;
        Ok(SwapRequest {
            from: self.from.to_string(),
            to: self.to.to_string(),
            amount,
            slippage_percent: self.slippage_percent,
        })
    }

    pub fn flip(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    pub fn increase_slippage(&mut self) {
        self.slippage_percent = (self.slippage_percent + SLIPPAGE_STEP).min(MAX_SLIPPAGE);
    }

    pub fn decrease_slippage(&mut self) {
        self.slippage_percent = (self.slippage_percent - SLIPPAGE_STEP).max(Decimal::ZERO);
    }
}
