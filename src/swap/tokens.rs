//! BEP-20 token registry.

use alloy_primitives::{Address, U256, address};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{Error, Result};

/// Grouping used by the token picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Stablecoin,
    Major,
    Defi,
    Platform,
}

/// A token the swap widget can trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub address: Address,
    pub decimals: u8,
    pub category: TokenCategory,
}

impl Token {
    /// Convert a human amount into base units (`amount * 10^decimals`),
    /// truncating digits below the token's precision.
    pub fn to_base_units(&self, amount: Decimal) -> Result<U256> {
        if amount.is_sign_negative() {
            return Err(Error::invalid_input("amount must not be negative"));
        }
        let scale = 10u128
            .checked_pow(u32::from(self.decimals))
            .ok_or_else(|| Error::invalid_input("unsupported token precision"))?;

        let whole = amount.trunc();
        let fraction = amount - whole;
        let whole_units = whole
            .to_u128()
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(|| Error::invalid_input("amount is too large"))?;
        let scale_decimal = Decimal::from_u128(scale)
            .ok_or_else(|| Error::invalid_input("unsupported token precision"))?;
        let fraction_units = (fraction * scale_decimal)
            .trunc()
            .to_u128()
            .ok_or_else(|| Error::invalid_input("amount is too precise"))?;

        Ok(U256::from(whole_units) + U256::from(fraction_units))
    }
}

/// Address of wrapped BNB, used in place of the native asset in router paths.
pub const WBNB: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");

/// Fixed list of tradeable tokens.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        use TokenCategory::*;

        let token = |symbol, name, address, category| Token {
            symbol,
            name,
            address,
            decimals: 18,
            category,
        };

        Self {
            tokens: vec![
                token(
                    "USDT",
                    "Tether USD",
                    address!("55d398326f99059fF775485246999027B3197955"),
                    Stablecoin,
                ),
                token(
                    "USDC",
                    "USD Coin",
                    address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
                    Stablecoin,
                ),
                token(
                    "BUSD",
                    "Binance USD",
                    address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56"),
                    Stablecoin,
                ),
                token(
                    "DAI",
                    "Dai Stablecoin",
                    address!("1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3"),
                    Stablecoin,
                ),
                token(
                    "BTC",
                    "Bitcoin BEP20",
                    address!("7130d2A12B9BCbFAe4f2634d864A1Ee1Ce3Ead9c"),
                    Major,
                ),
                token(
                    "ETH",
                    "Ethereum BEP20",
                    address!("2170Ed0880ac9A755fd29B2688956BD959F933F8"),
                    Major,
                ),
                token("BNB", "BNB", WBNB, Major),
                token("WBNB", "Wrapped BNB", WBNB, Major),
                token(
                    "CAKE",
                    "PancakeSwap Token",
                    address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"),
                    Defi,
                ),
                token(
                    "XVS",
                    "Venus",
                    address!("cF6BB5389c92Bdda8a3747Ddb454cB7a64626C63"),
                    Defi,
                ),
                token(
                    "CBN",
                    "CBN Token",
                    address!("511953922c61b0c8fdA962cBE87B37d8713C8121"),
                    Platform,
                ),
            ],
        }
    }
}

impl TokenRegistry {
    /// Look up a token by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Look up a token or fail with an input error.
    pub fn require(&self, symbol: &str) -> Result<&Token> {
        self.get(symbol)
            .ok_or_else(|| Error::invalid_input(format!("unknown token {symbol}")))
    }

    /// All tokens in picker order.
    pub fn all(&self) -> &[Token] {
        &self.tokens
    }

    /// Symbol following `symbol` in picker order, wrapping around.
    pub fn next_symbol(&self, symbol: &str) -> &'static str {
        let index = self
            .tokens
            .iter()
            .position(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .map(|i| (i + 1) % self.tokens.len())
            .unwrap_or(0);
        self.tokens.get(index).map(|t| t.symbol).unwrap_or("BNB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.get("cake").map(|t| t.symbol), Some("CAKE"));
        assert!(registry.get("DOGE").is_none());
        assert!(matches!(registry.require("DOGE"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_native_and_wrapped_share_address() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.get("BNB").unwrap().address, WBNB);
        assert_eq!(registry.get("WBNB").unwrap().address, WBNB);
    }

    #[test]
    fn test_to_base_units() {
        let registry = TokenRegistry::default();
        let usdt = registry.get("USDT").unwrap();
        assert_eq!(
            usdt.to_base_units(dec!(1.5)).unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
        assert_eq!(usdt.to_base_units(dec!(0.000000000000000001)).unwrap(), U256::from(1u8));
        assert_eq!(usdt.to_base_units(dec!(250)).unwrap(), U256::from(250u128 * 10u128.pow(18)));
        assert!(usdt.to_base_units(dec!(-1)).is_err());
    }

    #[test]
    fn test_next_symbol_wraps() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.next_symbol("USDT"), "USDC");
        assert_eq!(registry.next_symbol("CBN"), "USDT");
    }
}
