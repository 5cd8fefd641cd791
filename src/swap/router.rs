//! Router contract calldata.
//!
//! Only static words and one dynamic `address[]` argument are needed, so the
//! ABI encoding is done by hand on top of `alloy-primitives`.

use alloy_primitives::{Address, Bytes, U256, keccak256};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::ContractCall;
use crate::error::{Error, Result};

pub const APPROVE: &str = "approve(address,uint256)";
pub const SWAP_EXACT_ETH_FOR_TOKENS: &str = "swapExactETHForTokens(uint256,address[],address,uint256)";
pub const SWAP_EXACT_TOKENS_FOR_TOKENS: &str =
    "swapExactTokensForTokens(uint256,uint256,address[],address,uint256)";
pub const GET_AMOUNTS_OUT: &str = "getAmountsOut(uint256,address[])";

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// An ABI argument.
#[derive(Debug, Clone)]
enum Arg {
    Uint(U256),
    Address(Address),
    Path(Vec<Address>),
}

fn word_from_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn encode(signature: &str, args: &[Arg]) -> Bytes {
    let head_len = args.len() * 32;
    let mut head = Vec::with_capacity(4 + head_len);
    let mut tail = Vec::new();

    head.extend_from_slice(&selector(signature));
    for arg in args {
        match arg {
            Arg::Uint(value) => head.extend_from_slice(&value.to_be_bytes::<32>()),
            Arg::Address(address) => head.extend_from_slice(&word_from_address(*address)),
            Arg::Path(path) => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&offset.to_be_bytes::<32>());
                tail.extend_from_slice(&U256::from(path.len()).to_be_bytes::<32>());
                for address in path {
                    tail.extend_from_slice(&word_from_address(*address));
                }
            }
        }
    }

    head.extend_from_slice(&tail);
    Bytes::from(head)
}

/// `approve(spender, amount)` on a token contract.
pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::new(
        token,
        encode(APPROVE, &[Arg::Address(spender), Arg::Uint(amount)]),
    )
}

/// `swapExactETHForTokens`, paying `amount_in` as native value.
pub fn swap_exact_native_for_tokens(
    router: Address,
    amount_in: U256,
    amount_out_min: U256,
    path: Vec<Address>,
    to: Address,
    deadline: u64,
) -> ContractCall {
    ContractCall::new(
        router,
        encode(
            SWAP_EXACT_ETH_FOR_TOKENS,
            &[
                Arg::Uint(amount_out_min),
                Arg::Path(path),
                Arg::Address(to),
                Arg::Uint(U256::from(deadline)),
            ],
        ),
    )
    .value(amount_in)
}

/// `swapExactTokensForTokens`; the router must already be approved.
pub fn swap_exact_tokens_for_tokens(
    router: Address,
    amount_in: U256,
    amount_out_min: U256,
    path: Vec<Address>,
    to: Address,
    deadline: u64,
) -> ContractCall {
    ContractCall::new(
        router,
        encode(
            SWAP_EXACT_TOKENS_FOR_TOKENS,
            &[
                Arg::Uint(amount_in),
                Arg::Uint(amount_out_min),
                Arg::Path(path),
                Arg::Address(to),
                Arg::Uint(U256::from(deadline)),
            ],
        ),
    )
}

/// Read-only `getAmountsOut(amount_in, path)` quote.
pub fn get_amounts_out(router: Address, amount_in: U256, path: Vec<Address>) -> ContractCall {
    ContractCall::new(
        router,
        encode(GET_AMOUNTS_OUT, &[Arg::Uint(amount_in), Arg::Path(path)]),
    )
}

/// Decode a `uint256[]` return value and take its last element.
pub fn decode_last_amount(data: &[u8]) -> Result<U256> {
    let words = data.len() / 32;
    let word = |index: usize| -> Result<U256> {
        if index >= words {
            return Err(Error::contract("quote result is truncated"));
        }
        let at = index * 32;
        Ok(U256::from_be_slice(&data[at..at + 32]))
    };

    let offset = word(0)?;
    let offset: usize = offset
        .try_into()
        .map_err(|_| Error::contract("quote offset out of range"))?;
    if offset % 32 != 0 {
        return Err(Error::contract("quote offset is not word aligned"));
    }
    let start = offset / 32;
    let len: usize = word(start)?
        .try_into()
        .map_err(|_| Error::contract("quote length out of range"))?;
    if len == 0 {
        return Err(Error::contract("quote is empty"));
    }
    let last = start
        .checked_add(len)
        .filter(|&last| last < words)
        .ok_or_else(|| Error::contract("quote length out of range"))?;
    word(last)
}

/// Reduce a quoted output by the slippage tolerance (percent, `0 <= p < 100`).
pub fn apply_slippage(quoted: U256, slippage_percent: Decimal) -> Result<U256> {
    if slippage_percent.is_sign_negative() || slippage_percent >= Decimal::ONE_HUNDRED {
        return Err(Error::invalid_input("slippage must be between 0 and 100%"));
    }
    let bps = (slippage_percent * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .ok_or_else(|| Error::invalid_input("slippage is out of range"))?;
    let keep = U256::from(10_000u64 - bps);
    quoted
        .checked_mul(keep)
        .map(|v| v / U256::from(10_000u64))
        .ok_or_else(|| Error::contract("quoted amount overflows"))
}
