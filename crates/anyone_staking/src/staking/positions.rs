//! Position assembler and the one-to-one unwrap rate.

use crate::chain::ChecksummedAddress;
use crate::staking::types::{
    PositionMetadata, PositionRecord, StakeEntry, TokenBalance, TokenDescriptor, TokenType,
    UnderlyingRate, UnwrapExchangeRate,
};
use crate::staking::StakingError;

/// The staking wrapper never rebases: one staked token is one underlying token.
pub const BASE_RATE: u8 = 1;

/// Fields shared by every position of one adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionContext {
    pub protocol_id: &'static str,
    pub product_id: &'static str,
    pub chain_id: u64,
}

pub fn position_id(token: &ChecksummedAddress, operator: &ChecksummedAddress) -> String {
    format!("{}:{}", token, operator)
}

/// One record per entry, in entry order. Underlying balances mirror the stake.
pub fn assemble(
    entries: &[StakeEntry],
    token: &TokenDescriptor,
    ctx: &PositionContext,
) -> Vec<PositionRecord> {
    entries
        .iter()
        .map(|entry| {
            let balance_raw = entry.amount.to_string();
            PositionRecord {
                id: position_id(&token.address, &entry.operator),
                position_type: TokenType::Protocol,
                protocol_id: ctx.protocol_id.to_string(),
                product_id: ctx.product_id.to_string(),
                chain_id: ctx.chain_id,
                token_address: token.address,
                name: token.name.clone(),
                symbol: token.symbol.clone(),
                decimals: token.decimals,
                tokens: vec![TokenBalance {
                    token_type: TokenType::Protocol,
                    token: token.clone(),
                    balance_raw: balance_raw.clone(),
                }],
                underlying: token
                    .underlying_tokens
                    .iter()
                    .map(|u| TokenBalance {
                        token_type: TokenType::Underlying,
                        token: u.clone(),
                        balance_raw: balance_raw.clone(),
                    })
                    .collect(),
                balance_raw,
                metadata: PositionMetadata {
                    operator: entry.operator,
                },
            }
        })
        .collect()
}

/// Fixed 1:1 rate from `token` to its single underlying token; nothing is queried.
pub fn unwrap_one_to_one(token: &TokenDescriptor) -> Result<UnwrapExchangeRate, StakingError> {
    let [underlying] = token.underlying_tokens.as_slice() else {
        return Err(StakingError::UnwrapArity {
            token: token.address,
            count: token.underlying_tokens.len(),
        });
    };
    Ok(UnwrapExchangeRate {
        token_type: TokenType::Protocol,
        token: token.clone(),
        base_rate: BASE_RATE,
        tokens: vec![UnderlyingRate {
            token_type: TokenType::Underlying,
            token: underlying.clone(),
            underlying_rate_raw: one_whole_unit(underlying.decimals),
        }],
    })
}

/// `10^decimals` as a decimal string.
fn one_whole_unit(decimals: u8) -> String {
    format!("1{}", "0".repeat(decimals as usize))
}
