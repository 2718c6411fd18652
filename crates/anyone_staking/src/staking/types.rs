//! Token descriptors, stake entries and the records handed back to callers.

use crate::chain::ChecksummedAddress;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    pub address: ChecksummedAddress,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Empty only for leaf (underlying) tokens.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub underlying_tokens: Vec<TokenDescriptor>,
}

impl TokenDescriptor {
    pub fn is_leaf(&self) -> bool {
        self.underlying_tokens.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Protocol,
    Underlying,
}

/// A stake record as the contract query returned it, before validation.
///
/// Either a named-field object, a positional array, or an object carrying both
/// (`{"operator": .., "0": ..}`).
#[derive(Clone, Debug, PartialEq)]
pub struct RawStakeTuple(Value);

impl RawStakeTuple {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Named field if present and non-null, else the positional field at `index`.
    pub fn field(&self, name: &str, index: usize) -> Option<&Value> {
        let found = match &self.0 {
            Value::Object(map) => map
                .get(name)
                .filter(|v| !v.is_null())
                .or_else(|| map.get(&index.to_string())),
            Value::Array(items) => items.get(index),
            _ => None,
        };
        found.filter(|v| !v.is_null())
    }

    pub fn operator(&self) -> Option<&Value> {
        self.field("operator", 0)
    }

    pub fn amount(&self) -> Option<&Value> {
        self.field("amount", 1)
    }
}

impl From<Value> for RawStakeTuple {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A validated stake: checksummed operator and a strictly positive amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeEntry {
    pub operator: ChecksummedAddress,
    pub amount: U256,
}

/// A token annotated with a raw balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(flatten)]
    pub token: TokenDescriptor,
    pub balance_raw: String,
}

pub type UnderlyingBalance = TokenBalance;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMetadata {
    pub operator: ChecksummedAddress,
}

/// One staked position: a single operator's stake for the queried address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    /// `<token address>:<operator>`
    pub id: String,
    #[serde(rename = "type")]
    pub position_type: TokenType,
    pub protocol_id: String,
    pub product_id: String,
    pub chain_id: u64,
    pub token_address: ChecksummedAddress,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Exact decimal string of the staked amount.
    pub balance_raw: String,
    pub tokens: Vec<TokenBalance>,
    pub underlying: Vec<UnderlyingBalance>,
    pub metadata: PositionMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingRate {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(flatten)]
    pub token: TokenDescriptor,
    /// Underlying raw units per one whole protocol token.
    pub underlying_rate_raw: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrapExchangeRate {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(flatten)]
    pub token: TokenDescriptor,
    pub base_rate: u8,
    pub tokens: Vec<UnderlyingRate>,
}
