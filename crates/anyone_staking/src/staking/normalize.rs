//! Stake normalizer: raw tuples to validated [`StakeEntry`] values.

use crate::chain::checksum_address;
use crate::staking::observer::{NoopObserver, PipelineObserver};
use crate::staking::types::{RawStakeTuple, StakeEntry};
use alloy_primitives::U256;
use serde_json::Value;

/// Why a raw tuple produced no stake entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    MissingOperator,
    MissingAmount,
    InvalidOperator,
    InvalidAmount,
    ZeroAmount,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::MissingOperator => "missing_operator",
            DropReason::MissingAmount => "missing_amount",
            DropReason::InvalidOperator => "invalid_operator",
            DropReason::InvalidAmount => "invalid_amount",
            DropReason::ZeroAmount => "zero_amount",
        }
    }

    /// True for upstream data problems, false for a legitimately empty stake.
    pub fn is_malformed(self) -> bool {
        !matches!(self, DropReason::ZeroAmount)
    }
}

/// Decode raw tuples in order, silently dropping malformed and zero-amount ones.
pub fn normalize(raw: &[RawStakeTuple]) -> Vec<StakeEntry> {
    normalize_observed(raw, &NoopObserver)
}

/// Same output as [`normalize`]; each drop is also reported to `observer`.
pub fn normalize_observed(
    raw: &[RawStakeTuple],
    observer: &dyn PipelineObserver,
) -> Vec<StakeEntry> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, tuple)| match decode_tuple(tuple) {
            Ok(entry) => Some(entry),
            Err(reason) => {
                observer.tuple_dropped(index, reason);
                None
            }
        })
        .collect()
}

fn decode_tuple(tuple: &RawStakeTuple) -> Result<StakeEntry, DropReason> {
    let operator = tuple.operator().ok_or(DropReason::MissingOperator)?;
    let amount = tuple.amount().ok_or(DropReason::MissingAmount)?;

    let operator = operator
        .as_str()
        .and_then(|s| checksum_address(s).ok())
        .ok_or(DropReason::InvalidOperator)?;
    let amount = coerce_amount(amount).ok_or(DropReason::InvalidAmount)?;
    if amount.is_zero() {
        return Err(DropReason::ZeroAmount);
    }
    Ok(StakeEntry { operator, amount })
}

/// Coerce an integer-like value to `U256`.
///
/// JSON numbers are read from their literal digits, so integers past `u64`
/// stay exact. Strings are parsed as base-10 digits (surrounding whitespace
/// ignored). Signs, fractions, exponents and overflow fail.
pub fn coerce_amount(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<U256> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(s, 10).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    const OP_A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const OP_B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn raw(values: Vec<Value>) -> Vec<RawStakeTuple> {
        values.into_iter().map(RawStakeTuple::from).collect()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(usize, DropReason)>>);

    impl PipelineObserver for Recorder {
        fn tuple_dropped(&self, index: usize, reason: DropReason) {
            self.0.lock().unwrap().push((index, reason));
        }
    }

    #[test]
    fn named_and_positional_tuples_decode() {
        let out = normalize(&raw(vec![
            json!({"operator": OP_A.to_lowercase(), "amount": "100"}),
            json!([OP_B, 7]),
        ]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].operator.to_string(), OP_A);
        assert_eq!(out[0].amount, U256::from(100u64));
        assert_eq!(out[1].operator.to_string(), OP_B);
        assert_eq!(out[1].amount, U256::from(7u64));
    }

    #[test]
    fn zero_amount_dropped() {
        let out = normalize(&raw(vec![
            json!({"operator": OP_A, "amount": "0"}),
            json!({"operator": OP_B, "amount": 0}),
        ]));
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_tuples_dropped_in_order() {
        let rec = Recorder::default();
        let out = normalize_observed(
            &raw(vec![
                json!({"amount": "5"}),
                json!({"operator": OP_A}),
                json!({"operator": "0xnothex", "amount": "5"}),
                json!({"operator": OP_A, "amount": "12.5"}),
                json!({"operator": OP_A, "amount": "-3"}),
                json!({"operator": OP_B, "amount": "0"}),
                json!({"operator": 42, "amount": "1"}),
                json!({"operator": OP_B, "amount": "9"}),
            ]),
            &rec,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].amount, U256::from(9u64));
        let drops = rec.0.lock().unwrap().clone();
        assert_eq!(
            drops,
            vec![
                (0, DropReason::MissingOperator),
                (1, DropReason::MissingAmount),
                (2, DropReason::InvalidOperator),
                (3, DropReason::InvalidAmount),
                (4, DropReason::InvalidAmount),
                (5, DropReason::ZeroAmount),
                (6, DropReason::InvalidOperator),
            ]
        );
        assert!(!DropReason::ZeroAmount.is_malformed());
        assert!(DropReason::InvalidAmount.is_malformed());
    }

    #[test]
    fn duplicate_operators_kept() {
        let out = normalize(&raw(vec![
            json!([OP_A, "1"]),
            json!([OP_A.to_lowercase(), "2"]),
        ]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].operator, out[1].operator);
    }

    #[test]
    fn large_amount_exact() {
        let max_u128 = "340282366920938463463374607431768211455";
        let out = normalize(&raw(vec![json!([OP_A, max_u128])]));
        assert_eq!(out[0].amount, U256::from(u128::MAX));
        assert_eq!(out[0].amount.to_string(), max_u128);
    }

    #[test]
    fn coerce_amount_rules() {
        assert_eq!(coerce_amount(&json!(" 42 ")), Some(U256::from(42u64)));
        assert_eq!(coerce_amount(&json!(u64::MAX)), Some(U256::from(u64::MAX)));
        let hundred_tokens: Value = serde_json::from_str("100000000000000000000").unwrap();
        assert_eq!(
            coerce_amount(&hundred_tokens),
            Some(U256::from(100_000_000_000_000_000_000u128))
        );
        let max_word: Value = serde_json::from_str(&U256::MAX.to_string()).unwrap();
        assert_eq!(coerce_amount(&max_word), Some(U256::MAX));
        let exponent: Value = serde_json::from_str("1e20").unwrap();
        assert_eq!(coerce_amount(&exponent), None);
        assert_eq!(coerce_amount(&json!(U256::MAX.to_string())), Some(U256::MAX));
        assert_eq!(coerce_amount(&json!(format!("{}0", U256::MAX))), None);
        assert_eq!(coerce_amount(&json!(1.5)), None);
        assert_eq!(coerce_amount(&json!(-1)), None);
        assert_eq!(coerce_amount(&json!("0x10")), None);
        assert_eq!(coerce_amount(&json!("")), None);
        assert_eq!(coerce_amount(&json!(true)), None);
    }
}
