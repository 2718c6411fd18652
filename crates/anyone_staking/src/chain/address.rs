//! EIP-55 checksum normalization of account addresses.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid length {len} for address {input:?}")]
    Length { input: String, len: usize },
    #[error("non-hex characters in address {0:?}")]
    InvalidHex(String),
    #[error("bad checksum for address {0:?}")]
    BadChecksum(String),
}

/// An account address that has passed checksum normalization.
///
/// Formats (and serializes) as the EIP-55 mixed-case string, so two values compare
/// equal exactly when their checksummed forms match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChecksummedAddress(Address);

impl ChecksummedAddress {
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    pub const fn address(&self) -> Address {
        self.0
    }

    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChecksummedAddress({})", self.to_checksum())
    }
}

impl FromStr for ChecksummedAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        checksum_address(s)
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        checksum_address(&s).map_err(serde::de::Error::custom)
    }
}

/// Normalize an address string to its checksummed form.
///
/// Accepts 40 hex digits with an optional `0x` prefix. Single-case input is taken
/// as-is; mixed-case input must already carry a valid EIP-55 checksum.
pub fn checksum_address(input: &str) -> Result<ChecksummedAddress, AddressError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.len() != 40 {
        return Err(AddressError::Length {
            input: input.to_string(),
            len: digits.len(),
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex(input.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| AddressError::InvalidHex(input.to_string()))?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = address.to_checksum(None);
        if expected.strip_prefix("0x") != Some(digits) {
            return Err(AddressError::BadChecksum(input.to_string()));
        }
    }
    Ok(ChecksummedAddress(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIP55_VECTORS: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn lowercase_normalizes_to_checksum() {
        for v in EIP55_VECTORS {
            let a = checksum_address(&v.to_lowercase()).unwrap();
            assert_eq!(a.to_string(), v);
        }
    }

    #[test]
    fn uppercase_digits_accepted() {
        let upper = format!("0x{}", EIP55_VECTORS[0][2..].to_uppercase());
        let a = checksum_address(&upper).unwrap();
        assert_eq!(a.to_string(), EIP55_VECTORS[0]);
    }

    #[test]
    fn valid_mixed_case_accepted() {
        for v in EIP55_VECTORS {
            assert_eq!(checksum_address(v).unwrap().to_string(), v);
        }
    }

    #[test]
    fn bad_mixed_case_rejected() {
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(
            checksum_address(bad),
            Err(AddressError::BadChecksum(_))
        ));
    }

    #[test]
    fn prefix_optional() {
        let a = checksum_address(&EIP55_VECTORS[1][2..]).unwrap();
        assert_eq!(a.to_string(), EIP55_VECTORS[1]);
    }

    #[test]
    fn wrong_length_and_hex_rejected() {
        assert!(matches!(
            checksum_address("0x1234"),
            Err(AddressError::Length { len: 4, .. })
        ));
        assert!(matches!(checksum_address(""), Err(AddressError::Length { .. })));
        let non_hex = format!("0x{}", "g".repeat(40));
        assert!(matches!(
            checksum_address(&non_hex),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn case_variants_compare_equal() {
        let lower = checksum_address(&EIP55_VECTORS[2].to_lowercase()).unwrap();
        let mixed = checksum_address(EIP55_VECTORS[2]).unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn serde_uses_checksum_string() {
        let a = checksum_address(&EIP55_VECTORS[3].to_lowercase()).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", EIP55_VECTORS[3]));
        let back: ChecksummedAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
