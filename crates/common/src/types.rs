use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use hex::{decode as hex_decode, encode as hex_encode};
use sha3::{Digest, Sha3_512};
use thiserror::Error;

/// Address is 20 bytes (first 20 bytes of SHA3-512(pubkey)).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid address length: {0}")]
    InvalidLength(usize),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Address {
    pub fn from_bytes(b: [u8; 20]) -> Self {
        Address(b)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive an address from raw Ed25519 public key bytes.
    pub fn from_pubkey(pubkey: &[u8]) -> Self {
        let mut hasher = Sha3_512::new();
        hasher.update(pubkey);
        let digest = hasher.finalize();
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&digest[0..20]);
        Address(arr)
    }

    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex_decode(s)?;
        if bytes.len() != 20 {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }

    /// The all-zero address. Used as the "unset" sender in message validation.
    pub fn zero() -> Self {
        Address([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.to_hex()).finish()
    }
}

impl FromStr for Address {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

/* --- serde serialize/deserialize for Address as hex string --- */
impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A validator in the active set: its address, Ed25519 public key
/// and voting power.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: [u8; 32],
    pub voting_power: u64,
}

impl Validator {
    pub fn new(pub_key: [u8; 32], voting_power: u64) -> Self {
        Validator {
            address: Address::from_pubkey(&pub_key),
            pub_key,
            voting_power,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("address", &self.address.to_hex())
            .field("voting_power", &self.voting_power)
            .finish()
    }
}

/// Immutable snapshot of the validator set for one DKG round.
///
/// Validators are kept sorted by address so that every node derives the
/// same deterministic ordering from the same membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(mut validators: Vec<Validator>) -> Self {
        validators.sort_by(|a, b| a.address.cmp(&b.address));
        validators.dedup_by(|a, b| a.address == b.address);
        ValidatorSet { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.by_address(address).is_some()
    }

    pub fn by_address(&self, address: &Address) -> Option<&Validator> {
        self.validators
            .binary_search_by(|v| v.address.cmp(address))
            .ok()
            .map(|i| &self.validators[i])
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Validator> {
        self.validators.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(byte: u8) -> Validator {
        Validator::new([byte; 32], 1)
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_bytes([0xAB; 20]);
        let hex = addr.to_hex();
        assert_eq!(hex.len(), 40);
        let back = Address::from_hex(&hex).expect("from hex");
        assert_eq!(addr, back);
    }

    #[test]
    fn test_address_from_hex_strips_prefix() {
        let addr = Address::from_bytes([0x01; 20]);
        let with_prefix = format!("0x{}", addr.to_hex());
        assert_eq!(Address::from_hex(&with_prefix).unwrap(), addr);
    }

    #[test]
    fn test_address_from_hex_bad_length() {
        let result = Address::from_hex("abcd");
        assert!(matches!(result, Err(AddressError::InvalidLength(2))));
    }

    #[test]
    fn test_address_from_pubkey_deterministic() {
        let a1 = Address::from_pubkey(&[7u8; 32]);
        let a2 = Address::from_pubkey(&[7u8; 32]);
        assert_eq!(a1, a2);
        let a3 = Address::from_pubkey(&[8u8; 32]);
        assert_ne!(a1, a3);
    }

    #[test]
    fn test_address_zero() {
        assert!(Address::zero().is_zero());
        assert!(!Address::from_bytes([1; 20]).is_zero());
    }

    #[test]
    fn test_address_serde_as_hex() {
        let addr = Address::from_bytes([0x42; 20]);
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(addr, back);
    }

    #[test]
    fn test_validator_address_derived_from_pubkey() {
        let v = val(9);
        assert_eq!(v.address, Address::from_pubkey(&[9; 32]));
    }

    #[test]
    fn test_validator_set_sorted() {
        let set = ValidatorSet::new(vec![val(9), val(1), val(5)]);
        let addrs: Vec<_> = set.iter().map(|v| v.address).collect();
        let mut sorted = addrs.clone();
        sorted.sort();
        assert_eq!(addrs, sorted);
    }

    #[test]
    fn test_validator_set_dedup() {
        let set = ValidatorSet::new(vec![val(1), val(1), val(2)]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_validator_set_by_address() {
        let set = ValidatorSet::new(vec![val(1), val(2), val(3)]);
        let target = Address::from_pubkey(&[2u8; 32]);
        let found = set.by_address(&target).expect("present");
        assert_eq!(found.pub_key, [2u8; 32]);

        let missing = Address::from_pubkey(&[0xFFu8; 32]);
        assert!(set.by_address(&missing).is_none());
        assert!(!set.contains(&missing));
    }

    #[test]
    fn test_validator_set_empty() {
        let set = ValidatorSet::new(vec![]);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
