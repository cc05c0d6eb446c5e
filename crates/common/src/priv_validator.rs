//! Validator signing abstraction.
//!
//! `PrivValidator` is the single signing surface the DKG coordinators see:
//! it exposes the validator's address, its Ed25519 public key, and a
//! sign-raw-bytes operation. The coordinators decide what byte string gets
//! signed (DKG gossip messages off-chain, transaction bodies on-chain).

use ed25519_dalek::SigningKey;

use crate::crypto::{self, CryptoError};
use crate::types::{Address, Validator};

/// Signing interface held by every validator process.
pub trait PrivValidator: Send + Sync {
    /// Address derived from the validator's public key.
    fn address(&self) -> Address;

    /// Raw Ed25519 public key bytes.
    fn pub_key(&self) -> [u8; 32];

    /// Sign an arbitrary byte string with the validator key.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// In-memory private validator backed by an Ed25519 keypair.
///
/// Production deployments load the key from the keystore; tests construct
/// it from a fixed seed so validator identities are reproducible.
pub struct MockPV {
    signing_key: SigningKey,
    pub_key: [u8; 32],
    address: Address,
}

impl MockPV {
    /// Create a validator identity with a fresh random key.
    pub fn new() -> Self {
        Self::from_signing_key(crypto::generate_signing_key())
    }

    /// Create a deterministic validator identity from a one-byte seed.
    pub fn from_seed(seed: u8) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&[seed; 32]))
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let pub_key = signing_key.verifying_key().to_bytes();
        let address = Address::from_pubkey(&pub_key);
        MockPV {
            signing_key,
            pub_key,
            address,
        }
    }

    /// The validator-set entry for this identity.
    pub fn validator(&self, voting_power: u64) -> Validator {
        Validator {
            address: self.address,
            pub_key: self.pub_key,
            voting_power,
        }
    }
}

impl Default for MockPV {
    fn default() -> Self {
        Self::new()
    }
}

impl PrivValidator for MockPV {
    fn address(&self) -> Address {
        self.address
    }

    fn pub_key(&self) -> [u8; 32] {
        self.pub_key
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(crypto::sign_message(&self.signing_key, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify_signature;

    #[test]
    fn test_mock_pv_sign_verifies() {
        let pv = MockPV::from_seed(1);
        let sig = pv.sign(b"payload").expect("sign");
        let ok = verify_signature(&pv.pub_key(), b"payload", &sig).expect("verify");
        assert!(ok);
    }

    #[test]
    fn test_mock_pv_from_seed_deterministic() {
        let a = MockPV::from_seed(3);
        let b = MockPV::from_seed(3);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.pub_key(), b.pub_key());
    }

    #[test]
    fn test_mock_pv_distinct_seeds_distinct_identities() {
        let a = MockPV::from_seed(1);
        let b = MockPV::from_seed(2);
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_mock_pv_address_matches_pubkey() {
        let pv = MockPV::from_seed(7);
        assert_eq!(pv.address(), Address::from_pubkey(&pv.pub_key()));
    }

    #[test]
    fn test_validator_entry() {
        let pv = MockPV::from_seed(5);
        let v = pv.validator(10);
        assert_eq!(v.address, pv.address());
        assert_eq!(v.pub_key, pv.pub_key());
        assert_eq!(v.voting_power, 10);
    }
}
