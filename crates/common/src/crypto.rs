//! Crypto helpers: Ed25519 keypair generation, sign, verify, and hashing.
//! Compatible with ed25519-dalek v2.2.0 + rand_core feature enabled.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, found {found}")]
    InvalidKeyLength { expected: usize, found: usize },

    #[error("invalid signature length: expected 64, found {0}")]
    InvalidSignatureLength(usize),

    #[error("verification failed")]
    VerifyFailed,

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Generate a fresh Ed25519 signing key from the OS RNG.
pub fn generate_signing_key() -> SigningKey {
    let mut rng = OsRng;
    SigningKey::generate(&mut rng)
}

/// Build a SigningKey from 32 raw secret bytes.
pub fn signing_key_from_bytes(bytes: &[u8]) -> Result<SigningKey, CryptoError> {
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 32,
            found: bytes.len(),
        });
    }
    let mut sk_bytes = [0u8; 32];
    sk_bytes.copy_from_slice(bytes);
    Ok(SigningKey::from_bytes(&sk_bytes))
}

/// Sign a message and return the 64-byte signature.
pub fn sign_message(sk: &SigningKey, message: &[u8]) -> Vec<u8> {
    sk.sign(message).to_bytes().to_vec()
}

/// Verify a message given raw public key bytes and signature bytes.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify;
/// malformed inputs are errors.
pub fn verify_signature(
    pubkey_bytes: &[u8],
    message: &[u8],
    sig_bytes: &[u8],
) -> Result<bool, CryptoError> {
    if pubkey_bytes.len() != 32 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 32,
            found: pubkey_bytes.len(),
        });
    }
    if sig_bytes.len() != 64 {
        return Err(CryptoError::InvalidSignatureLength(sig_bytes.len()));
    }

    let mut pk_arr = [0u8; 32];
    pk_arr.copy_from_slice(pubkey_bytes);
    let vk = VerifyingKey::from_bytes(&pk_arr).map_err(|_| CryptoError::VerifyFailed)?;

    let mut sig_arr = [0u8; 64];
    sig_arr.copy_from_slice(sig_bytes);
    let sig = Signature::from_bytes(&sig_arr);

    match vk.verify(message, &sig) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// SHA3-256 digest as a fixed 32-byte array.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let sk = generate_signing_key();
        let pubkey = sk.verifying_key().to_bytes();
        let msg = b"hello randnet";
        let sig = sign_message(&sk, msg);
        let ok = verify_signature(&pubkey, msg, &sig).expect("verify");
        assert!(ok, "signature should verify");

        // tamper message
        let ok2 = verify_signature(&pubkey, b"hello randnet!", &sig).expect("verify");
        assert!(!ok2, "tampered message should fail verify");
    }

    #[test]
    fn test_signing_key_from_bytes_deterministic() {
        let sk1 = signing_key_from_bytes(&[7u8; 32]).expect("key");
        let sk2 = signing_key_from_bytes(&[7u8; 32]).expect("key");
        assert_eq!(sk1.verifying_key(), sk2.verifying_key());
    }

    #[test]
    fn test_signing_key_from_bytes_bad_length() {
        let result = signing_key_from_bytes(&[0u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKeyLength { expected: 32, found: 16 })
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_inputs() {
        let sk = generate_signing_key();
        let pubkey = sk.verifying_key().to_bytes();
        let sig = sign_message(&sk, b"msg");

        assert!(verify_signature(&pubkey[..16], b"msg", &sig).is_err());
        assert!(verify_signature(&pubkey, b"msg", &sig[..32]).is_err());
    }

    #[test]
    fn test_sha3_256_deterministic() {
        let h1 = sha3_256(b"data");
        let h2 = sha3_256(b"data");
        assert_eq!(h1, h2);
        assert_ne!(h1, sha3_256(b"other"));
    }
}
