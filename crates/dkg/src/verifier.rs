//! # Verifier Handle
//!
//! `Verifier` adalah artifact publik dari satu DKG round yang selesai:
//! dipakai untuk memverifikasi threshold signatures dan menghasilkan
//! partial signature dengan share milik node sendiri.
//!
//! Coordinator memegang dua slot verifier:
//! - `current`: sedang dipakai
//! - `next`: staged, menunggu change height
//!
//! Crate ini TIDAK mengimplementasikan BLS/VSS arithmetic — implementasi
//! kriptografis datang dari dealer eksternal. Yang disediakan di sini
//! adalah trait boundary plus dua implementasi untuk testing:
//! [`TestVerifier`] (deterministik, semua node dengan input sama setuju)
//! dan [`MockVerifier`] (accept-all bootstrap).

use std::sync::Arc;

use randnet_common::crypto::sha3_256;
use randnet_common::types::ValidatorSet;

use crate::error::VerifierError;

// ════════════════════════════════════════════════════════════════════════════════
// VERIFIER TRAIT
// ════════════════════════════════════════════════════════════════════════════════

/// Artifact publik dari DKG round yang selesai.
pub trait Verifier: Send + Sync {
    /// Verifikasi signature terhadap group key round ini.
    fn verify(&self, msg: &[u8], sig: &[u8]) -> bool;

    /// Hasilkan partial signature dengan share milik node ini.
    fn sign_share(&self, msg: &[u8]) -> Result<Vec<u8>, VerifierError>;
}

// ════════════════════════════════════════════════════════════════════════════════
// TEST VERIFIER
// ════════════════════════════════════════════════════════════════════════════════

/// Domain separator untuk derivasi group key test verifier.
const TEST_VERIFIER_DOMAIN: &[u8] = b"randnet/test-verifier/v1";

/// Verifier deterministik untuk testing dan local simulation.
///
/// Group key diderivasi dari `(round_id, validator set)` dengan SHA3-256,
/// sehingga semua node yang menyelesaikan round yang sama dengan snapshot
/// validator yang sama menghasilkan verifier yang identik.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVerifier {
    group_key: [u8; 32],
}

impl TestVerifier {
    /// Derivasi verifier dari parameter round.
    #[must_use]
    pub fn new(round_id: u32, validators: &ValidatorSet) -> Self {
        let mut input = Vec::new();
        input.extend_from_slice(TEST_VERIFIER_DOMAIN);
        input.extend_from_slice(&round_id.to_le_bytes());
        input.extend_from_slice(&(validators.len() as u64).to_le_bytes());
        for v in validators.iter() {
            input.extend_from_slice(v.address.as_bytes());
        }
        TestVerifier {
            group_key: sha3_256(&input),
        }
    }

    #[must_use]
    pub const fn from_group_key(group_key: [u8; 32]) -> Self {
        TestVerifier { group_key }
    }

    #[must_use]
    pub const fn group_key(&self) -> &[u8; 32] {
        &self.group_key
    }

    fn signature_for(&self, msg: &[u8]) -> [u8; 32] {
        let mut input = Vec::with_capacity(32 + msg.len());
        input.extend_from_slice(&self.group_key);
        input.extend_from_slice(msg);
        sha3_256(&input)
    }
}

impl Verifier for TestVerifier {
    fn verify(&self, msg: &[u8], sig: &[u8]) -> bool {
        sig == self.signature_for(msg)
    }

    fn sign_share(&self, msg: &[u8]) -> Result<Vec<u8>, VerifierError> {
        Ok(self.signature_for(msg).to_vec())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// MOCK VERIFIER
// ════════════════════════════════════════════════════════════════════════════════

/// Accept-all verifier untuk bootstrap sebelum DKG pertama selesai.
#[derive(Debug, Clone, Default)]
pub struct MockVerifier;

impl Verifier for MockVerifier {
    fn verify(&self, _msg: &[u8], _sig: &[u8]) -> bool {
        true
    }

    fn sign_share(&self, msg: &[u8]) -> Result<Vec<u8>, VerifierError> {
        Ok(sha3_256(msg).to_vec())
    }
}

/// Bootstrap verifier sebagai trait object — convenience untuk builder.
#[must_use]
pub fn mock_verifier() -> Arc<dyn Verifier> {
    Arc::new(MockVerifier)
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
