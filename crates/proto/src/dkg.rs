//! # DKG Protocol Messages
//!
//! Module ini menyediakan wire types untuk Distributed Key Generation (DKG).
//!
//! ## Overview
//!
//! `DkgData` adalah representasi serializable dari satu DKG phase message.
//! Types ini digunakan untuk transport dan storage, bukan untuk crypto
//! operations — payload phase (`data`) bersifat opaque bagi coordinator.
//!
//! ## Phase Ordering
//!
//! Tujuh phase types bersifat **ordered**. On-chain processing HARUS
//! mengunjungi types dalam urutan `DkgDataType::ALL`:
//!
//! | Ordinal | Type |
//! |---------|------|
//! | 0 | `PubKey` |
//! | 1 | `Deal` |
//! | 2 | `Response` |
//! | 3 | `Justification` |
//! | 4 | `Commits` |
//! | 5 | `Complaint` |
//! | 6 | `ReconstructCommit` |
//!
//! ## Encoding Format
//!
//! | Property | Value |
//! |----------|-------|
//! | Format | bincode |
//! | Byte Order | Little-endian |
//! | Serialization | Deterministic |

use serde::{Deserialize, Serialize};
use std::fmt;

use randnet_common::types::Address;

// ════════════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ════════════════════════════════════════════════════════════════════════════════

/// Expected size for a populated signature field.
pub const SIGNATURE_SIZE: usize = 64;

/// Jumlah phase types dalam satu DKG round.
pub const NUM_DATA_TYPES: usize = 7;

// ════════════════════════════════════════════════════════════════════════════════
// DKG DATA TYPE
// ════════════════════════════════════════════════════════════════════════════════

/// Tujuh phase message types dalam satu DKG round.
///
/// Ordinal value (0..=6) bersifat wire-visible: query path on-chain
/// menggunakan ordinal ini secara langsung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DkgDataType {
    /// Broadcast DKG public key milik node (phase pertama).
    PubKey = 0,
    /// Distribusi VSS deal ke peers.
    Deal = 1,
    /// Response terhadap deals yang diterima.
    Response = 2,
    /// Justification untuk complaint yang dilayangkan.
    Justification = 3,
    /// Commitment terhadap polynomial coefficients.
    Commits = 4,
    /// Complaint terhadap participant yang misbehave.
    Complaint = 5,
    /// Reconstruct commit untuk recovery share.
    ReconstructCommit = 6,
}

impl DkgDataType {
    /// Semua phase types dalam urutan pemrosesan yang fixed.
    pub const ALL: [DkgDataType; NUM_DATA_TYPES] = [
        DkgDataType::PubKey,
        DkgDataType::Deal,
        DkgDataType::Response,
        DkgDataType::Justification,
        DkgDataType::Commits,
        DkgDataType::Complaint,
        DkgDataType::ReconstructCommit,
    ];

    /// Ordinal wire value (0..=6).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse ordinal wire value. `None` untuk ordinal di luar 0..=6.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DkgDataType::PubKey),
            1 => Some(DkgDataType::Deal),
            2 => Some(DkgDataType::Response),
            3 => Some(DkgDataType::Justification),
            4 => Some(DkgDataType::Commits),
            5 => Some(DkgDataType::Complaint),
            6 => Some(DkgDataType::ReconstructCommit),
            _ => None,
        }
    }
}

impl fmt::Display for DkgDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DkgDataType::PubKey => "pub_key",
            DkgDataType::Deal => "deal",
            DkgDataType::Response => "response",
            DkgDataType::Justification => "justification",
            DkgDataType::Commits => "commits",
            DkgDataType::Complaint => "complaint",
            DkgDataType::ReconstructCommit => "reconstruct_commit",
        };
        f.write_str(name)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// VALIDATION ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Error type untuk validasi wire messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payload phase kosong.
    EmptyPayload,

    /// Sender address kosong (all-zero).
    EmptySender,

    /// Signature field terisi tapi panjangnya bukan 64 bytes.
    InvalidSignatureLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Ordinal data type di luar range 0..=6.
    InvalidDataType {
        /// Ordinal yang diterima.
        got: u8,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPayload => {
                write!(f, "dkg data payload is empty")
            }
            ValidationError::EmptySender => {
                write!(f, "sender address is empty")
            }
            ValidationError::InvalidSignatureLength { expected, got } => {
                write!(
                    f,
                    "invalid signature length: expected {}, got {}",
                    expected, got
                )
            }
            ValidationError::InvalidDataType { got } => {
                write!(f, "invalid dkg data type ordinal: {}", got)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ════════════════════════════════════════════════════════════════════════════════
// DKG DATA
// ════════════════════════════════════════════════════════════════════════════════

/// Satu DKG phase message.
///
/// ## Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `data_type` | Phase type (lihat [`DkgDataType`]) |
/// | `round_id` | Round yang di-address message ini |
/// | `addr` | Address validator pengirim |
/// | `data` | Opaque phase payload (milik dealer) |
/// | `signature` | Ed25519 signature atas `sign_bytes` (off-chain path) |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkgData {
    pub data_type: DkgDataType,
    pub round_id: u32,
    pub addr: Address,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl DkgData {
    /// Membuat message baru tanpa signature (signature diisi oleh sink).
    #[must_use]
    pub fn new(data_type: DkgDataType, round_id: u32, addr: Address, data: Vec<u8>) -> Self {
        DkgData {
            data_type,
            round_id,
            addr,
            data,
            signature: Vec::new(),
        }
    }

    /// Canonical byte string yang ditandatangani validator.
    ///
    /// ## Layout (deterministik, little-endian)
    ///
    /// ```text
    /// [chain_id_len:8][chain_id][data_type:1][round_id:4][addr:20][data_len:8][data]
    /// ```
    ///
    /// Signature field TIDAK termasuk dalam sign bytes.
    #[must_use]
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + chain_id.len() + 1 + 4 + 20 + 8 + self.data.len());
        out.extend_from_slice(&(chain_id.len() as u64).to_le_bytes());
        out.extend_from_slice(chain_id.as_bytes());
        out.push(self.data_type.as_u8());
        out.extend_from_slice(&self.round_id.to_le_bytes());
        out.extend_from_slice(self.addr.as_bytes());
        out.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Validasi struktural message.
    ///
    /// - Payload tidak boleh kosong
    /// - Sender address tidak boleh all-zero
    /// - Signature, jika terisi, harus 64 bytes
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        if self.addr.is_zero() {
            return Err(ValidationError::EmptySender);
        }
        if !self.signature.is_empty() && self.signature.len() != SIGNATURE_SIZE {
            return Err(ValidationError::InvalidSignatureLength {
                expected: SIGNATURE_SIZE,
                got: self.signature.len(),
            });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_addr() -> Address {
        Address::from_bytes([0x11; 20])
    }

    fn sample_data() -> DkgData {
        DkgData::new(DkgDataType::Deal, 3, sample_addr(), vec![0xAA, 0xBB])
    }

    // ────────────────────────────────────────────────────────────────────────────
    // DATA TYPE TESTS
    // ────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_data_type_ordinals() {
        assert_eq!(DkgDataType::PubKey.as_u8(), 0);
        assert_eq!(DkgDataType::Deal.as_u8(), 1);
        assert_eq!(DkgDataType::Response.as_u8(), 2);
        assert_eq!(DkgDataType::Justification.as_u8(), 3);
        assert_eq!(DkgDataType::Commits.as_u8(), 4);
        assert_eq!(DkgDataType::Complaint.as_u8(), 5);
        assert_eq!(DkgDataType::ReconstructCommit.as_u8(), 6);
    }

    #[test]
    fn test_data_type_roundtrip() {
        for ty in DkgDataType::ALL {
            assert_eq!(DkgDataType::from_u8(ty.as_u8()), Some(ty));
        }
    }

    #[test]
    fn test_data_type_from_u8_out_of_range() {
        assert_eq!(DkgDataType::from_u8(7), None);
        assert_eq!(DkgDataType::from_u8(255), None);
    }

    #[test]
    fn test_data_type_all_is_ordered() {
        let ordinals: Vec<u8> = DkgDataType::ALL.iter().map(|t| t.as_u8()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(DkgDataType::PubKey.to_string(), "pub_key");
        assert_eq!(DkgDataType::ReconstructCommit.to_string(), "reconstruct_commit");
    }

    // ────────────────────────────────────────────────────────────────────────────
    // SIGN BYTES TESTS
    // ────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_sign_bytes_deterministic() {
        let msg = sample_data();
        assert_eq!(msg.sign_bytes("rchain"), msg.sign_bytes("rchain"));
    }

    #[test]
    fn test_sign_bytes_binds_chain_id() {
        let msg = sample_data();
        assert_ne!(msg.sign_bytes("rchain"), msg.sign_bytes("other-chain"));
    }

    #[test]
    fn test_sign_bytes_binds_round_id() {
        let a = sample_data();
        let mut b = sample_data();
        b.round_id = 4;
        assert_ne!(a.sign_bytes("rchain"), b.sign_bytes("rchain"));
    }

    #[test]
    fn test_sign_bytes_excludes_signature() {
        let a = sample_data();
        let mut b = sample_data();
        b.signature = vec![0xFF; 64];
        assert_eq!(a.sign_bytes("rchain"), b.sign_bytes("rchain"));
    }

    #[test]
    fn test_sign_bytes_layout_length() {
        let msg = sample_data();
        let bytes = msg.sign_bytes("rchain");
        assert_eq!(bytes.len(), 8 + 6 + 1 + 4 + 20 + 8 + 2);
    }

    // ────────────────────────────────────────────────────────────────────────────
    // VALIDATION TESTS
    // ────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_ok() {
        assert!(sample_data().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_payload() {
        let msg = DkgData::new(DkgDataType::PubKey, 1, sample_addr(), vec![]);
        assert_eq!(msg.validate(), Err(ValidationError::EmptyPayload));
    }

    #[test]
    fn test_validate_empty_sender() {
        let msg = DkgData::new(DkgDataType::PubKey, 1, Address::zero(), vec![1]);
        assert_eq!(msg.validate(), Err(ValidationError::EmptySender));
    }

    #[test]
    fn test_validate_signature_length() {
        let mut msg = sample_data();
        msg.signature = vec![0u8; 32];
        assert_eq!(
            msg.validate(),
            Err(ValidationError::InvalidSignatureLength { expected: 64, got: 32 })
        );

        msg.signature = vec![0u8; 64];
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_validation_error_display() {
        assert!(!ValidationError::EmptyPayload.to_string().is_empty());
        assert!(ValidationError::InvalidDataType { got: 9 }
            .to_string()
            .contains('9'));
    }
}
