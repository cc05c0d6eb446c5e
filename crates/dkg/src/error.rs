//! # DKG Error Types
//!
//! Module ini menyediakan error types untuk coordinator dan dealer:
//! - `DealerError`: Error dari dealer state machine
//! - `SinkError`: Error dari outbound message sink
//! - `OffChainError`: Fatal errors pada off-chain coordinator
//! - `OnChainError`: Errors pada on-chain block driver
//! - `VerifierError`: Error dari verifier operations
//!
//! ## Taksonomi
//!
//! | Kind | Penanganan |
//! |------|------------|
//! | Transient | `DealerError::VerifierNotReady` — retry block/message berikutnya |
//! | Message-level | signature invalid, payload malformed — log dan drop |
//! | Round-level | handler error — slash losers, retire round |
//! | Fatal | dealer gagal start, query/decode on-chain gagal — surface ke caller |

use std::error::Error;
use std::fmt;

use randnet_client::rpc::ClientError;
use randnet_common::types::Address;
use randnet_proto::dkg::DkgDataType;
use randnet_proto::encoding::CodecError;

// ════════════════════════════════════════════════════════════════════════════════
// VERIFIER ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Error dari verifier operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// Key share tidak tersedia untuk operasi ini.
    ShareUnavailable(String),
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierError::ShareUnavailable(reason) => {
                write!(f, "verifier: key share unavailable: {}", reason)
            }
        }
    }
}

impl Error for VerifierError {}

// ════════════════════════════════════════════════════════════════════════════════
// SINK ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Error dari outbound sink milik dealer.
#[derive(Debug, Clone)]
pub enum SinkError {
    /// Signing outbound message gagal.
    Sign(String),

    /// Broadcast transaksi on-chain gagal.
    Broadcast(String),

    /// Message queue lokal sudah ditutup.
    QueueClosed,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Sign(reason) => write!(f, "sink: failed to sign message: {}", reason),
            SinkError::Broadcast(reason) => {
                write!(f, "sink: failed to broadcast message: {}", reason)
            }
            SinkError::QueueClosed => write!(f, "sink: local message queue closed"),
        }
    }
}

impl Error for SinkError {}

// ════════════════════════════════════════════════════════════════════════════════
// DEALER ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Error dari dealer state machine.
#[derive(Debug, Clone)]
pub enum DealerError {
    /// Verifier belum siap — round masih berjalan. Transient.
    VerifierNotReady,

    /// Dealer sudah pernah di-start.
    AlreadyStarted,

    /// Message datang dari address di luar validator set round ini.
    UnknownValidator {
        /// Address pengirim.
        addr: Address,
    },

    /// Signature message tidak valid.
    InvalidSignature {
        /// Address pengirim.
        addr: Address,
    },

    /// Payload phase tidak dapat diproses.
    InvalidPayload {
        /// Address pengirim.
        addr: Address,
        /// Alasan kegagalan.
        reason: String,
    },

    /// Round gagal secara permanen.
    Failed {
        /// Alasan kegagalan.
        reason: String,
    },

    /// Error dari outbound sink saat emit message.
    Sink(SinkError),
}

impl fmt::Display for DealerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealerError::VerifierNotReady => write!(f, "dealer: verifier not ready yet"),
            DealerError::AlreadyStarted => write!(f, "dealer: already started"),
            DealerError::UnknownValidator { addr } => {
                write!(f, "dealer: message from unknown validator {}", addr)
            }
            DealerError::InvalidSignature { addr } => {
                write!(f, "dealer: invalid signature from {}", addr)
            }
            DealerError::InvalidPayload { addr, reason } => {
                write!(f, "dealer: invalid payload from {}: {}", addr, reason)
            }
            DealerError::Failed { reason } => write!(f, "dealer: round failed: {}", reason),
            DealerError::Sink(e) => write!(f, "dealer: {}", e),
        }
    }
}

impl Error for DealerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DealerError::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SinkError> for DealerError {
    fn from(e: SinkError) -> Self {
        DealerError::Sink(e)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OFF-CHAIN ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Fatal errors dari off-chain coordinator.
///
/// Message-level dan round-level failures TIDAK muncul di sini — keduanya
/// di-log dan di-absorb oleh coordinator.
#[derive(Debug)]
pub enum OffChainError {
    /// Coordinator dibangun tanpa priv validator.
    MissingPrivValidator,

    /// Dealer gagal di-start saat round creation. Fatal.
    DealerStart {
        /// Round yang gagal dibuat.
        round_id: u32,
        /// Error penyebab.
        source: DealerError,
    },
}

impl fmt::Display for OffChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffChainError::MissingPrivValidator => {
                write!(f, "off-chain dkg: priv validator is required")
            }
            OffChainError::DealerStart { round_id, source } => {
                write!(
                    f,
                    "off-chain dkg: failed to start dealer for round {}: {}",
                    round_id, source
                )
            }
        }
    }
}

impl Error for OffChainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OffChainError::DealerStart { source, .. } => Some(source),
            OffChainError::MissingPrivValidator => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// ON-CHAIN ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Errors dari on-chain block driver.
#[derive(Debug)]
pub enum OnChainError {
    /// `process_block` dipanggil sebelum `start_round`.
    RoundNotStarted,

    /// Query DKG messages gagal.
    Query {
        /// Phase type yang sedang di-query.
        data_type: DkgDataType,
        /// Error penyebab.
        source: ClientError,
    },

    /// Decode response body gagal.
    Decode {
        /// Phase type yang sedang di-decode.
        data_type: DkgDataType,
        /// Error penyebab.
        source: CodecError,
    },

    /// Dealer handler menolak sebuah message.
    Handler {
        /// Phase type dari message yang gagal.
        data_type: DkgDataType,
        /// Error penyebab.
        source: DealerError,
    },

    /// Dealer gagal setelah semua phase diproses (bukan not-ready).
    Dealer(DealerError),
}

impl fmt::Display for OnChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnChainError::RoundNotStarted => {
                write!(f, "on-chain dkg: round has not been started")
            }
            OnChainError::Query { data_type, source } => {
                write!(
                    f,
                    "on-chain dkg: failed to query {} messages: {}",
                    data_type, source
                )
            }
            OnChainError::Decode { data_type, source } => {
                write!(
                    f,
                    "on-chain dkg: failed to decode {} messages: {}",
                    data_type, source
                )
            }
            OnChainError::Handler { data_type, source } => {
                write!(
                    f,
                    "on-chain dkg: failed to handle {} message: {}",
                    data_type, source
                )
            }
            OnChainError::Dealer(e) => write!(f, "on-chain dkg: round failed: {}", e),
        }
    }
}

impl Error for OnChainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OnChainError::RoundNotStarted => None,
            OnChainError::Query { source, .. } => Some(source),
            OnChainError::Decode { source, .. } => Some(source),
            OnChainError::Handler { source, .. } => Some(source),
            OnChainError::Dealer(e) => Some(e),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
