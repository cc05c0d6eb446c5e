//! # Dealer Contract
//!
//! Dealer adalah state machine VSS per-round yang dimiliki kolaborator
//! eksternal: ia mengkonsumsi typed phase messages, meng-emit outgoing
//! messages lewat sink yang di-inject saat konstruksi, dan pada akhirnya
//! menghasilkan [`Verifier`](crate::verifier::Verifier) atau melaporkan
//! losers. Crate ini hanya mendefinisikan contract-nya; aritmetika
//! BLS/Pedersen VSS bukan tanggung jawab coordinator.
//!
//! ## Sink
//!
//! Dealer memegang typed handle [`DealerSink`] — BUKAN referensi balik ke
//! coordinator. Sink tidak boleh mencoba mengambil lock coordinator;
//! off-chain sink menulis ke channel, on-chain sink broadcast transaksi.
//!
//! ## Idempotence
//!
//! Setiap phase handler HARUS idempotent per `(sender, round)`: duplicate
//! message dari sender yang sama di-absorb, tidak pernah dihitung ganda.

use std::sync::Arc;

use randnet_common::priv_validator::PrivValidator;
use randnet_common::types::{Validator, ValidatorSet};
use randnet_proto::dkg::{DkgData, DkgDataType};

use crate::error::{DealerError, SinkError};
use crate::verifier::Verifier;

// ════════════════════════════════════════════════════════════════════════════════
// SINK
// ════════════════════════════════════════════════════════════════════════════════

/// Outbound path milik dealer untuk meng-emit phase messages.
pub trait DealerSink: Send + Sync {
    /// Kirim satu phase message keluar. Off-chain: sign + gossip +
    /// self-loopback. On-chain: bungkus sebagai transaksi dan broadcast.
    fn send(&self, data: DkgData) -> Result<(), SinkError>;
}

// ════════════════════════════════════════════════════════════════════════════════
// DEALER
// ════════════════════════════════════════════════════════════════════════════════

/// Context konstruksi untuk satu dealer round.
pub struct DealerContext {
    /// Round yang dilayani dealer ini.
    pub round_id: u32,
    /// Chain id yang mengikat signature off-chain messages.
    pub chain_id: String,
    /// Snapshot validator set saat round dibuat.
    pub validators: ValidatorSet,
    /// Identitas signing node ini.
    pub priv_validator: Arc<dyn PrivValidator>,
    /// Outbound sink.
    pub sink: Arc<dyn DealerSink>,
}

/// Per-round VSS state machine, didefinisikan lewat capability set-nya.
pub trait Dealer: Send {
    /// Inisialisasi state internal dan broadcast DKG public key node ini
    /// (phase message pertama).
    fn start(&mut self) -> Result<(), DealerError>;

    fn handle_pub_key(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_deal(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_response(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_justification(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_commits(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_complaint(&mut self, msg: &DkgData) -> Result<(), DealerError>;
    fn handle_reconstruct_commit(&mut self, msg: &DkgData) -> Result<(), DealerError>;

    /// Verifikasi signature message terhadap pubkey validator pengirim
    /// (off-chain path saja; on-chain path divalidasi di level transaksi).
    fn verify_message(&self, msg: &DkgData) -> Result<(), DealerError>;

    /// Verifier hasil round. [`DealerError::VerifierNotReady`] selama
    /// protocol masih berjalan.
    fn verifier(&self) -> Result<Arc<dyn Verifier>, DealerError>;

    /// Participants yang gagal submit, mengirim data invalid, atau kalah
    /// complaint. Kandidat slashing eksternal.
    fn losers(&self) -> Vec<Validator>;
}

/// Constructor injectable — production memasang dealer VSS asli, test
/// memasang mock.
pub type DealerConstructor = Arc<dyn Fn(DealerContext) -> Box<dyn Dealer> + Send + Sync>;

/// Dispatch satu message ke handler phase yang sesuai.
pub fn dispatch(dealer: &mut dyn Dealer, msg: &DkgData) -> Result<(), DealerError> {
    match msg.data_type {
        DkgDataType::PubKey => dealer.handle_pub_key(msg),
        DkgDataType::Deal => dealer.handle_deal(msg),
        DkgDataType::Response => dealer.handle_response(msg),
        DkgDataType::Justification => dealer.handle_justification(msg),
        DkgDataType::Commits => dealer.handle_commits(msg),
        DkgDataType::Complaint => dealer.handle_complaint(msg),
        DkgDataType::ReconstructCommit => dealer.handle_reconstruct_commit(msg),
    }
}
