//! # Mock Dealer
//!
//! Dealer implementation untuk testing dan local simulation. Production
//! memasang dealer VSS asli lewat
//! [`DealerConstructor`](crate::dealer::DealerConstructor); mock ini
//! mengikuti contract yang sama tanpa kriptografi VSS:
//!
//! - Berjalan melalui happy path `PubKey → Deal → Response → Commits`,
//!   meng-emit broadcast setiap phase tepat satu kali begitu quorum phase
//!   sebelumnya tercapai.
//! - `Justification`/`Complaint`/`ReconstructCommit` di-absorb secara
//!   idempotent (phase ini hanya muncul saat ada misbehavior).
//! - Quorum configurable: default seluruh validator set; threshold `t`
//!   untuk skenario dengan participant yang diam.
//! - Participant yang tidak berkontribusi saat finalize dilaporkan
//!   sebagai losers.
//! - Payload [`POISON_PAYLOAD`] memicu handler error untuk menguji
//!   round-level failure path.
//!
//! Verifier hasil round adalah [`TestVerifier`] yang diderivasi dari
//! `(round_id, validator set)` — deterministik lintas node.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use randnet_common::crypto;
use randnet_common::priv_validator::PrivValidator;
use randnet_common::types::{Address, Validator, ValidatorSet};
use randnet_proto::dkg::{DkgData, DkgDataType};

use crate::dealer::{Dealer, DealerConstructor, DealerContext, DealerSink};
use crate::error::{DealerError, SinkError};
use crate::verifier::{TestVerifier, Verifier};

/// Payload yang membuat handler manapun gagal. Dipakai test untuk
/// menjalankan slash + retire path.
pub const POISON_PAYLOAD: &[u8] = b"poison";

// ════════════════════════════════════════════════════════════════════════════════
// TEST SINKS
// ════════════════════════════════════════════════════════════════════════════════

/// Sink yang membuang semua message.
pub struct NullSink;

impl DealerSink for NullSink {
    fn send(&self, _data: DkgData) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink yang mengumpulkan semua emisi untuk inspeksi test.
#[derive(Default)]
pub struct CollectSink {
    sent: Mutex<Vec<DkgData>>,
}

impl CollectSink {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(CollectSink::default())
    }

    pub fn drain(&self) -> Vec<DkgData> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl DealerSink for CollectSink {
    fn send(&self, data: DkgData) -> Result<(), SinkError> {
        self.sent.lock().push(data);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// MOCK DEALER
// ════════════════════════════════════════════════════════════════════════════════

/// Constructor untuk [`MockDealer`].
///
/// `quorum = None` menunggu kontribusi dari seluruh validator set;
/// `Some(t)` maju begitu `t` kontribusi per phase terkumpul.
#[must_use]
pub fn mock_dealer_constructor(quorum: Option<usize>) -> DealerConstructor {
    Arc::new(move |ctx| Box::new(MockDealer::new(ctx, quorum)))
}

pub struct MockDealer {
    round_id: u32,
    chain_id: String,
    validators: ValidatorSet,
    own_addr: Address,
    own_pub_key: [u8; 32],
    sink: Arc<dyn DealerSink>,
    quorum: usize,
    started: bool,
    seen: HashMap<DkgDataType, HashSet<Address>>,
    emitted: HashSet<DkgDataType>,
    verifier: Option<Arc<dyn Verifier>>,
    losers: Vec<Validator>,
    failed: Option<String>,
}

impl MockDealer {
    pub fn new(ctx: DealerContext, quorum: Option<usize>) -> Self {
        let quorum = quorum.unwrap_or_else(|| ctx.validators.len()).max(1);
        MockDealer {
            round_id: ctx.round_id,
            chain_id: ctx.chain_id,
            validators: ctx.validators,
            own_addr: ctx.priv_validator.address(),
            own_pub_key: ctx.priv_validator.pub_key(),
            sink: ctx.sink,
            quorum,
            started: false,
            seen: HashMap::new(),
            emitted: HashSet::new(),
            verifier: None,
            losers: Vec::new(),
            failed: None,
        }
    }

    fn payload_for(&self, data_type: DkgDataType) -> Vec<u8> {
        match data_type {
            DkgDataType::PubKey => self.own_pub_key.to_vec(),
            other => vec![other.as_u8()],
        }
    }

    /// Emit broadcast phase ini paling banyak satu kali.
    fn emit_once(&mut self, data_type: DkgDataType) -> Result<(), DealerError> {
        if !self.emitted.insert(data_type) {
            return Ok(());
        }
        debug!(round_id = self.round_id, phase = %data_type, "mock dealer: emitting phase broadcast");
        let data = DkgData::new(
            data_type,
            self.round_id,
            self.own_addr,
            self.payload_for(data_type),
        );
        self.sink.send(data)?;
        Ok(())
    }

    /// Catat kontribusi sender untuk satu phase, lalu coba maju.
    fn record(&mut self, phase: DkgDataType, msg: &DkgData) -> Result<(), DealerError> {
        if let Some(reason) = &self.failed {
            return Err(DealerError::Failed {
                reason: reason.clone(),
            });
        }
        let sender = self
            .validators
            .by_address(&msg.addr)
            .cloned()
            .ok_or(DealerError::UnknownValidator { addr: msg.addr })?;

        if msg.data == POISON_PAYLOAD {
            self.losers.push(sender);
            self.failed = Some(format!("invalid {} payload from {}", phase, msg.addr));
            return Err(DealerError::InvalidPayload {
                addr: msg.addr,
                reason: "payload rejected".to_string(),
            });
        }

        // duplicate dari sender yang sama di-absorb, tidak dihitung ganda
        self.seen.entry(phase).or_default().insert(msg.addr);
        self.advance(phase)
    }

    fn contributions(&self, phase: DkgDataType) -> usize {
        self.seen.get(&phase).map_or(0, HashSet::len)
    }

    fn advance(&mut self, phase: DkgDataType) -> Result<(), DealerError> {
        if self.contributions(phase) < self.quorum {
            return Ok(());
        }
        match phase {
            DkgDataType::PubKey => self.emit_once(DkgDataType::Deal),
            DkgDataType::Deal => self.emit_once(DkgDataType::Response),
            DkgDataType::Response => self.emit_once(DkgDataType::Commits),
            DkgDataType::Commits => {
                self.finalize();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finalize(&mut self) {
        if self.verifier.is_some() {
            return;
        }
        let contributed = self
            .seen
            .get(&DkgDataType::Commits)
            .cloned()
            .unwrap_or_default();
        self.losers = self
            .validators
            .iter()
            .filter(|v| !contributed.contains(&v.address))
            .cloned()
            .collect();
        self.verifier = Some(Arc::new(TestVerifier::new(self.round_id, &self.validators)));
        debug!(
            round_id = self.round_id,
            losers = self.losers.len(),
            "mock dealer: round complete"
        );
    }
}

impl Dealer for MockDealer {
    fn start(&mut self) -> Result<(), DealerError> {
        if self.started {
            return Err(DealerError::AlreadyStarted);
        }
        self.started = true;
        self.emit_once(DkgDataType::PubKey)
    }

    fn handle_pub_key(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::PubKey, msg)
    }

    fn handle_deal(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::Deal, msg)
    }

    fn handle_response(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::Response, msg)
    }

    fn handle_justification(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::Justification, msg)
    }

    fn handle_commits(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::Commits, msg)
    }

    fn handle_complaint(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::Complaint, msg)
    }

    fn handle_reconstruct_commit(&mut self, msg: &DkgData) -> Result<(), DealerError> {
        self.record(DkgDataType::ReconstructCommit, msg)
    }

    fn verify_message(&self, msg: &DkgData) -> Result<(), DealerError> {
        let sender = self
            .validators
            .by_address(&msg.addr)
            .ok_or(DealerError::UnknownValidator { addr: msg.addr })?;
        let ok = crypto::verify_signature(
            &sender.pub_key,
            &msg.sign_bytes(&self.chain_id),
            &msg.signature,
        )
        .map_err(|_| DealerError::InvalidSignature { addr: msg.addr })?;
        if !ok {
            return Err(DealerError::InvalidSignature { addr: msg.addr });
        }
        Ok(())
    }

    fn verifier(&self) -> Result<Arc<dyn Verifier>, DealerError> {
        if let Some(reason) = &self.failed {
            return Err(DealerError::Failed {
                reason: reason.clone(),
            });
        }
        self.verifier
            .as_ref()
            .cloned()
            .ok_or(DealerError::VerifierNotReady)
    }

    fn losers(&self) -> Vec<Validator> {
        self.losers.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
