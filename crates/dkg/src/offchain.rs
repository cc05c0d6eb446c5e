//! # Off-Chain DKG Coordinator
//!
//! Coordinator yang menjalankan DKG rounds di atas signed-gossip
//! transport. Memegang pasangan verifier `current`/`next` beserta change
//! height, registry round → dealer, dan queue self-loopback.
//!
//! ## Call sites
//!
//! Coordinator dipanggil dari tiga konteks:
//! (a) consensus thread memanggil [`OffChainDkg::check_dkg_time`] per
//! committed block, (b) reactor thread mengumpankan inbound gossip ke
//! [`OffChainDkg::handle_share`], (c) sink dealer masuk kembali untuk
//! meng-enqueue self-loopback messages.
//!
//! Satu lock eksklusif menserialkan (a) dan (b). Sink TIDAK mengambil
//! lock: ia hanya sign, publish ke bus, dan menulis ke channel — karena
//! itu aman dipanggil oleh dealer saat lock sedang dipegang.
//!
//! ## Self-loopback
//!
//! Event bus tidak mengirim balik ke pengirimnya sendiri, jadi setiap
//! outbound message juga di-enqueue ke queue lokal untuk diproses node
//! ini. Queue penuh ditangani oleh detached task dengan budget terbatas;
//! melewati budget, self-delivery di-drop dengan warning.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use randnet_common::priv_validator::PrivValidator;
use randnet_common::types::{Validator, ValidatorSet};
use randnet_proto::dkg::DkgData;

use crate::dealer::{dispatch, DealerConstructor, DealerContext, DealerSink};
use crate::error::{DealerError, OffChainError, SinkError};
use crate::events::DkgEventBus;
use crate::mock::mock_dealer_constructor;
use crate::registry::{RoundRegistry, RoundStatus};
use crate::scheduler::{
    change_height_for, coerce_num_blocks, round_cadence_reached, MSG_QUEUE_SIZE,
    OVERFLOW_TASK_BUDGET,
};
use crate::verifier::Verifier;

// ════════════════════════════════════════════════════════════════════════════════
// SIGNED SENDER (DEALER SINK)
// ════════════════════════════════════════════════════════════════════════════════

/// Sink off-chain milik dealer: sign, gossip, self-loopback.
///
/// Handle ini sengaja tidak memegang referensi ke state coordinator —
/// dealer boleh memanggilnya kapan saja tanpa risiko re-entrancy ke lock.
struct SignedSender {
    chain_id: String,
    priv_validator: Arc<dyn PrivValidator>,
    bus: DkgEventBus,
    queue: mpsc::Sender<DkgData>,
    overflow_in_flight: Arc<AtomicUsize>,
}

impl DealerSink for SignedSender {
    fn send(&self, mut data: DkgData) -> Result<(), SinkError> {
        let signature = self
            .priv_validator
            .sign(&data.sign_bytes(&self.chain_id))
            .map_err(|e| SinkError::Sign(e.to_string()))?;
        data.signature = signature;
        debug!(signature = %hex::encode(&data.signature), "dkg: message signed");

        // Broadcast to peers. The bus does not deliver back to this node;
        // self-delivery goes through the local queue below.
        self.bus.publish_data(data.clone());

        match self.queue.try_send(data) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::QueueClosed),
            Err(mpsc::error::TrySendError::Full(data)) => {
                let permits = Arc::clone(&self.overflow_in_flight);
                if permits.fetch_add(1, Ordering::SeqCst) >= OVERFLOW_TASK_BUDGET {
                    permits.fetch_sub(1, Ordering::SeqCst);
                    warn!("dkg: message queue full and overflow budget exhausted, dropping self-delivery");
                    return Ok(());
                }
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        info!("dkg: message queue is full, finishing send in a detached task");
                        let queue = self.queue.clone();
                        handle.spawn(async move {
                            let _ = queue.send(data).await;
                            permits.fetch_sub(1, Ordering::SeqCst);
                        });
                        Ok(())
                    }
                    Err(_) => {
                        permits.fetch_sub(1, Ordering::SeqCst);
                        warn!("dkg: message queue full outside a runtime, dropping self-delivery");
                        Ok(())
                    }
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OFF-CHAIN DKG
// ════════════════════════════════════════════════════════════════════════════════

/// State di bawah lock coordinator.
struct OffChainState {
    current: Option<Arc<dyn Verifier>>,
    next: Option<Arc<dyn Verifier>>,
    change_height: u64,
    registry: RoundRegistry,
    round_id: u32,
}

/// Off-chain DKG coordinator untuk satu validator process.
///
/// ## Invariants
///
/// - `next` non-null ⇔ sebuah round selesai dan `change_height` belum tiba
/// - `change_height` selalu kelipatan 5 saat terisi; `0` berarti unset
/// - Round dengan id lebih kecil dari completion tertinggi selalu retired
pub struct OffChainDkg {
    state: Mutex<OffChainState>,
    queue_rx: Mutex<Option<mpsc::Receiver<DkgData>>>,
    sender: Arc<SignedSender>,
    bus: DkgEventBus,
    chain_id: String,
    priv_validator: Arc<dyn PrivValidator>,
    dealer_constructor: DealerConstructor,
    dkg_num_blocks: u64,
}

impl OffChainDkg {
    /// Mulai konstruksi coordinator. `bus` dibagikan dengan reactor
    /// gossip; `chain_id` mengikat semua signature message.
    pub fn builder(bus: DkgEventBus, chain_id: impl Into<String>) -> OffChainDkgBuilder {
        OffChainDkgBuilder {
            bus,
            chain_id: chain_id.into(),
            verifier: None,
            dkg_num_blocks: crate::scheduler::DEFAULT_DKG_NUM_BLOCKS,
            dealer_constructor: None,
            priv_validator: None,
        }
    }

    fn make_dealer(
        &self,
        round_id: u32,
        validators: &ValidatorSet,
    ) -> Box<dyn crate::dealer::Dealer> {
        (self.dealer_constructor)(DealerContext {
            round_id,
            chain_id: self.chain_id.clone(),
            validators: validators.clone(),
            priv_validator: Arc::clone(&self.priv_validator),
            sink: self.sender.clone(),
        })
    }

    /// Proses satu inbound DKG message.
    ///
    /// Return `Ok(true)` menandakan round-level failure yang meminta
    /// fallback ke on-chain mode; `Ok(false)` untuk semua jalur normal.
    /// `Err` hanya untuk kegagalan fatal (dealer tidak bisa di-start).
    pub fn handle_share(
        &self,
        msg: &DkgData,
        height: u64,
        validators: &ValidatorSet,
        sender_pub_key: &[u8],
    ) -> Result<bool, OffChainError> {
        let mut state = self.state.lock();

        if state.registry.is_retired(msg.round_id) {
            info!(round_id = msg.round_id, "dkg: received message for inactive round");
            return Ok(false);
        }

        if !state.registry.contains(msg.round_id) {
            info!(round_id = msg.round_id, "dkg: dealer not found, creating a new dealer");
            let mut dealer = self.make_dealer(msg.round_id, validators);
            if let Err(source) = dealer.start() {
                return Err(OffChainError::DealerStart {
                    round_id: msg.round_id,
                    source,
                });
            }
            state.registry.insert_active(msg.round_id, dealer);
        }

        let Some(dealer) = state.registry.active_mut(msg.round_id) else {
            return Ok(false);
        };

        debug!(signature = %hex::encode(&msg.signature), "dkg: received message with signature");
        if let Err(err) = dealer.verify_message(msg) {
            info!(
                error = %err,
                sender_pub_key = %hex::encode(sender_pub_key),
                "dkg: can't verify message"
            );
            return Ok(false);
        }
        debug!("dkg: message verified");

        info!(phase = %msg.data_type, from = %msg.addr, "dkg: received message");
        if let Err(err) = dispatch(dealer.as_mut(), msg) {
            error!(error = %err, phase = %msg.data_type, "dkg: failed to handle message");
            let losers = dealer.losers();
            self.slash(&losers);
            state.registry.retire(msg.round_id);
            return Ok(false);
        }

        match dealer.verifier() {
            Err(DealerError::VerifierNotReady) => {
                debug!("dkg: verifier not ready");
                Ok(false)
            }
            Err(err) => {
                error!(error = %err, "dkg: verifier should be ready, but it's not");
                let losers = dealer.losers();
                self.slash(&losers);
                state.registry.retire(msg.round_id);
                Ok(true)
            }
            Ok(verifier) => {
                info!(round_id = msg.round_id, "dkg: verifier is ready, retiring older rounds");
                let losers = dealer.losers();
                if !losers.is_empty() {
                    self.slash(&losers);
                }
                state.registry.retire_older_than(msg.round_id);
                state.next = Some(verifier);
                state.change_height = change_height_for(height);
                self.bus.publish_successful(state.change_height);
                Ok(false)
            }
        }
    }

    /// Dipanggil sekali per committed block dari consensus thread.
    ///
    /// Mengeksekusi verifier swap di change height dan memulai round
    /// baru pada cadence yang dikonfigurasi.
    pub fn check_dkg_time(
        &self,
        height: u64,
        validators: &ValidatorSet,
    ) -> Result<(), OffChainError> {
        let mut state = self.state.lock();

        if state.change_height != 0 && state.change_height == height {
            info!(height, "dkg: time to update verifier");
            state.current = state.next.take();
            state.change_height = 0;
            self.bus.publish_key_change(height);
        }

        if round_cadence_reached(height, self.dkg_num_blocks) {
            self.start_round_locked(&mut state, validators)?;
        }
        Ok(())
    }

    /// Mulai round baru secara eksplisit (round id berikutnya).
    pub fn start_round(&self, validators: &ValidatorSet) -> Result<(), OffChainError> {
        let mut state = self.state.lock();
        self.start_round_locked(&mut state, validators)
    }

    fn start_round_locked(
        &self,
        state: &mut OffChainState,
        validators: &ValidatorSet,
    ) -> Result<(), OffChainError> {
        state.round_id += 1;
        let round_id = state.round_id;
        info!(round_id, "dkg: starting round");

        if state.registry.contains(round_id) {
            return Ok(());
        }

        state
            .registry
            .insert_active(round_id, self.make_dealer(round_id, validators));
        self.bus.publish_start(round_id);

        if let Some(dealer) = state.registry.active_mut(round_id) {
            if let Err(source) = dealer.start() {
                state.registry.retire(round_id);
                return Err(OffChainError::DealerStart { round_id, source });
            }
        }
        Ok(())
    }

    fn slash(&self, losers: &[Validator]) {
        // identification only; enforcement lives outside the core
        for loser in losers {
            warn!(validator = %loser.address, "dkg: slashing validator");
        }
    }

    // ────────────────────────────────────────────────────────────────────────────
    // ACCESSORS
    // ────────────────────────────────────────────────────────────────────────────

    /// Verifier yang sedang aktif.
    #[must_use]
    pub fn verifier(&self) -> Option<Arc<dyn Verifier>> {
        self.state.lock().current.clone()
    }

    pub fn set_verifier(&self, verifier: Arc<dyn Verifier>) {
        self.state.lock().current = Some(verifier);
    }

    /// Verifier yang staged menunggu change height.
    #[must_use]
    pub fn next_verifier(&self) -> Option<Arc<dyn Verifier>> {
        self.state.lock().next.clone()
    }

    /// Change height yang dijadwalkan; `0` berarti tidak ada swap pending.
    #[must_use]
    pub fn change_height(&self) -> u64 {
        self.state.lock().change_height
    }

    /// Round id tertinggi yang dimulai secara lokal.
    #[must_use]
    pub fn round_id(&self) -> u32 {
        self.state.lock().round_id
    }

    /// Status round di registry (None untuk round yang tak dikenal).
    #[must_use]
    pub fn round_status(&self, round_id: u32) -> Option<RoundStatus> {
        self.state.lock().registry.status(round_id)
    }

    /// Ambil receiver queue self-loopback. Hanya tersedia sekali;
    /// consumer-nya adalah loop reactor node ini.
    #[must_use]
    pub fn take_msg_queue(&self) -> Option<mpsc::Receiver<DkgData>> {
        self.queue_rx.lock().take()
    }

    #[must_use]
    pub fn bus(&self) -> &DkgEventBus {
        &self.bus
    }

    /// Cadence yang dipakai coordinator ini (sesudah coercion).
    #[must_use]
    pub fn dkg_num_blocks(&self) -> u64 {
        self.dkg_num_blocks
    }

    /// Address validator node ini.
    #[must_use]
    pub fn address(&self) -> randnet_common::types::Address {
        self.priv_validator.address()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// BUILDER
// ════════════════════════════════════════════════════════════════════════════════

/// Builder untuk [`OffChainDkg`] — mirror dari functional options pada
/// konstruksi coordinator.
pub struct OffChainDkgBuilder {
    bus: DkgEventBus,
    chain_id: String,
    verifier: Option<Arc<dyn Verifier>>,
    dkg_num_blocks: u64,
    dealer_constructor: Option<DealerConstructor>,
    priv_validator: Option<Arc<dyn PrivValidator>>,
}

impl OffChainDkgBuilder {
    /// Bootstrap verifier awal (boleh mock sebelum DKG pertama selesai).
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Cadence round dalam blocks. Nol di-coerce ke default saat build.
    pub fn with_num_blocks(mut self, num_blocks: u64) -> Self {
        self.dkg_num_blocks = num_blocks;
        self
    }

    /// Override dealer constructor (untuk test). `None` diabaikan.
    pub fn with_dealer_constructor(mut self, constructor: Option<DealerConstructor>) -> Self {
        if let Some(constructor) = constructor {
            self.dealer_constructor = Some(constructor);
        }
        self
    }

    pub fn with_priv_validator(mut self, priv_validator: Arc<dyn PrivValidator>) -> Self {
        self.priv_validator = Some(priv_validator);
        self
    }

    pub fn build(self) -> Result<OffChainDkg, OffChainError> {
        let priv_validator = self
            .priv_validator
            .ok_or(OffChainError::MissingPrivValidator)?;
        let dkg_num_blocks = coerce_num_blocks(self.dkg_num_blocks);
        let dealer_constructor = self
            .dealer_constructor
            .unwrap_or_else(|| mock_dealer_constructor(None));

        let (queue_tx, queue_rx) = mpsc::channel(MSG_QUEUE_SIZE);
        let sender = Arc::new(SignedSender {
            chain_id: self.chain_id.clone(),
            priv_validator: Arc::clone(&priv_validator),
            bus: self.bus.clone(),
            queue: queue_tx,
            overflow_in_flight: Arc::new(AtomicUsize::new(0)),
        });

        Ok(OffChainDkg {
            state: Mutex::new(OffChainState {
                current: self.verifier,
                next: None,
                change_height: 0,
                registry: RoundRegistry::new(),
                round_id: 0,
            }),
            queue_rx: Mutex::new(Some(queue_rx)),
            sender,
            bus: self.bus,
            chain_id: self.chain_id,
            priv_validator,
            dealer_constructor,
            dkg_num_blocks,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
