//! # Typed DKG Event Bus
//!
//! Publisher bertipe untuk event lifecycle DKG di atas
//! `tokio::sync::broadcast`. Peers menerima [`DkgEvent::Data`] dan
//! mengumpankannya kembali ke `handle_share`; operator surfaces
//! men-subscribe event lifecycle lainnya.
//!
//! Publish bersifat non-blocking dan tidak pernah gagal ke caller:
//! event tanpa subscriber dibuang, subscriber yang lamban kehilangan
//! event terlama (semantik `broadcast`).

use tokio::sync::broadcast;

use randnet_proto::dkg::DkgData;

use crate::scheduler::MSG_QUEUE_SIZE;

// ════════════════════════════════════════════════════════════════════════════════
// EVENTS
// ════════════════════════════════════════════════════════════════════════════════

/// Event lifecycle yang dipancarkan coordinator.
#[derive(Debug, Clone)]
pub enum DkgEvent {
    /// Round baru dimulai di node ini.
    Start {
        /// Round yang dimulai.
        round_id: u32,
    },

    /// Phase message signed siap di-gossip ke peers.
    Data {
        /// Message yang dikirim.
        msg: DkgData,
    },

    /// Round selesai; verifier baru staged.
    Successful {
        /// Height di mana swap akan terjadi.
        change_height: u64,
    },

    /// Verifier swap sudah dieksekusi.
    KeyChange {
        /// Height saat swap.
        height: u64,
    },
}

// ════════════════════════════════════════════════════════════════════════════════
// EVENT BUS
// ════════════════════════════════════════════════════════════════════════════════

/// Handle bus yang murah untuk di-clone; semua clone berbagi channel
/// broadcast yang sama.
#[derive(Clone)]
pub struct DkgEventBus {
    tx: broadcast::Sender<DkgEvent>,
}

impl DkgEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MSG_QUEUE_SIZE)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        DkgEventBus { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DkgEvent> {
        self.tx.subscribe()
    }

    pub fn publish_start(&self, round_id: u32) {
        self.publish(DkgEvent::Start { round_id });
    }

    pub fn publish_data(&self, msg: DkgData) {
        self.publish(DkgEvent::Data { msg });
    }

    pub fn publish_successful(&self, change_height: u64) {
        self.publish(DkgEvent::Successful { change_height });
    }

    pub fn publish_key_change(&self, height: u64) {
        self.publish(DkgEvent::KeyChange { height });
    }

    fn publish(&self, event: DkgEvent) {
        // no subscribers is fine; the event is simply dropped
        let _ = self.tx.send(event);
    }
}

impl Default for DkgEventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
