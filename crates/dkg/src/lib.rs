//! # Randnet DKG Crate
//!
//! Core coordinator untuk Distributed Key Generation pada validator set
//! BFT. Committee threshold-signing di-rekey secara periodik sehingga
//! validator set selalu memegang fresh jointly-held key: quorum `t`-of-`n`
//! bisa menghasilkan signature, koalisi di bawah threshold tidak.
//!
//! ## Arsitektur
//!
//! ```text
//!   Height Scheduler ──► start_round ──► Round Registry ──► Dealer
//!         │                                                   │
//!         │ swap di change_height                             │ emit
//!         ▼                                                   ▼
//!   current/next Verifier ◄── Coordinator ◄── inbound ◄── Transport
//! ```
//!
//! Dua transport regime berbagi logika round yang sama:
//!
//! - **Off-chain** ([`offchain::OffChainDkg`]): signed gossip di event
//!   bus, dengan self-loopback queue.
//! - **On-chain** ([`onchain::OnChainDkg`]): messages dipersist sebagai
//!   transaksi, ditarik per block dalam urutan phase yang fixed.
//!
//! ## Modules
//!
//! | Module | Deskripsi |
//! |--------|-----------|
//! | [`dealer`] | Contract dealer VSS eksternal + sink bertipe |
//! | [`verifier`] | Trait verifier + implementasi test/bootstrap |
//! | [`registry`] | Registry `round_id → dealer` dengan tombstones |
//! | [`offchain`] | Coordinator gossip transport |
//! | [`onchain`] | Driver block-pull transport |
//! | [`scheduler`] | Kebijakan height (cadence, change height) |
//! | [`events`] | Typed event bus lifecycle DKG |
//! | [`mock`] | Mock dealer untuk test dan simulation |
//! | [`error`] | Taksonomi error coordinator |
//!
//! ## Lifecycle
//!
//! Dealer: dibuat saat round pertama kali direferensikan → `start()` →
//! memproses phase messages → terminal pada verifier ready atau failed
//! (dengan losers). Coordinator: dibangun saat node boot dengan bootstrap
//! verifier, hidup selama process.

pub mod dealer;
pub mod error;
pub mod events;
pub mod mock;
pub mod offchain;
pub mod onchain;
pub mod registry;
pub mod scheduler;
pub mod verifier;

pub use dealer::{dispatch, Dealer, DealerConstructor, DealerContext, DealerSink};
pub use error::{DealerError, OffChainError, OnChainError, SinkError, VerifierError};
pub use events::{DkgEvent, DkgEventBus};
pub use mock::{mock_dealer_constructor, MockDealer, POISON_PAYLOAD};
pub use offchain::{OffChainDkg, OffChainDkgBuilder};
pub use onchain::{OnChainDkg, TxBroadcaster};
pub use registry::{RoundRegistry, RoundSlot, RoundStatus};
pub use scheduler::{
    change_height_for, coerce_num_blocks, round_cadence_reached, BLOCKS_AHEAD,
    CHANGE_HEIGHT_MODULUS, DEFAULT_DKG_NUM_BLOCKS, MSG_QUEUE_SIZE,
};
pub use verifier::{mock_verifier, MockVerifier, TestVerifier, Verifier};
