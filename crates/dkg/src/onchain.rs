//! # On-Chain DKG Driver
//!
//! Driver satu round DKG di atas transport messages-as-transactions.
//! Phase messages dipersist sebagai transaksi; setiap block, node menarik
//! tujuh phase bucket dari chain lewat query
//! `custom/randapp/dkgData/<type>` dan mengumpankannya ke dealer.
//!
//! ## Phase ordering
//!
//! Setiap block membawa batch dari semua message yang sudah tersedia.
//! Memproses phase lebih awal sebelum phase berikutnya dalam block yang
//! sama membuat node yang tertinggal bisa mengejar beberapa phase
//! sekaligus per block.
//!
//! ## Sequence
//!
//! Sink broadcast menaikkan sequence tx builder tepat satu per
//! submission, berhasil maupun gagal — sequence mengikuti submission,
//! bukan inclusion.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use randnet_client::rpc::ChainClient;
use randnet_client::tx::TxBuilder;
use randnet_common::priv_validator::PrivValidator;
use randnet_common::types::{Address, Validator, ValidatorSet};
use randnet_proto::dkg::{DkgData, DkgDataType};
use randnet_proto::encoding::decode_msgs;
use randnet_proto::msgs::MsgSendDkgData;

use crate::dealer::{dispatch, Dealer, DealerConstructor, DealerContext, DealerSink};
use crate::error::{DealerError, OnChainError, SinkError};
use crate::verifier::Verifier;

// ════════════════════════════════════════════════════════════════════════════════
// TX BROADCASTER (DEALER SINK)
// ════════════════════════════════════════════════════════════════════════════════

/// Sink on-chain milik dealer: bungkus message sebagai transaksi,
/// sign, broadcast.
pub struct TxBroadcaster<C: ChainClient> {
    client: Arc<C>,
    builder: Mutex<TxBuilder>,
    from: Address,
}

impl<C: ChainClient> TxBroadcaster<C> {
    pub fn new(client: Arc<C>, builder: TxBuilder) -> Self {
        let from = builder.signer_address();
        TxBroadcaster {
            client,
            builder: Mutex::new(builder),
            from,
        }
    }

    /// Sequence yang diketahui builder saat ini.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.builder.lock().sequence()
    }

    fn chain_id(&self) -> String {
        self.builder.lock().chain_id().to_string()
    }
}

impl<C: ChainClient> DealerSink for TxBroadcaster<C> {
    fn send(&self, data: DkgData) -> Result<(), SinkError> {
        let msg = MsgSendDkgData::new(data, self.from);
        msg.validate_basic()
            .map_err(|e| SinkError::Broadcast(e.to_string()))?;

        let mut builder = self.builder.lock();
        let result = builder
            .build_and_sign(self.client.as_ref(), vec![msg])
            .and_then(|tx| self.client.broadcast_tx(&tx).map(|_| ()));
        // sequence advances on submission, not inclusion
        builder.increment_sequence();

        result.map_err(|e| SinkError::Broadcast(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// ON-CHAIN DKG
// ════════════════════════════════════════════════════════════════════════════════

/// Driver satu round DKG on-chain.
pub struct OnChainDkg<C: ChainClient> {
    client: Arc<C>,
    broadcaster: Arc<TxBroadcaster<C>>,
    dealer_constructor: DealerConstructor,
    dealer: Option<Box<dyn Dealer>>,
}

impl<C: ChainClient + 'static> OnChainDkg<C> {
    pub fn new(
        client: Arc<C>,
        tx_builder: TxBuilder,
        dealer_constructor: DealerConstructor,
    ) -> Self {
        let broadcaster = Arc::new(TxBroadcaster::new(Arc::clone(&client), tx_builder));
        OnChainDkg {
            client,
            broadcaster,
            dealer_constructor,
            dealer: None,
        }
    }

    /// Konstruksi dealer round ini dengan sink broadcast dan start.
    pub fn start_round(
        &mut self,
        validators: &ValidatorSet,
        priv_validator: Arc<dyn PrivValidator>,
        start_round_id: u32,
    ) -> Result<(), OnChainError> {
        let mut dealer = (self.dealer_constructor)(DealerContext {
            round_id: start_round_id,
            chain_id: self.broadcaster.chain_id(),
            validators: validators.clone(),
            priv_validator,
            sink: self.broadcaster.clone(),
        });
        dealer.start().map_err(OnChainError::Dealer)?;
        self.dealer = Some(dealer);
        Ok(())
    }

    /// Proses satu block: tarik tujuh phase bucket dalam urutan fixed,
    /// umpankan semua message ke dealer, lalu cek verifier.
    ///
    /// `Ok(true)` berarti round selesai; `Ok(false)` berarti coba lagi
    /// block berikutnya.
    pub fn process_block(&mut self) -> Result<bool, OnChainError> {
        let dealer = self.dealer.as_mut().ok_or(OnChainError::RoundNotStarted)?;

        for data_type in DkgDataType::ALL {
            let messages = fetch_dkg_messages(self.client.as_ref(), data_type)?;
            debug!(phase = %data_type, count = messages.len(), "dkg: fetched messages");
            for msg in &messages {
                dispatch(dealer.as_mut(), &msg.data)
                    .map_err(|source| OnChainError::Handler { data_type, source })?;
            }
        }

        match dealer.verifier() {
            Ok(_) => Ok(true),
            Err(DealerError::VerifierNotReady) => {
                info!("dkg: verifier not ready");
                Ok(false)
            }
            Err(err) => Err(OnChainError::Dealer(err)),
        }
    }

    /// Verifier hasil round (delegasi ke dealer).
    pub fn verifier(&self) -> Result<Arc<dyn Verifier>, OnChainError> {
        match &self.dealer {
            Some(dealer) => dealer.verifier().map_err(OnChainError::Dealer),
            None => Err(OnChainError::RoundNotStarted),
        }
    }

    /// Losers yang teridentifikasi dealer sejauh ini.
    #[must_use]
    pub fn losers(&self) -> Vec<Validator> {
        self.dealer.as_ref().map(|d| d.losers()).unwrap_or_default()
    }

    /// Sequence tx builder saat ini (untuk monitoring dan test).
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.broadcaster.sequence()
    }
}

/// Tarik dan decode satu phase bucket dari chain.
fn fetch_dkg_messages<C: ChainClient>(
    client: &C,
    data_type: DkgDataType,
) -> Result<Vec<MsgSendDkgData>, OnChainError> {
    let path = MsgSendDkgData::query_path(data_type);
    let raw = client
        .query_with_data(&path, &[])
        .map_err(|source| OnChainError::Query { data_type, source })?;
    decode_msgs(&raw).map_err(|source| OnChainError::Decode { data_type, source })
}

// ════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════════
