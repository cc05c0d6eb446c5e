//! Chain RPC abstraction.
//!
//! The DKG on-chain driver talks to the node through `ChainClient`:
//! ABCI-style queries with a path + payload, signed transaction broadcast,
//! and account number/sequence retrieval. Production wires this to the
//! node's RPC endpoint; tests use the in-memory chain from [`crate::mock`].

use thiserror::Error;

use randnet_common::types::Address;

use crate::tx::SignedTx;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("account lookup failed: {0}")]
    Account(String),

    #[error("signing failed: {0}")]
    Sign(String),
}

/// Result of a transaction broadcast.
///
/// `code == 0` means the node accepted the transaction into its mempool;
/// acceptance is not inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResponse {
    pub code: u32,
    pub log: String,
}

impl BroadcastResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Client surface the DKG drivers depend on.
pub trait ChainClient: Send + Sync {
    /// ABCI-style query: path plus opaque request payload.
    fn query_with_data(&self, path: &str, data: &[u8]) -> Result<Vec<u8>, ClientError>;

    /// Broadcast a signed transaction to the node.
    fn broadcast_tx(&self, tx: &SignedTx) -> Result<BroadcastResponse, ClientError>;

    /// Fetch the on-chain account number and sequence for an address.
    fn account_number_sequence(&self, addr: &Address) -> Result<(u64, u64), ClientError>;
}
