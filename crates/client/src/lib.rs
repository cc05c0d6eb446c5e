//! # Randnet Client Crate
//!
//! Chain access layer for the DKG drivers:
//! - `rpc`: the `ChainClient` trait (query, broadcast, account lookup)
//! - `tx`: transaction building and signing with local sequence management
//! - `mock`: an in-memory chain shared by tests and local simulation

pub mod mock;
pub mod rpc;
pub mod tx;

pub use mock::MemoryChainClient;
pub use rpc::{BroadcastResponse, ChainClient, ClientError};
pub use tx::{GasEstimateResponse, SignedTx, TxBody, TxBuilder, DEFAULT_GAS};
