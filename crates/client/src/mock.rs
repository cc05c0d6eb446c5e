//! In-memory chain client for tests and local simulation.
//!
//! `MemoryChainClient` models the only chain surface the DKG drivers use:
//! broadcast transactions land in seven per-phase buckets, and the
//! `custom/randapp/dkgData/<type>` query path serves each bucket back as a
//! length-prefixed batch. Several drivers sharing one instance behave like
//! validators sharing one chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use randnet_common::types::Address;
use randnet_proto::dkg::DkgDataType;
use randnet_proto::encoding::encode_msgs;
use randnet_proto::msgs::{MsgSendDkgData, QUERY_DKG_DATA_PATH};
use randnet_proto::NUM_DATA_TYPES;

use crate::rpc::{BroadcastResponse, ChainClient, ClientError};
use crate::tx::SignedTx;

pub struct MemoryChainClient {
    buckets: Mutex<Vec<Vec<MsgSendDkgData>>>,
    accounts: Mutex<HashMap<Address, (u64, u64)>>,
    fail_broadcasts: AtomicBool,
}

impl MemoryChainClient {
    pub fn new() -> Self {
        MemoryChainClient {
            buckets: Mutex::new(vec![Vec::new(); NUM_DATA_TYPES]),
            accounts: Mutex::new(HashMap::new()),
            fail_broadcasts: AtomicBool::new(false),
        }
    }

    /// Seed an account number/sequence pair for an address.
    pub fn register_account(&self, addr: Address, account_number: u64, sequence: u64) {
        self.accounts
            .lock()
            .insert(addr, (account_number, sequence));
    }

    /// Make every subsequent broadcast fail at the transport level.
    pub fn set_fail_broadcasts(&self, fail: bool) {
        self.fail_broadcasts.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored messages for one phase bucket.
    pub fn messages(&self, data_type: DkgDataType) -> Vec<MsgSendDkgData> {
        self.buckets.lock()[data_type.as_u8() as usize].clone()
    }
}

impl Default for MemoryChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for MemoryChainClient {
    fn query_with_data(&self, path: &str, _data: &[u8]) -> Result<Vec<u8>, ClientError> {
        let ordinal = path
            .strip_prefix(QUERY_DKG_DATA_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ClientError::Query(format!("unknown query path: {}", path)))?;
        let ordinal: u8 = ordinal
            .parse()
            .map_err(|_| ClientError::Query(format!("bad data type segment: {}", ordinal)))?;
        let data_type = DkgDataType::from_u8(ordinal)
            .ok_or_else(|| ClientError::Query(format!("data type out of range: {}", ordinal)))?;

        let buckets = self.buckets.lock();
        Ok(encode_msgs(&buckets[data_type.as_u8() as usize]))
    }

    fn broadcast_tx(&self, tx: &SignedTx) -> Result<BroadcastResponse, ClientError> {
        if self.fail_broadcasts.load(Ordering::SeqCst) {
            return Err(ClientError::Broadcast("connection refused".to_string()));
        }

        let mut buckets = self.buckets.lock();
        for msg in &tx.body.msgs {
            msg.validate_basic()
                .map_err(|e| ClientError::Broadcast(e.to_string()))?;
            buckets[msg.data.data_type.as_u8() as usize].push(msg.clone());
        }
        Ok(BroadcastResponse {
            code: 0,
            log: String::new(),
        })
    }

    fn account_number_sequence(&self, addr: &Address) -> Result<(u64, u64), ClientError> {
        Ok(self.accounts.lock().get(addr).copied().unwrap_or((0, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TxBuilder;
    use randnet_common::priv_validator::{MockPV, PrivValidator};
    use randnet_proto::dkg::DkgData;
    use randnet_proto::encoding::decode_msgs;
    use std::sync::Arc;

    fn broadcast_one(client: &MemoryChainClient, pv: &Arc<MockPV>, ty: DkgDataType) {
        let msg = MsgSendDkgData::new(
            DkgData::new(ty, 1, pv.address(), vec![0xAB]),
            pv.address(),
        );
        let mut builder = TxBuilder::new("rchain", pv.clone());
        let tx = builder.build_and_sign(client, vec![msg]).expect("build");
        client.broadcast_tx(&tx).expect("broadcast");
    }

    #[test]
    fn test_broadcast_routes_to_phase_bucket() {
        let client = MemoryChainClient::new();
        let pv = Arc::new(MockPV::from_seed(1));
        broadcast_one(&client, &pv, DkgDataType::Deal);

        assert_eq!(client.messages(DkgDataType::Deal).len(), 1);
        assert!(client.messages(DkgDataType::PubKey).is_empty());
    }

    #[test]
    fn test_query_serves_encoded_bucket() {
        let client = MemoryChainClient::new();
        let pv = Arc::new(MockPV::from_seed(2));
        broadcast_one(&client, &pv, DkgDataType::Commits);

        let raw = client
            .query_with_data("custom/randapp/dkgData/4", &[])
            .expect("query");
        let msgs = decode_msgs(&raw).expect("decode");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].data.data_type, DkgDataType::Commits);
    }

    #[test]
    fn test_query_empty_bucket() {
        let client = MemoryChainClient::new();
        let raw = client
            .query_with_data("custom/randapp/dkgData/0", &[])
            .expect("query");
        let msgs = decode_msgs(&raw).expect("decode");
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_query_bad_path() {
        let client = MemoryChainClient::new();
        assert!(client.query_with_data("custom/other/path", &[]).is_err());
        assert!(client.query_with_data("custom/randapp/dkgData/9", &[]).is_err());
    }

    #[test]
    fn test_fail_broadcasts() {
        let client = MemoryChainClient::new();
        let pv = Arc::new(MockPV::from_seed(3));
        client.set_fail_broadcasts(true);

        let msg = MsgSendDkgData::new(
            DkgData::new(DkgDataType::PubKey, 1, pv.address(), vec![0x01]),
            pv.address(),
        );
        let mut builder = TxBuilder::new("rchain", pv.clone());
        let tx = builder.build_and_sign(&client, vec![msg]).expect("build");
        assert!(client.broadcast_tx(&tx).is_err());
        assert!(client.messages(DkgDataType::PubKey).is_empty());
    }

    #[test]
    fn test_account_lookup_defaults_to_zero() {
        let client = MemoryChainClient::new();
        let addr = Address::from_bytes([9; 20]);
        assert_eq!(client.account_number_sequence(&addr).unwrap(), (0, 0));
        client.register_account(addr, 5, 11);
        assert_eq!(client.account_number_sequence(&addr).unwrap(), (5, 11));
    }
}
