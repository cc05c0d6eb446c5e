//! Transaction builder with local account-number/sequence management.
//!
//! The builder fetches the account number and sequence lazily on the first
//! build, then keeps the sequence locally: the on-chain DKG driver advances
//! it once per broadcast attempt, whether or not the node accepted the
//! transaction. Sequence advances on submission, not inclusion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use std::fmt;

use randnet_common::priv_validator::PrivValidator;
use randnet_proto::msgs::MsgSendDkgData;

use crate::rpc::{ChainClient, ClientError};

/// Default gas wanted for DKG data transactions.
pub const DEFAULT_GAS: u64 = 400_000;

/// Response definition for tx gas estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasEstimateResponse {
    pub gas_estimate: u64,
}

impl fmt::Display for GasEstimateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gas estimate: {}", self.gas_estimate)
    }
}

/// Signable transaction body. Bincode-encoded as the sign bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub gas: u64,
    pub memo: String,
    pub msgs: Vec<MsgSendDkgData>,
}

impl TxBody {
    pub fn sign_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_else(|_| Vec::new())
    }
}

/// A built and signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub body: TxBody,
    pub pub_key: [u8; 32],
    pub signature: Vec<u8>,
}

/// Builds and signs `MsgSendDkgData` transactions.
///
/// Owned exclusively by one on-chain driver; the sequence counter must not
/// be shared with other signing paths.
pub struct TxBuilder {
    chain_id: String,
    gas: u64,
    memo: String,
    signer: Arc<dyn PrivValidator>,
    account_number: Option<u64>,
    sequence: Option<u64>,
}

impl TxBuilder {
    pub fn new(chain_id: impl Into<String>, signer: Arc<dyn PrivValidator>) -> Self {
        TxBuilder {
            chain_id: chain_id.into(),
            gas: DEFAULT_GAS,
            memo: String::new(),
            signer,
            account_number: None,
            sequence: None,
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_account_number(mut self, account_number: u64) -> Self {
        self.account_number = Some(account_number);
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn signer_address(&self) -> randnet_common::types::Address {
        self.signer.address()
    }

    /// Locally known sequence. `None` until the first build fetched it.
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// Populate account number and sequence from the chain if either is
    /// still unknown. Values already set locally are kept.
    pub fn prepare(&mut self, client: &dyn ChainClient) -> Result<(), ClientError> {
        if self.account_number.is_some() && self.sequence.is_some() {
            return Ok(());
        }
        let (num, seq) = client.account_number_sequence(&self.signer.address())?;
        if self.account_number.is_none() {
            self.account_number = Some(num);
        }
        if self.sequence.is_none() {
            self.sequence = Some(seq);
        }
        Ok(())
    }

    /// Build and sign a transaction carrying the given messages.
    ///
    /// Does NOT advance the sequence; the caller advances it per
    /// submission via [`TxBuilder::increment_sequence`].
    pub fn build_and_sign(
        &mut self,
        client: &dyn ChainClient,
        msgs: Vec<MsgSendDkgData>,
    ) -> Result<SignedTx, ClientError> {
        self.prepare(client)?;
        let body = TxBody {
            chain_id: self.chain_id.clone(),
            account_number: self.account_number.unwrap_or(0),
            sequence: self.sequence.unwrap_or(0),
            gas: self.gas,
            memo: self.memo.clone(),
            msgs,
        };
        let signature = self
            .signer
            .sign(&body.sign_bytes())
            .map_err(|e| ClientError::Sign(e.to_string()))?;
        Ok(SignedTx {
            body,
            pub_key: self.signer.pub_key(),
            signature,
        })
    }

    /// Advance the local sequence by one. No-op before the first fetch.
    pub fn increment_sequence(&mut self) {
        if let Some(seq) = self.sequence {
            self.sequence = Some(seq + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryChainClient;
    use randnet_common::priv_validator::MockPV;
    use randnet_common::types::Address;
    use randnet_proto::dkg::{DkgData, DkgDataType};

    fn sample_msg(from: Address) -> MsgSendDkgData {
        MsgSendDkgData::new(
            DkgData::new(DkgDataType::PubKey, 1, from, vec![0x01]),
            from,
        )
    }

    #[test]
    fn test_lazy_account_fetch_on_first_build() {
        let pv = Arc::new(MockPV::from_seed(1));
        let client = MemoryChainClient::new();
        client.register_account(pv.address(), 7, 42);

        let mut builder = TxBuilder::new("rchain", pv.clone());
        assert_eq!(builder.sequence(), None);

        let tx = builder
            .build_and_sign(&client, vec![sample_msg(pv.address())])
            .expect("build");
        assert_eq!(tx.body.account_number, 7);
        assert_eq!(tx.body.sequence, 42);
        assert_eq!(builder.sequence(), Some(42));
    }

    #[test]
    fn test_locally_set_values_not_overwritten() {
        let pv = Arc::new(MockPV::from_seed(1));
        let client = MemoryChainClient::new();
        client.register_account(pv.address(), 7, 42);

        let mut builder = TxBuilder::new("rchain", pv.clone())
            .with_account_number(3)
            .with_sequence(9);
        builder.prepare(&client).expect("prepare");
        let tx = builder
            .build_and_sign(&client, vec![sample_msg(pv.address())])
            .expect("build");
        assert_eq!(tx.body.account_number, 3);
        assert_eq!(tx.body.sequence, 9);
    }

    #[test]
    fn test_increment_sequence() {
        let pv = Arc::new(MockPV::from_seed(2));
        let mut builder = TxBuilder::new("rchain", pv).with_sequence(10);
        builder.increment_sequence();
        assert_eq!(builder.sequence(), Some(11));
    }

    #[test]
    fn test_increment_sequence_before_fetch_is_noop() {
        let pv = Arc::new(MockPV::from_seed(2));
        let mut builder = TxBuilder::new("rchain", pv);
        builder.increment_sequence();
        assert_eq!(builder.sequence(), None);
    }

    #[test]
    fn test_signature_covers_body() {
        let pv = Arc::new(MockPV::from_seed(3));
        let client = MemoryChainClient::new();
        let mut builder = TxBuilder::new("rchain", pv.clone());
        let tx = builder
            .build_and_sign(&client, vec![sample_msg(pv.address())])
            .expect("build");

        let ok = randnet_common::crypto::verify_signature(
            &tx.pub_key,
            &tx.body.sign_bytes(),
            &tx.signature,
        )
        .expect("verify");
        assert!(ok);
    }

    #[test]
    fn test_gas_estimate_response_display() {
        let resp = GasEstimateResponse { gas_estimate: 180_000 };
        assert_eq!(resp.to_string(), "gas estimate: 180000");
    }
}
