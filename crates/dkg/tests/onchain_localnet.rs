//! # On-Chain Localnet Integration Tests
//!
//! Empat driver on-chain berbagi satu chain in-memory: broadcast
//! mendarat di tujuh phase bucket dan `process_block` menarik bucket
//! tersebut dalam urutan fixed, persis seperti node yang mem-polling
//! chain sungguhan sekali per block.

use std::sync::Arc;

use randnet_client::mock::MemoryChainClient;
use randnet_client::tx::TxBuilder;
use randnet_common::priv_validator::{MockPV, PrivValidator};
use randnet_common::types::ValidatorSet;
use randnet_dkg::mock::mock_dealer_constructor;
use randnet_dkg::onchain::OnChainDkg;
use randnet_dkg::verifier::{TestVerifier, Verifier};
use randnet_proto::dkg::DkgDataType;

// ════════════════════════════════════════════════════════════════════════════════
// HARNESS
// ════════════════════════════════════════════════════════════════════════════════

fn make_localnet(
    n: u8,
) -> (
    Arc<MemoryChainClient>,
    Vec<Arc<MockPV>>,
    ValidatorSet,
    Vec<OnChainDkg<MemoryChainClient>>,
) {
    let client = Arc::new(MemoryChainClient::new());
    let pvs: Vec<Arc<MockPV>> = (1..=n).map(|i| Arc::new(MockPV::from_seed(i))).collect();
    let validators = ValidatorSet::new(pvs.iter().map(|pv| pv.validator(1)).collect());

    let nodes = pvs
        .iter()
        .map(|pv| {
            let builder = TxBuilder::new("rchain", pv.clone());
            OnChainDkg::new(
                Arc::clone(&client),
                builder,
                mock_dealer_constructor(None),
            )
        })
        .collect();

    (client, pvs, validators, nodes)
}

// ════════════════════════════════════════════════════════════════════════════════
// SINGLE ROUND, FOUR VALIDATORS
// ════════════════════════════════════════════════════════════════════════════════

#[test]
fn four_validators_complete_on_chain_round() {
    let (client, pvs, validators, mut nodes) = make_localnet(4);

    for (node, pv) in nodes.iter_mut().zip(&pvs) {
        node.start_round(&validators, pv.clone(), 0).expect("start round");
    }
    // every node persisted exactly one PubKey transaction
    assert_eq!(client.messages(DkgDataType::PubKey).len(), 4);

    // tick "blocks" until every instance reports done
    let mut done = vec![false; nodes.len()];
    for _block in 0..10 {
        for (i, node) in nodes.iter_mut().enumerate() {
            if !done[i] {
                done[i] = node.process_block().expect("process_block");
            }
        }
        if done.iter().all(|d| *d) {
            break;
        }
    }
    assert!(done.iter().all(|d| *d), "instances did not finish: {:?}", done);

    // all four verifiers agree on a signed message
    let expected = TestVerifier::new(0, &validators);
    for node in &nodes {
        let verifier = node.verifier().expect("verifier");
        let sig = verifier.sign_share(b"beacon seed").expect("sign");
        assert!(expected.verify(b"beacon seed", &sig));
        assert!(node.losers().is_empty());
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// SEQUENCE DISCIPLINE
// ════════════════════════════════════════════════════════════════════════════════

#[test]
fn sequence_advances_once_per_broadcast() {
    let (_client, pvs, validators, mut nodes) = make_localnet(4);

    for (node, pv) in nodes.iter_mut().zip(&pvs) {
        node.start_round(&validators, pv.clone(), 0).expect("start round");
        // PubKey broadcast at start
        assert_eq!(node.sequence(), Some(1));
    }

    let mut done = vec![false; nodes.len()];
    for _block in 0..10 {
        for (i, node) in nodes.iter_mut().enumerate() {
            if !done[i] {
                done[i] = node.process_block().expect("process_block");
            }
        }
        if done.iter().all(|d| *d) {
            break;
        }
    }

    // each instance broadcast PubKey, Deal, Response, Commits: four
    // submissions, four sequence increments
    for node in &nodes {
        assert_eq!(node.sequence(), Some(4));
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// PHASE BUCKETS
// ════════════════════════════════════════════════════════════════════════════════

#[test]
fn no_duplicate_phase_broadcasts_on_chain() {
    let (client, pvs, validators, mut nodes) = make_localnet(4);

    for (node, pv) in nodes.iter_mut().zip(&pvs) {
        node.start_round(&validators, pv.clone(), 0).expect("start round");
    }
    let mut done = vec![false; nodes.len()];
    for _block in 0..10 {
        for (i, node) in nodes.iter_mut().enumerate() {
            if !done[i] {
                done[i] = node.process_block().expect("process_block");
            }
        }
        if done.iter().all(|d| *d) {
            break;
        }
    }

    // re-processing accumulated chain state across blocks must not make
    // any instance re-emit a phase: one message per validator per phase
    for ty in [
        DkgDataType::PubKey,
        DkgDataType::Deal,
        DkgDataType::Response,
        DkgDataType::Commits,
    ] {
        assert_eq!(client.messages(ty).len(), 4, "phase {}", ty);
    }
    for ty in [
        DkgDataType::Justification,
        DkgDataType::Complaint,
        DkgDataType::ReconstructCommit,
    ] {
        assert!(client.messages(ty).is_empty(), "phase {}", ty);
    }
}
