//! Serialization property tests for hiero-sdk

use hiero_sdk::transaction::AnyTransactionData;
use hiero_sdk::{
    AccountId, AnyTransaction, Hbar, PrivateKey, Timestamp, TopicId, TopicMessageSubmitTransaction,
    TransactionId, TransferTransaction,
};
use proptest::prelude::*;

fn tx_id(secs: i64, nanos: u32) -> TransactionId {
    TransactionId::with_valid_start(AccountId::from_num(2), Timestamp::new(secs, nanos))
}

fn nodes(count: usize) -> Vec<AccountId> {
    (0..count as u64).map(|i| AccountId::from_num(3 + i)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_frozen_transfer_bytes_stable(
        amount in 1i64..1_000_000_000,
        receiver in 1000u64..100_000,
        node_count in 1usize..4,
        secs in 1_600_000_000i64..1_900_000_000,
        nanos in 0u32..1_000_000_000,
        memo in "[a-z ]{0,40}",
    ) {
        let mut tx = TransferTransaction::new();
        tx.add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(-amount))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(receiver), Hbar::from_tinybars(amount))
            .unwrap()
            .set_transaction_memo(memo.clone())
            .unwrap()
            .set_node_account_ids(nodes(node_count))
            .unwrap()
            .set_transaction_id(tx_id(secs, nanos))
            .unwrap()
            .freeze()
            .unwrap();
        tx.sign(&PrivateKey::generate_ed25519()).unwrap();

        let bytes = tx.to_bytes().unwrap();
        let restored = TransferTransaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(restored.to_bytes().unwrap(), bytes.clone());
        prop_assert_eq!(restored.data(), tx.data());
        prop_assert_eq!(restored.transaction_memo(), memo.as_str());
        prop_assert_eq!(restored.transaction_hash_per_node().unwrap(), tx.transaction_hash_per_node().unwrap());

        let any = AnyTransaction::from_bytes(&bytes).unwrap();
        prop_assert!(matches!(any.data(), AnyTransactionData::Transfer(data) if data == tx.data()));
        prop_assert_eq!(any.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_chunked_message_bytes_stable(
        message in proptest::collection::vec(any::<u8>(), 1..3000),
        chunk_size in 256usize..1100,
        node_count in 1usize..3,
    ) {
        let mut tx = TopicMessageSubmitTransaction::new();
        tx.set_topic_id(TopicId::from_num(77))
            .unwrap()
            .set_message(message.clone())
            .unwrap()
            .set_chunk_size(chunk_size)
            .unwrap()
            .set_node_account_ids(nodes(node_count))
            .unwrap()
            .set_transaction_id(tx_id(1_700_000_000, 0))
            .unwrap()
            .freeze()
            .unwrap();
        let chunks = message.len().div_ceil(chunk_size);
        prop_assert_eq!(tx.required_chunks(), chunks);

        let bytes = tx.to_bytes().unwrap();
        let restored = TopicMessageSubmitTransaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(restored.data().message(), message.as_slice());
        prop_assert_eq!(restored.required_chunks(), chunks);
        prop_assert_eq!(restored.all_transaction_hashes_per_node().unwrap().len(), chunks);
        prop_assert_eq!(restored.to_bytes().unwrap(), bytes.clone());

        let any = AnyTransaction::from_bytes(&bytes).unwrap();
        prop_assert!(matches!(any.data(), AnyTransactionData::TopicMessageSubmit(_)));
        prop_assert_eq!(any.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_any_valid_start_restores_or_fails(secs in any::<i64>(), nanos in 0u32..1_000_000_000) {
        let mut tx = TransferTransaction::new();
        tx.add_hbar_transfer(AccountId::from_num(1001), Hbar::from_tinybars(1))
            .unwrap()
            .set_node_account_ids(nodes(1))
            .unwrap()
            .set_transaction_id(tx_id(secs, nanos))
            .unwrap()
            .freeze()
            .unwrap();

        let bytes = tx.to_bytes().unwrap();
        let in_range = Timestamp::try_new(secs, nanos).is_ok();
        match TransferTransaction::from_bytes(&bytes) {
            Ok(restored) => {
                prop_assert!(in_range);
                prop_assert_eq!(restored.to_bytes().unwrap(), bytes);
            }
            Err(_) => prop_assert!(!in_range),
        }
    }

    #[test]
    fn test_garbage_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = AnyTransaction::from_bytes(&bytes);
    }
}

#[test]
fn test_unfrozen_transfer_drops_node_set() {
    let mut tx = TransferTransaction::new();
    tx.add_hbar_transfer(AccountId::from_num(2), Hbar::new(-3))
        .unwrap()
        .add_hbar_transfer(AccountId::from_num(1001), Hbar::new(3))
        .unwrap()
        .set_node_account_ids(nodes(2))
        .unwrap();

    let restored = TransferTransaction::from_bytes(&tx.to_bytes().unwrap()).unwrap();
    assert!(!restored.is_frozen());
    assert_eq!(restored.node_account_ids(), None);
    assert_eq!(restored.data(), tx.data());
}

#[test]
fn test_restored_transaction_accepts_more_signatures() {
    let mut tx = TransferTransaction::new();
    tx.add_hbar_transfer(AccountId::from_num(2), Hbar::new(-3))
        .unwrap()
        .add_hbar_transfer(AccountId::from_num(1001), Hbar::new(3))
        .unwrap()
        .set_node_account_ids(nodes(2))
        .unwrap()
        .set_transaction_id(tx_id(1_700_000_000, 42))
        .unwrap()
        .freeze()
        .unwrap();
    let first = PrivateKey::generate_ed25519();
    tx.sign(&first).unwrap();

    let mut restored = TransferTransaction::from_bytes(&tx.to_bytes().unwrap()).unwrap();
    let second = PrivateKey::generate_ecdsa();
    restored.sign(&second).unwrap();

    let signatures = restored.signatures().unwrap();
    assert_eq!(signatures.len(), 2);
    for by_key in signatures.values() {
        assert!(by_key.contains_key(&first.public_key()));
        assert!(by_key.contains_key(&second.public_key()));
    }
    assert_ne!(restored.transaction_hash().unwrap(), tx.transaction_hash().unwrap());
}
