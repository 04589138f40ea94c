//! Transaction serialization as a `TransactionList`

use hiero_primitives::{AccountId, Hbar, TransactionId};
use hiero_proto::{self as proto, Message};

use super::{FrozenState, SignedEntry, Transaction, TransactionData, DEFAULT_VALID_DURATION};
use crate::key::duration_from_proto;
use crate::{SdkError, SdkResult};

impl<D: TransactionData> Transaction<D> {
    /// Serialize the transaction
    ///
    /// A frozen transaction encodes every (chunk, node) envelope with its
    /// signatures, so `from_bytes` restores it exactly. An unfrozen one
    /// encodes a single body without node account id carrying the whole
    /// payload; an explicit node set is not carried.
    pub fn to_bytes(&self) -> SdkResult<Vec<u8>> {
        let transaction_list = match &self.frozen {
            Some(frozen) => frozen.entries.iter().map(SignedEntry::to_proto).collect(),
            None => {
                let fee = self.max_transaction_fee.unwrap_or(Hbar::ZERO);
                let body = self.build_body(None, None, self.transaction_id, fee);
                vec![SignedEntry::new(body.encode_to_vec()).to_proto()]
            }
        };
        Ok(proto::TransactionList { transaction_list }.encode_to_vec())
    }

    /// Restore a transaction from `to_bytes` output
    ///
    /// The result is frozen when the bodies carry node account ids. Body bytes
    /// and signatures are kept verbatim.
    pub fn from_bytes(bytes: &[u8]) -> SdkResult<Self> {
        let list = proto::TransactionList::decode(bytes)?;
        if list.transaction_list.is_empty() {
            return Err(SdkError::Decode("transaction list is empty".into()));
        }

        let mut decoded = Vec::with_capacity(list.transaction_list.len());
        for transaction in list.transaction_list {
            let signed = proto::SignedTransaction::decode(transaction.signed_transaction_bytes.as_slice())?;
            let body = proto::TransactionBody::decode(signed.body_bytes.as_slice())?;
            decoded.push((signed, body));
        }

        if decoded[0].1.node_account_id.is_none() {
            return Self::from_unfrozen_body(decoded);
        }
        Self::from_frozen_bodies(decoded)
    }

    fn from_unfrozen_body(
        mut decoded: Vec<(proto::SignedTransaction, proto::TransactionBody)>,
    ) -> SdkResult<Self> {
        if decoded.len() != 1 {
            return Err(SdkError::Decode("bodies without node account id must come alone".into()));
        }
        let (_, body) = decoded.remove(0);
        let data = body.data.ok_or(SdkError::Decode("transaction body has no data".into()))?;

        let mut transaction = Self::with_data(D::from_body_data(data)?);
        transaction.transaction_id = body.transaction_id.map(TransactionId::try_from).transpose()?;
        transaction.max_transaction_fee =
            (body.transaction_fee > 0).then(|| Hbar::from_tinybars(body.transaction_fee as i64));
        transaction.valid_duration =
            body.transaction_valid_duration.map_or(DEFAULT_VALID_DURATION, duration_from_proto);
        transaction.memo = body.memo;
        Ok(transaction)
    }

    fn from_frozen_bodies(
        decoded: Vec<(proto::SignedTransaction, proto::TransactionBody)>,
    ) -> SdkResult<Self> {
        let mut transaction_ids: Vec<TransactionId> = Vec::new();
        let mut node_account_ids: Vec<AccountId> = Vec::new();
        let mut layout = Vec::with_capacity(decoded.len());
        for (_, body) in &decoded {
            let id = body
                .transaction_id
                .clone()
                .ok_or(SdkError::Decode("transaction body has no transaction id".into()))?;
            let id = TransactionId::try_from(id)?;
            let node = body
                .node_account_id
                .clone()
                .ok_or(SdkError::Decode("frozen bodies must all carry a node account id".into()))?;
            let node = AccountId::try_from(node)?;
            if !transaction_ids.contains(&id) {
                transaction_ids.push(id);
            }
            if !node_account_ids.contains(&node) {
                node_account_ids.push(node);
            }
            layout.push((id, node));
        }

        let nodes = node_account_ids.len();
        if transaction_ids.len() * nodes != decoded.len() {
            return Err(SdkError::Decode(format!(
                "{} envelopes do not form {} chunks for {} nodes",
                decoded.len(),
                transaction_ids.len(),
                nodes
            )));
        }
        for (i, (id, node)) in layout.iter().enumerate() {
            if *id != transaction_ids[i / nodes] || *node != node_account_ids[i % nodes] {
                return Err(SdkError::Decode(format!("envelope {} is out of chunk order", i)));
            }
        }

        let first = decoded[0].1.clone();
        let mut chunk_bodies = decoded.iter().step_by(nodes).map(|(_, body)| body.data.clone());
        let first_data = chunk_bodies
            .next()
            .flatten()
            .ok_or(SdkError::Decode("transaction body has no data".into()))?;
        let mut data = D::from_body_data(first_data)?;
        let first_chunk_len = data.chunk_data().map(|chunks| chunks.data.len());
        for later in chunk_bodies {
            data.merge_chunk(later.ok_or(SdkError::Decode("chunk body has no data".into()))?)?;
        }

        // the restored chunk layout must match the frozen one
        let chunk_count = transaction_ids.len();
        if let (Some(chunks), Some(len)) = (data.chunk_data_mut(), first_chunk_len) {
            if chunk_count > 1 {
                chunks.chunk_size = len.max(1);
                chunks.max_chunks = chunks.max_chunks.max(chunk_count);
            } else {
                chunks.chunk_size = chunks.chunk_size.max(len);
            }
        }

        let max_transaction_fee = Hbar::from_tinybars(first.transaction_fee as i64);
        let entries = decoded
            .into_iter()
            .map(|(signed, _)| SignedEntry {
                body_bytes: signed.body_bytes,
                sig_pairs: signed.sig_map.map(|map| map.sig_pair).unwrap_or_default(),
                cached: None,
            })
            .collect();

        let mut transaction = Self::with_data(data);
        transaction.transaction_id = transaction_ids.first().copied();
        transaction.node_account_ids = Some(node_account_ids.clone());
        transaction.max_transaction_fee = Some(max_transaction_fee);
        transaction.valid_duration =
            first.transaction_valid_duration.map_or(DEFAULT_VALID_DURATION, duration_from_proto);
        transaction.memo = first.memo;
        transaction.frozen = Some(FrozenState {
            node_account_ids,
            transaction_ids,
            max_transaction_fee,
            entries,
            current_chunk: 0,
        });
        Ok(transaction)
    }
}
