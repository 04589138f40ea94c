//! Transaction builder: fields, freeze, signatures and hashes
//!
//! A [`Transaction`] is generic over its kind-specific [`TransactionData`].
//! Setters fail with [`SdkError::Frozen`] once the transaction is frozen; at
//! freeze time one body per (chunk, node) pair is serialized, and signatures
//! are collected against those exact bytes.

mod any;
mod bytes;
mod chunked;
mod execute;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use hiero_crypto::{sha384, PrivateKey, PublicKey};
use hiero_primitives::{AccountId, Hbar, TransactionId};
use hiero_proto::{self as proto, Message};

use crate::key::{duration_to_proto, parse_signature_pair, signature_pair};
use crate::{Client, SdkError, SdkResult};

pub use any::{AnyTransaction, AnyTransactionData};
pub use chunked::{ChunkData, ChunkInfo, ChunkedTransactionData};

/// Default validity window of a transaction
pub const DEFAULT_VALID_DURATION: Duration = Duration::from_secs(120);

/// Fee ceiling used when neither the transaction nor the client sets one
const FALLBACK_MAX_TRANSACTION_FEE: Hbar = Hbar::new(2);

/// Kind-specific part of a transaction
pub trait TransactionData: Clone + fmt::Debug + Send + Sync + 'static {
    /// gRPC method that submits this kind
    fn method(&self) -> &'static str;

    /// Body data for one chunk, or for the whole payload when `chunk` is `None`
    fn to_body_data(&self, chunk: Option<&ChunkInfo>) -> proto::transaction_body::Data;

    /// Rebuild from the body data of the first chunk
    fn from_body_data(data: proto::transaction_body::Data) -> SdkResult<Self>
    where
        Self: Sized;

    /// Append the payload of a later chunk while decoding
    fn merge_chunk(&mut self, _data: proto::transaction_body::Data) -> SdkResult<()> {
        Err(SdkError::Decode("transaction kind is not chunked".into()))
    }

    /// Chunked payload, for chunked kinds
    fn chunk_data(&self) -> Option<&ChunkData> {
        None
    }

    /// Mutable chunked payload, for chunked kinds
    fn chunk_data_mut(&mut self) -> Option<&mut ChunkData> {
        None
    }

    /// Check kind-specific required fields
    fn validate(&self) -> SdkResult<()> {
        Ok(())
    }
}

/// SHA-384 digest of a signed transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHash(pub [u8; 48]);

impl TransactionHash {
    /// Digest of signed transaction bytes
    pub fn of(signed_transaction_bytes: &[u8]) -> Self {
        TransactionHash(sha384(signed_transaction_bytes))
    }

    /// Hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", self.to_hex())
    }
}

/// One serialized body and the signatures gathered over it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SignedEntry {
    pub(crate) body_bytes: Vec<u8>,
    pub(crate) sig_pairs: Vec<proto::SignaturePair>,
    /// Encoded envelope, dropped whenever `sig_pairs` changes
    pub(crate) cached: Option<proto::Transaction>,
}

impl SignedEntry {
    fn new(body_bytes: Vec<u8>) -> Self {
        Self { body_bytes, sig_pairs: Vec::new(), cached: None }
    }

    pub(crate) fn signed_transaction_bytes(&self) -> Vec<u8> {
        proto::SignedTransaction {
            body_bytes: self.body_bytes.clone(),
            sig_map: Some(proto::SignatureMap { sig_pair: self.sig_pairs.clone() }),
        }
        .encode_to_vec()
    }

    pub(crate) fn to_proto(&self) -> proto::Transaction {
        proto::Transaction { signed_transaction_bytes: self.signed_transaction_bytes() }
    }

    fn has_signer(&self, key: &PublicKey) -> bool {
        let prefix = key.to_bytes();
        self.sig_pairs.iter().any(|pair| pair.pub_key_prefix == prefix)
    }

    fn push_signature(&mut self, pair: proto::SignaturePair) {
        self.sig_pairs.push(pair);
        self.cached = None;
    }
}

/// State fixed at freeze time
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrozenState {
    pub(crate) node_account_ids: Vec<AccountId>,
    /// One cascading id per chunk
    pub(crate) transaction_ids: Vec<TransactionId>,
    pub(crate) max_transaction_fee: Hbar,
    /// Indexed `chunk * node_count + node`
    pub(crate) entries: Vec<SignedEntry>,
    pub(crate) current_chunk: usize,
}

impl FrozenState {
    pub(crate) fn chunk_count(&self) -> usize {
        self.transaction_ids.len()
    }

    pub(crate) fn chunk_entries(&self, chunk: usize) -> &[SignedEntry] {
        let nodes = self.node_account_ids.len();
        &self.entries[chunk * nodes..(chunk + 1) * nodes]
    }

    pub(crate) fn entry(&self, chunk: usize, node: AccountId) -> Option<&SignedEntry> {
        let index = self.node_account_ids.iter().position(|id| *id == node)?;
        self.entries.get(chunk * self.node_account_ids.len() + index)
    }
}

/// A transaction of kind `D`
#[derive(Debug, Clone)]
pub struct Transaction<D> {
    node_account_ids: Option<Vec<AccountId>>,
    transaction_id: Option<TransactionId>,
    max_transaction_fee: Option<Hbar>,
    valid_duration: Duration,
    memo: String,
    data: D,
    frozen: Option<FrozenState>,
}

impl<D: TransactionData + Default> Default for Transaction<D> {
    fn default() -> Self {
        Self::with_data(D::default())
    }
}

impl<D: TransactionData + Default> Transaction<D> {
    /// Create an empty transaction
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: TransactionData> Transaction<D> {
    /// Create a transaction around kind data
    pub fn with_data(data: D) -> Self {
        Self {
            node_account_ids: None,
            transaction_id: None,
            max_transaction_fee: None,
            valid_duration: DEFAULT_VALID_DURATION,
            memo: String::new(),
            data,
            frozen: None,
        }
    }

    // ==================== Fields ====================

    fn require_not_frozen(&self) -> SdkResult<()> {
        if self.frozen.is_some() {
            return Err(SdkError::Frozen);
        }
        Ok(())
    }

    pub(crate) fn data_mut(&mut self) -> SdkResult<&mut D> {
        self.require_not_frozen()?;
        Ok(&mut self.data)
    }

    /// Kind-specific data
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Explicit node set, or the one adopted at freeze
    pub fn node_account_ids(&self) -> Option<&[AccountId]> {
        match &self.frozen {
            Some(frozen) => Some(&frozen.node_account_ids),
            None => self.node_account_ids.as_deref(),
        }
    }

    /// Restrict submission to these nodes
    pub fn set_node_account_ids(&mut self, ids: Vec<AccountId>) -> SdkResult<&mut Self> {
        self.require_not_frozen()?;
        self.node_account_ids = Some(ids);
        Ok(self)
    }

    /// Transaction id, explicit or assigned at freeze
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match &self.frozen {
            Some(frozen) => frozen.transaction_ids.first().copied(),
            None => self.transaction_id,
        }
    }

    /// Set the transaction id; its account pays the fee
    pub fn set_transaction_id(&mut self, id: TransactionId) -> SdkResult<&mut Self> {
        self.require_not_frozen()?;
        self.transaction_id = Some(id);
        Ok(self)
    }

    /// Fee ceiling, explicit or adopted at freeze
    pub fn max_transaction_fee(&self) -> Option<Hbar> {
        match &self.frozen {
            Some(frozen) => Some(frozen.max_transaction_fee),
            None => self.max_transaction_fee,
        }
    }

    /// Set the fee ceiling
    pub fn set_max_transaction_fee(&mut self, fee: Hbar) -> SdkResult<&mut Self> {
        self.require_not_frozen()?;
        self.max_transaction_fee = Some(fee);
        Ok(self)
    }

    /// Validity window
    pub fn transaction_valid_duration(&self) -> Duration {
        self.valid_duration
    }

    /// Set the validity window
    pub fn set_transaction_valid_duration(&mut self, duration: Duration) -> SdkResult<&mut Self> {
        self.require_not_frozen()?;
        self.valid_duration = duration;
        Ok(self)
    }

    /// Transaction memo
    pub fn transaction_memo(&self) -> &str {
        &self.memo
    }

    /// Set the transaction memo
    pub fn set_transaction_memo(&mut self, memo: impl Into<String>) -> SdkResult<&mut Self> {
        self.require_not_frozen()?;
        self.memo = memo.into();
        Ok(self)
    }

    /// Chunks the payload needs; 1 for kinds without a chunked payload
    pub fn required_chunks(&self) -> usize {
        self.data.chunk_data().map_or(1, ChunkData::required_chunks)
    }

    /// Chunk being executed; 0 when idle
    pub fn current_chunk(&self) -> usize {
        self.frozen.as_ref().map_or(0, |f| f.current_chunk)
    }

    fn is_large_chunked(&self) -> bool {
        self.data.chunk_data().map_or(false, ChunkData::is_multi_chunk)
    }

    // ==================== Freeze ====================

    /// Whether the transaction is frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Freeze using the process-wide default client for missing fields
    pub fn freeze(&mut self) -> SdkResult<&mut Self> {
        if self.is_frozen() {
            return Ok(self);
        }
        let client = Client::default_client();
        self.freeze_inner(client.as_ref())?;
        Ok(self)
    }

    /// Freeze using `client` for missing fields
    pub fn freeze_with(&mut self, client: &Client) -> SdkResult<&mut Self> {
        if self.is_frozen() {
            return Ok(self);
        }
        self.freeze_inner(Some(client))?;
        Ok(self)
    }

    fn freeze_inner(&mut self, client: Option<&Client>) -> SdkResult<()> {
        self.data.validate()?;
        let chunks = match self.data.chunk_data() {
            Some(chunk_data) => chunk_data.check_chunk_count()?,
            None => 1,
        };

        let transaction_id = match (self.transaction_id, client.and_then(Client::operator_account_id)) {
            (Some(id), _) => id,
            (None, Some(operator)) => TransactionId::generate(operator),
            (None, None) => return Err(SdkError::MissingField("transaction_id")),
        };

        let node_account_ids = match self.node_account_ids.as_ref().filter(|ids| !ids.is_empty()) {
            Some(ids) => ids.clone(),
            None => client
                .map(default_node_set)
                .filter(|ids| !ids.is_empty())
                .ok_or(SdkError::MissingField("node_account_ids"))?,
        };

        let max_transaction_fee = self
            .max_transaction_fee
            .or_else(|| client.map(Client::default_max_transaction_fee))
            .unwrap_or(FALLBACK_MAX_TRANSACTION_FEE);

        let transaction_ids: Vec<TransactionId> =
            (0..chunks).map(|k| transaction_id.plus_ticks(k as i64)).collect();

        let mut entries = Vec::with_capacity(chunks * node_account_ids.len());
        for (k, id) in transaction_ids.iter().enumerate() {
            let chunk = ChunkInfo {
                current: k,
                total: chunks,
                initial_transaction_id: transaction_id,
                current_transaction_id: *id,
            };
            for node in &node_account_ids {
                let body = self.build_body(Some(&chunk), Some(*node), Some(*id), max_transaction_fee);
                entries.push(SignedEntry::new(body.encode_to_vec()));
            }
        }

        tracing::debug!(
            transaction_id = %transaction_id,
            nodes = node_account_ids.len(),
            chunks,
            "transaction frozen"
        );
        self.frozen = Some(FrozenState {
            node_account_ids,
            transaction_ids,
            max_transaction_fee,
            entries,
            current_chunk: 0,
        });
        Ok(())
    }

    pub(crate) fn build_body(
        &self,
        chunk: Option<&ChunkInfo>,
        node: Option<AccountId>,
        transaction_id: Option<TransactionId>,
        max_transaction_fee: Hbar,
    ) -> proto::TransactionBody {
        proto::TransactionBody {
            transaction_id: transaction_id.map(Into::into),
            node_account_id: node.map(Into::into),
            transaction_fee: max_transaction_fee.to_tinybars().max(0) as u64,
            transaction_valid_duration: Some(duration_to_proto(self.valid_duration)),
            generate_record: false,
            memo: self.memo.clone(),
            data: Some(self.data.to_body_data(chunk)),
        }
    }

    pub(crate) fn frozen_state(&self) -> SdkResult<&FrozenState> {
        self.frozen.as_ref().ok_or(SdkError::NotFrozen)
    }

    // ==================== Signatures ====================

    /// Sign every body with `key`; a key that already signed is skipped
    pub fn sign(&mut self, key: &PrivateKey) -> SdkResult<&mut Self> {
        let frozen = self.frozen.as_mut().ok_or(SdkError::NotFrozen)?;
        let public_key = key.public_key();
        for entry in frozen.entries.iter_mut() {
            if entry.has_signer(&public_key) {
                continue;
            }
            let signature = key.sign(&entry.body_bytes)?;
            entry.push_signature(signature_pair(&public_key, signature));
        }
        Ok(self)
    }

    /// Sign with the client operator when it pays for the transaction
    pub(crate) fn sign_with_operator(&mut self, client: &Client) -> SdkResult<()> {
        let Some(operator) = client.operator() else {
            return Ok(());
        };
        let payer = self.frozen_state()?.transaction_ids.first().map(|id| id.account_id);
        if payer == Some(operator.account_id) {
            self.sign(&operator.signer)?;
        }
        Ok(())
    }

    /// Attach a signature produced elsewhere
    ///
    /// The signature is attached to every body as is; the network rejects it
    /// if it does not cover the body.
    pub fn add_signature(&mut self, public_key: PublicKey, signature: Vec<u8>) -> SdkResult<&mut Self> {
        if self.is_large_chunked() {
            return Err(SdkError::CannotSignLargeChunkedRequest);
        }
        let frozen = self.frozen.as_mut().ok_or(SdkError::NotFrozen)?;
        if signature.len() != 64 {
            return Err(SdkError::InvalidSignature(format!(
                "expected 64 signature bytes, got {}",
                signature.len()
            )));
        }
        for entry in frozen.entries.iter_mut() {
            if !entry.has_signer(&public_key) {
                entry.push_signature(signature_pair(&public_key, signature.clone()));
            }
        }
        Ok(self)
    }

    /// Signatures per node: public key to signature bytes
    pub fn signatures(&self) -> SdkResult<BTreeMap<AccountId, HashMap<PublicKey, Vec<u8>>>> {
        if self.is_large_chunked() {
            return Err(SdkError::CannotSignLargeChunkedRequest);
        }
        let frozen = self.frozen_state()?;
        Ok(frozen
            .node_account_ids
            .iter()
            .zip(frozen.chunk_entries(0))
            .map(|(node, entry)| {
                let signatures = entry.sig_pairs.iter().filter_map(parse_signature_pair).collect();
                (*node, signatures)
            })
            .collect())
    }

    // ==================== Hashes ====================

    /// Hash of the signed transaction sent to the first node
    pub fn transaction_hash(&self) -> SdkResult<TransactionHash> {
        if self.is_large_chunked() {
            return Err(SdkError::CannotSignLargeChunkedRequest);
        }
        let frozen = self.frozen_state()?;
        let entry = frozen.entries.first().ok_or(SdkError::NotFrozen)?;
        Ok(TransactionHash::of(&entry.signed_transaction_bytes()))
    }

    /// Hash of the signed transaction for each node
    pub fn transaction_hash_per_node(&self) -> SdkResult<BTreeMap<AccountId, TransactionHash>> {
        if self.is_large_chunked() {
            return Err(SdkError::CannotSignLargeChunkedRequest);
        }
        Ok(self.hashes_for_chunk(self.frozen_state()?, 0))
    }

    /// Hashes per node for every chunk, in chunk order
    pub fn all_transaction_hashes_per_node(&self) -> SdkResult<Vec<BTreeMap<AccountId, TransactionHash>>> {
        let frozen = self.frozen_state()?;
        Ok((0..frozen.chunk_count()).map(|k| self.hashes_for_chunk(frozen, k)).collect())
    }

    fn hashes_for_chunk(&self, frozen: &FrozenState, chunk: usize) -> BTreeMap<AccountId, TransactionHash> {
        frozen
            .node_account_ids
            .iter()
            .zip(frozen.chunk_entries(chunk))
            .map(|(node, entry)| (*node, TransactionHash::of(&entry.signed_transaction_bytes())))
            .collect()
    }
}

/// Nodes adopted at freeze: a fixed count or a third of the healthy set
fn default_node_set(client: &Client) -> Vec<AccountId> {
    let registry = client.registry();
    let count = client
        .max_nodes_per_transaction()
        .unwrap_or_else(|| registry.healthy_count().div_ceil(3))
        .max(1);
    registry
        .choose_candidates(count, None)
        .unwrap_or_else(|_| registry.node_account_ids().into_iter().take(count).collect())
}
