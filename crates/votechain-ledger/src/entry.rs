use serde::{Deserialize, Serialize};
use votechain_crypto::{ChainLink, CryptoError, EntryHasher};
use votechain_types::{Ballot, Commitment, EntryPayload, Link, Timestamp};

use crate::error::LedgerError;

/// One hash-linked record in the ledger.
///
/// `commitment` is the digest of the other four fields, so an entry can
/// always be checked against itself with [`Entry::recompute_commitment`].
/// Entries are built once and never changed; the fields are read-only
/// outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub(crate) sequence_index: u64,
    pub(crate) timestamp: Timestamp,
    pub(crate) payload: EntryPayload,
    pub(crate) previous_commitment: Link,
    pub(crate) commitment: Commitment,
}

/// The four committed fields, in the shape that gets canonicalized.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommittedFields<'a> {
    sequence_index: u64,
    timestamp: &'a Timestamp,
    payload: &'a EntryPayload,
    previous_commitment: &'a Link,
}

impl Entry {
    /// Build an entry and compute its commitment with the default hasher.
    pub fn new(
        sequence_index: u64,
        timestamp: Timestamp,
        payload: EntryPayload,
        previous_commitment: Link,
    ) -> Result<Self, LedgerError> {
        Self::new_with(
            &EntryHasher::default(),
            sequence_index,
            timestamp,
            payload,
            previous_commitment,
        )
    }

    /// Build an entry and compute its commitment with `hasher`.
    pub fn new_with(
        hasher: &EntryHasher,
        sequence_index: u64,
        timestamp: Timestamp,
        payload: EntryPayload,
        previous_commitment: Link,
    ) -> Result<Self, LedgerError> {
        let commitment = commit(
            hasher,
            sequence_index,
            &timestamp,
            &payload,
            &previous_commitment,
        )?;
        Ok(Self {
            sequence_index,
            timestamp,
            payload,
            previous_commitment,
            commitment,
        })
    }

    /// The genesis entry: index 0, the genesis marker, and the `"0"` link.
    pub fn genesis(hasher: &EntryHasher, timestamp: Timestamp) -> Result<Self, LedgerError> {
        Self::new_with(hasher, 0, timestamp, EntryPayload::Genesis, Link::Genesis)
    }

    /// Recompute the commitment from the current fields with the default hasher.
    pub fn recompute_commitment(&self) -> Result<Commitment, LedgerError> {
        self.recompute_commitment_with(&EntryHasher::default())
    }

    /// Recompute the commitment from the current fields with `hasher`.
    pub fn recompute_commitment_with(
        &self,
        hasher: &EntryHasher,
    ) -> Result<Commitment, LedgerError> {
        commit(
            hasher,
            self.sequence_index,
            &self.timestamp,
            &self.payload,
            &self.previous_commitment,
        )
    }

    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn payload(&self) -> &EntryPayload {
        &self.payload
    }

    /// The ballot carried by this entry, `None` for genesis.
    pub fn ballot(&self) -> Option<&Ballot> {
        self.payload.ballot()
    }

    pub fn previous_commitment(&self) -> Link {
        self.previous_commitment
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn is_genesis(&self) -> bool {
        self.sequence_index == 0 && self.previous_commitment.is_genesis()
    }
}

impl ChainLink for Entry {
    fn position(&self) -> u64 {
        self.sequence_index
    }

    fn link(&self) -> Link {
        self.previous_commitment
    }

    fn commitment(&self) -> Commitment {
        self.commitment
    }

    fn recompute(&self, hasher: &EntryHasher) -> Result<Commitment, CryptoError> {
        commit_raw(
            hasher,
            self.sequence_index,
            &self.timestamp,
            &self.payload,
            &self.previous_commitment,
        )
    }

    fn is_genesis_payload(&self) -> bool {
        self.payload.is_genesis()
    }
}

fn commit(
    hasher: &EntryHasher,
    sequence_index: u64,
    timestamp: &Timestamp,
    payload: &EntryPayload,
    previous_commitment: &Link,
) -> Result<Commitment, LedgerError> {
    Ok(commit_raw(
        hasher,
        sequence_index,
        timestamp,
        payload,
        previous_commitment,
    )?)
}

fn commit_raw(
    hasher: &EntryHasher,
    sequence_index: u64,
    timestamp: &Timestamp,
    payload: &EntryPayload,
    previous_commitment: &Link,
) -> Result<Commitment, CryptoError> {
    hasher.commit_value(&CommittedFields {
        sequence_index,
        timestamp,
        payload,
        previous_commitment,
    })
}
