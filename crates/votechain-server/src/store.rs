use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use votechain_ledger::Entry;
use votechain_types::{Commitment, Timestamp, VoterId};

use crate::error::{ServerError, ServerResult};

/// Durable record of one accepted vote, keyed by voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterRecord {
    pub voter_id: VoterId,
    pub candidate: String,
    pub timestamp: Timestamp,
    /// Commitment of the ledger entry holding this vote.
    pub blockchain_hash: Commitment,
}

impl VoterRecord {
    /// Record for a vote entry. `None` for genesis.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        entry.ballot().map(|ballot| Self {
            voter_id: ballot.voter_id().clone(),
            candidate: ballot.candidate().to_string(),
            timestamp: entry.timestamp(),
            blockchain_hash: entry.commitment(),
        })
    }
}

/// Voter registry consulted before and written after each append.
///
/// `record` must refuse a second record for the same voter.
#[async_trait]
pub trait VoterStore: Send + Sync {
    async fn has_voted(&self, voter: &VoterId) -> ServerResult<bool>;
    async fn record(&self, record: &VoterRecord) -> ServerResult<()>;
    /// All records in the order they were written.
    async fn records(&self) -> ServerResult<Vec<VoterRecord>>;

    /// Vote counts per candidate.
    async fn results(&self) -> ServerResult<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for record in self.records().await? {
            *counts.entry(record.candidate).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Insertion-ordered records with a uniqueness index on voter.
#[derive(Default)]
pub(crate) struct VoterIndex {
    records: Vec<VoterRecord>,
    voters: HashSet<VoterId>,
}

impl VoterIndex {
    pub(crate) fn contains(&self, voter: &VoterId) -> bool {
        self.voters.contains(voter)
    }

    pub(crate) fn insert(&mut self, record: VoterRecord) -> ServerResult<()> {
        if !self.voters.insert(record.voter_id.clone()) {
            return Err(ServerError::AlreadyVoted);
        }
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn records(&self) -> &[VoterRecord] {
        &self.records
    }
}

/// Process-local voter registry. Lost on restart.
#[derive(Default)]
pub struct InMemoryVoterStore {
    index: RwLock<VoterIndex>,
}

impl InMemoryVoterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoterStore for InMemoryVoterStore {
    async fn has_voted(&self, voter: &VoterId) -> ServerResult<bool> {
        Ok(self.index.read().await.contains(voter))
    }

    async fn record(&self, record: &VoterRecord) -> ServerResult<()> {
        self.index.write().await.insert(record.clone())
    }

    async fn records(&self) -> ServerResult<Vec<VoterRecord>> {
        Ok(self.index.read().await.records().to_vec())
    }
}
