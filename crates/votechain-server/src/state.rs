use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use votechain_ledger::SharedLedger;
use votechain_types::{Ballot, VoterId};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::VoterStore;

/// Body of `POST /vote`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub voter_id: String,
    pub candidate: String,
}

/// Boundary checks applied to a request before it becomes a [`Ballot`].
#[derive(Clone, Debug, Default)]
pub struct VotePolicy {
    candidates: BTreeSet<String>,
    max_identity_len: usize,
}

impl VotePolicy {
    pub fn new(candidates: impl IntoIterator<Item = String>, max_identity_len: usize) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            max_identity_len,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.candidates.iter().cloned(), config.max_identity_len)
    }

    pub fn admit(&self, request: &VoteRequest) -> ServerResult<Ballot> {
        let voter = VoterId::parse(&request.voter_id)?;
        let ballot = Ballot::new(voter, &request.candidate)?;

        if ballot.voter_id().as_str().chars().count() > self.max_identity_len {
            return Err(ServerError::FieldTooLong {
                field: "voterId",
                max: self.max_identity_len,
            });
        }
        if ballot.candidate().chars().count() > self.max_identity_len {
            return Err(ServerError::FieldTooLong {
                field: "candidate",
                max: self.max_identity_len,
            });
        }
        if !self.candidates.is_empty() && !self.candidates.contains(ballot.candidate()) {
            return Err(ServerError::UnknownCandidate(ballot.candidate().to_string()));
        }
        Ok(ballot)
    }
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub voters: Arc<dyn VoterStore>,
    pub policy: Arc<VotePolicy>,
    /// Serializes check-append-record so one voter cannot slip in twice.
    pub admission: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(ledger: SharedLedger, voters: Arc<dyn VoterStore>, policy: VotePolicy) -> Self {
        Self {
            ledger,
            voters,
            policy: Arc::new(policy),
            admission: Arc::new(Mutex::new(())),
        }
    }
}
