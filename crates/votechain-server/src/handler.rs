use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use votechain_ledger::{ChainExport, IntegrityViolation};

use crate::error::{ServerError, ServerResult};
use crate::state::{AppState, VoteRequest};
use crate::store::VoterRecord;

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CandidateCount {
    pub candidate: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub length: usize,
    pub violations: Vec<IntegrityViolation>,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full chain, genesis first.
pub async fn chain_handler(State(state): State<AppState>) -> ServerResult<Json<ChainExport>> {
    Ok(Json(ChainExport::new(state.ledger.snapshot()?)))
}

/// Accept a ballot: duplicate check, append, then record the voter.
pub async fn vote_handler(
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> ServerResult<Json<VoteResponse>> {
    let ballot = state.policy.admit(&request)?;

    let _admission = state.admission.lock().await;
    if state.voters.has_voted(ballot.voter_id()).await? {
        info!(voter = %ballot.voter_id(), "repeat vote refused");
        return Err(ServerError::AlreadyVoted);
    }

    let candidate = ballot.candidate().to_string();
    let entry = state.ledger.append(ballot)?;
    info!(
        index = entry.sequence_index(),
        commitment = %entry.commitment().short_hex(),
        "vote appended"
    );

    // The entry is already in the chain; a failed write is reported, not undone.
    if let Some(record) = VoterRecord::from_entry(&entry) {
        if let Err(e) = state.voters.record(&record).await {
            error!(index = entry.sequence_index(), error = %e, "failed to record voter");
        }
    }

    Ok(Json(VoteResponse {
        message: format!("Vote cast successfully for {candidate}!"),
    }))
}

pub async fn voters_handler(State(state): State<AppState>) -> ServerResult<Json<Vec<VoterRecord>>> {
    Ok(Json(state.voters.records().await?))
}

pub async fn results_handler(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<CandidateCount>>> {
    let counts = state
        .voters
        .results()
        .await?
        .into_iter()
        .map(|(candidate, count)| CandidateCount { candidate, count })
        .collect();
    Ok(Json(counts))
}

pub async fn verify_handler(State(state): State<AppState>) -> ServerResult<Json<VerifyResponse>> {
    let report = state.ledger.audit()?;
    if !report.is_valid() {
        error!(violations = report.violations.len(), "ledger integrity check failed");
    }
    Ok(Json(VerifyResponse {
        valid: report.is_valid(),
        length: report.entry_count,
        violations: report.violations,
    }))
}
