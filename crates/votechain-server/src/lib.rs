//! HTTP service for the vote ledger.
//!
//! Accepts ballots, rejects repeat voters through a [`VoterStore`], appends
//! accepted ballots to the shared ledger, and records each accepted vote in
//! the store afterwards. Also serves the chain, the voter list, per-candidate
//! results, and an integrity audit.

pub mod config;
pub mod error;
pub mod handler;
pub mod journal;
pub mod router;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use journal::JournalVoterStore;
pub use server::VoteServer;
pub use state::{AppState, VotePolicy};
pub use store::{InMemoryVoterStore, VoterRecord, VoterStore};
