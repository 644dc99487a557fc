//! Append-only vote ledger.
//!
//! This crate is the heart of votechain. It provides:
//! - [`Entry`], a self-certifying record of one vote committed to its predecessor
//! - [`Ledger`], the owning sequence with genesis creation, append, and verification
//! - [`SharedLedger`], a single-writer lock boundary for concurrent callers
//! - [`verify_entries`] / [`audit_entries`] for chains exported from a ledger
//! - [`tally`] over a chain snapshot
//!
//! The ledger does no I/O and no logging. Duplicate-voter checks and
//! durable storage belong to the caller.

pub mod entry;
pub mod error;
pub mod export;
pub mod ledger;
pub mod shared;
pub mod tally;
pub mod validation;

pub use entry::Entry;
pub use error::LedgerError;
pub use export::ChainExport;
pub use ledger::Ledger;
pub use shared::SharedLedger;
pub use tally::tally;
pub use validation::{audit_entries, verify_entries, IntegrityReport, IntegrityViolation};
pub use votechain_crypto::{DigestAlgorithm, EntryHasher, ViolationKind};
