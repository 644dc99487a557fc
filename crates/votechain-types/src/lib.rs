//! Foundation types for the vote ledger.
//!
//! Every other votechain crate depends on `votechain-types`. Nothing here
//! hashes or links anything; these are the values that get hashed and linked.
//!
//! # Key Types
//!
//! - [`Commitment`]: 32-byte digest binding an entry to its content and predecessor
//! - [`Link`]: an entry's reference to its predecessor, or the `"0"` genesis sentinel
//! - [`Timestamp`]: UTC instant with millisecond precision and a stable text form
//! - [`Clock`]: injectable source of timestamps
//! - [`Ballot`]: one voter's selection
//! - [`EntryPayload`]: the genesis marker or a ballot

pub mod ballot;
pub mod digest;
pub mod error;
pub mod temporal;

pub use ballot::{Ballot, EntryPayload, VoterId, GENESIS_MARKER};
pub use digest::{Commitment, Link, GENESIS_SENTINEL};
pub use error::TypeError;
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
