//! Hashing primitives for the vote ledger.
//!
//! Provides deterministic JSON encoding, SHA-256 and BLAKE3 digests behind a
//! single algorithm switch, domain-separated entry hashing, and hash chain
//! verification.
//!
//! All digests come from established libraries.

pub mod canonical;
pub mod chain;
pub mod digest;
pub mod hasher;

pub use canonical::CanonicalBytes;
pub use chain::{ChainLink, ChainViolation, HashChainVerifier, ViolationKind};
pub use digest::DigestAlgorithm;
pub use hasher::{CryptoError, EntryHasher};
