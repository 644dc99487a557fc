use votechain_types::Commitment;

use crate::canonical::CanonicalBytes;
use crate::digest::DigestAlgorithm;

/// Domain-separated commitment hasher.
///
/// The domain tag is prepended to every hash computation, followed by `:`
/// and the canonical encoding of the value, so an entry commitment can never
/// collide with a digest of the same bytes computed for another purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryHasher {
    algorithm: DigestAlgorithm,
    domain: &'static str,
}

impl EntryHasher {
    /// Domain tag for ledger entries.
    pub const ENTRY_DOMAIN: &'static str = "votechain-entry-v1";

    /// Entry hasher using SHA-256.
    pub const ENTRY: Self = Self {
        algorithm: DigestAlgorithm::Sha256,
        domain: Self::ENTRY_DOMAIN,
    };

    /// Entry hasher using the given algorithm.
    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            domain: Self::ENTRY_DOMAIN,
        }
    }

    /// Hasher with a custom domain tag.
    pub const fn with_domain(algorithm: DigestAlgorithm, domain: &'static str) -> Self {
        Self { algorithm, domain }
    }

    /// Hash canonical bytes.
    pub fn commit(&self, canonical: &CanonicalBytes) -> Commitment {
        Commitment::from_hash(self.algorithm.digest(&[
            self.domain.as_bytes(),
            b":",
            canonical.as_bytes(),
        ]))
    }

    /// Canonicalize and hash a serializable value.
    pub fn commit_value<T: serde::Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Commitment, CryptoError> {
        Ok(self.commit(&CanonicalBytes::new(value)?))
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}

impl Default for EntryHasher {
    fn default() -> Self {
        Self::ENTRY
    }
}

/// Errors from hashing operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
