use serde::{Deserialize, Serialize};
use votechain_types::{Commitment, Link};

use crate::hasher::{CryptoError, EntryHasher};

/// Trait for records that participate in a hash chain.
pub trait ChainLink {
    /// Position the record claims to occupy.
    fn position(&self) -> u64;
    /// Reference to the preceding record.
    fn link(&self) -> Link;
    /// The stored commitment.
    fn commitment(&self) -> Commitment;
    /// Commitment recomputed from the record's current fields.
    fn recompute(&self, hasher: &EntryHasher) -> Result<Commitment, CryptoError>;
    /// Whether the record carries the genesis payload.
    fn is_genesis_payload(&self) -> bool;
}

/// What went wrong at one position of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The chain has no records at all.
    EmptyChain,
    /// Record 0 is not shaped like a genesis record.
    GenesisMalformed,
    /// Stored position differs from actual position.
    SequenceGap,
    /// Stored commitment differs from the recomputed one.
    CommitmentMismatch,
    /// Predecessor reference differs from the predecessor's commitment.
    BrokenLink,
}

impl ViolationKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::EmptyChain => "chain has no genesis entry",
            Self::GenesisMalformed => "genesis entry is malformed",
            Self::SequenceGap => "sequence index does not match position",
            Self::CommitmentMismatch => "commitment does not match entry content",
            Self::BrokenLink => "previous commitment does not match predecessor",
        }
    }
}

/// A single integrity violation found in a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("integrity violation at index {index}: {}", .kind.describe())]
pub struct ChainViolation {
    pub index: usize,
    pub kind: ViolationKind,
}

/// Hash chain integrity verifier.
///
/// Checks, in this order for each record:
/// 1. Record 0 has the genesis link, position 0, and the genesis payload
/// 2. Every other record's position equals its index
/// 3. The stored commitment equals the recomputed one
/// 4. The link equals the previous record's stored commitment
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Stop at the first violation.
    pub fn verify_chain<L: ChainLink>(
        links: &[L],
        hasher: &EntryHasher,
    ) -> Result<(), ChainViolation> {
        match Self::scan(links, hasher).next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Scan the whole chain and collect every violation.
    pub fn violations<L: ChainLink>(links: &[L], hasher: &EntryHasher) -> Vec<ChainViolation> {
        Self::scan(links, hasher).collect()
    }

    // Lazy, so `verify_chain` does no work past the first violation.
    fn scan<'a, L: ChainLink>(
        links: &'a [L],
        hasher: &'a EntryHasher,
    ) -> impl Iterator<Item = ChainViolation> + 'a {
        let empty = links.is_empty().then_some(ChainViolation {
            index: 0,
            kind: ViolationKind::EmptyChain,
        });
        empty.into_iter().chain(
            (0..links.len()).flat_map(move |index| Self::check_at(links, index, hasher)),
        )
    }

    fn check_at<L: ChainLink>(
        links: &[L],
        index: usize,
        hasher: &EntryHasher,
    ) -> Vec<ChainViolation> {
        let record = &links[index];
        let mut found = Vec::new();
        let mut flag = |kind| found.push(ChainViolation { index, kind });

        if index == 0 {
            if record.position() != 0 || !record.link().is_genesis() || !record.is_genesis_payload()
            {
                flag(ViolationKind::GenesisMalformed);
            }
        } else if record.position() != index as u64 {
            flag(ViolationKind::SequenceGap);
        }

        match record.recompute(hasher) {
            Ok(computed) if computed == record.commitment() => {}
            _ => flag(ViolationKind::CommitmentMismatch),
        }

        if index > 0 && !record.link().points_to(&links[index - 1].commitment()) {
            flag(ViolationKind::BrokenLink);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test record for chain verification.
    struct TestRecord {
        position: u64,
        link: Link,
        commitment: Commitment,
        body: String,
    }

    impl ChainLink for TestRecord {
        fn position(&self) -> u64 {
            self.position
        }
        fn link(&self) -> Link {
            self.link
        }
        fn commitment(&self) -> Commitment {
            self.commitment
        }
        fn recompute(&self, hasher: &EntryHasher) -> Result<Commitment, CryptoError> {
            hasher.commit_value(&(self.position, self.link, &self.body))
        }
        fn is_genesis_payload(&self) -> bool {
            self.body == "genesis"
        }
    }

    fn build_chain(count: usize) -> Vec<TestRecord> {
        let hasher = EntryHasher::default();
        let mut chain: Vec<TestRecord> = Vec::new();
        for i in 0..count {
            let link = chain
                .last()
                .map(|prev| Link::from(prev.commitment))
                .unwrap_or(Link::Genesis);
            let body = if i == 0 {
                "genesis".to_string()
            } else {
                format!("record-{i}")
            };
            let commitment = hasher.commit_value(&(i as u64, link, &body)).unwrap();
            chain.push(TestRecord {
                position: i as u64,
                link,
                commitment,
                body,
            });
        }
        chain
    }

    fn rehash(record: &mut TestRecord) {
        record.commitment = record.recompute(&EntryHasher::default()).unwrap();
    }

    #[test]
    fn empty_chain_is_invalid() {
        let chain: Vec<TestRecord> = vec![];
        let err = HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::EmptyChain);
    }

    #[test]
    fn single_record_chain() {
        let chain = build_chain(1);
        assert!(HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        let chain = build_chain(10);
        assert!(HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).is_ok());
        assert!(HashChainVerifier::violations(&chain, &EntryHasher::default()).is_empty());
    }

    #[test]
    fn genesis_with_link_fails() {
        let mut chain = build_chain(1);
        chain[0].link = Link::from(Commitment::from_hash([1; 32]));
        rehash(&mut chain[0]);
        let err = HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).unwrap_err();
        assert_eq!(
            err,
            ChainViolation {
                index: 0,
                kind: ViolationKind::GenesisMalformed
            }
        );
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].link = Link::from(Commitment::from_hash([99; 32]));
        rehash(&mut chain[2]);
        let err = HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).unwrap_err();
        assert_eq!(
            err,
            ChainViolation {
                index: 2,
                kind: ViolationKind::BrokenLink
            }
        );
    }

    #[test]
    fn tampered_body_detected() {
        let mut chain = build_chain(3);
        chain[1].body = "tampered".into();
        let err = HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).unwrap_err();
        assert_eq!(
            err,
            ChainViolation {
                index: 1,
                kind: ViolationKind::CommitmentMismatch
            }
        );
    }

    #[test]
    fn sequence_gap_detected() {
        let mut chain = build_chain(3);
        chain[2].position = 7;
        rehash(&mut chain[2]);
        let err = HashChainVerifier::verify_chain(&chain, &EntryHasher::default()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::SequenceGap);
    }

    #[test]
    fn violations_collects_everything() {
        let mut chain = build_chain(5);
        chain[1].body = "tampered".into();
        chain[3].body = "tampered too".into();
        let found = HashChainVerifier::violations(&chain, &EntryHasher::default());
        assert_eq!(
            found,
            vec![
                ChainViolation {
                    index: 1,
                    kind: ViolationKind::CommitmentMismatch
                },
                ChainViolation {
                    index: 3,
                    kind: ViolationKind::CommitmentMismatch
                },
            ]
        );
    }

    #[test]
    fn wrong_algorithm_fails_everywhere() {
        let chain = build_chain(2);
        let blake = EntryHasher::new(crate::DigestAlgorithm::Blake3);
        assert_eq!(HashChainVerifier::violations(&chain, &blake).len(), 2);
    }

    #[test]
    fn violation_display() {
        let v = ChainViolation {
            index: 4,
            kind: ViolationKind::BrokenLink,
        };
        assert_eq!(
            v.to_string(),
            "integrity violation at index 4: previous commitment does not match predecessor"
        );
    }
}
