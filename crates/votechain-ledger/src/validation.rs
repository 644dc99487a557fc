use serde::{Deserialize, Serialize};
use votechain_crypto::{ChainViolation, EntryHasher, HashChainVerifier};

use crate::entry::Entry;

/// A mismatch between stored and recomputed commitments, or between
/// adjacent link fields.
pub type IntegrityViolation = ChainViolation;

/// Result of a full-chain audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub entry_count: usize,
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    /// Returns `true` if no violations were found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation a short-circuiting check would have stopped at.
    pub fn first(&self) -> Option<&IntegrityViolation> {
        self.violations.first()
    }
}

/// Check a chain, stopping at the first violation.
///
/// `entries[0]` must be a genesis entry; an empty slice is a violation.
pub fn verify_entries(entries: &[Entry], hasher: &EntryHasher) -> Result<(), IntegrityViolation> {
    HashChainVerifier::verify_chain(entries, hasher)
}

/// Check a chain and report every violation.
pub fn audit_entries(entries: &[Entry], hasher: &EntryHasher) -> IntegrityReport {
    IntegrityReport {
        entry_count: entries.len(),
        violations: HashChainVerifier::violations(entries, hasher),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use votechain_crypto::ViolationKind;
    use votechain_types::{Ballot, Timestamp, VoterId};

    use super::*;
    use crate::ledger::Ledger;

    fn exported_chain(votes: usize) -> Value {
        let mut ledger = Ledger::new().unwrap();
        for i in 0..votes {
            let ballot = Ballot::new(VoterId::parse(&format!("voter-{i}")).unwrap(), "X").unwrap();
            ledger.append(ballot).unwrap();
        }
        serde_json::to_value(ledger.snapshot()).unwrap()
    }

    fn parse(value: Value) -> Vec<Entry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn exported_chain_verifies() {
        let entries = parse(exported_chain(3));
        assert!(verify_entries(&entries, &EntryHasher::default()).is_ok());
        let report = audit_entries(&entries, &EntryHasher::default());
        assert!(report.is_valid());
        assert_eq!(report.entry_count, 4);
    }

    #[test]
    fn edited_export_is_caught() {
        let mut value = exported_chain(3);
        value[2]["payload"]["candidate"] = Value::from("Y");
        let entries = parse(value);
        let err = verify_entries(&entries, &EntryHasher::default()).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.kind, ViolationKind::CommitmentMismatch);
    }

    #[test]
    fn dropped_entry_is_caught() {
        let mut value = exported_chain(3);
        if let Value::Array(items) = &mut value {
            items.remove(2);
        }
        let entries = parse(value);
        let report = audit_entries(&entries, &EntryHasher::default());
        assert_eq!(report.first().map(|v| v.kind), Some(ViolationKind::SequenceGap));
        assert!(report
            .violations
            .iter()
            .any(|v| v.index == 2 && v.kind == ViolationKind::BrokenLink));
    }

    #[test]
    fn empty_export_is_invalid() {
        let err = verify_entries(&[], &EntryHasher::default()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::EmptyChain);
    }

    #[test]
    fn export_without_genesis_is_invalid() {
        let mut value = exported_chain(2);
        if let Value::Array(items) = &mut value {
            items.remove(0);
        }
        let entries = parse(value);
        let err = verify_entries(&entries, &EntryHasher::default()).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.kind, ViolationKind::GenesisMalformed);
    }

    fn parses(value: Value) -> bool {
        serde_json::from_value::<Vec<Entry>>(value).is_ok()
    }

    #[test]
    fn sub_millisecond_timestamp_edit_is_refused() {
        let mut value = exported_chain(3);
        let stamped = value[2]["timestamp"].as_str().unwrap().to_string();
        let edited = format!("{}999Z", stamped.trim_end_matches('Z'));
        value[2]["timestamp"] = Value::from(edited);
        assert!(!parses(value));
    }

    #[test]
    fn extra_payload_key_is_refused() {
        let mut value = exported_chain(3);
        value[2]["payload"]["candidate_override"] = Value::from("Y");
        assert!(!parses(value));
    }

    #[test]
    fn blank_or_padded_candidate_is_refused() {
        for candidate in ["   ", " X", "X "] {
            let mut value = exported_chain(2);
            value[1]["payload"]["candidate"] = Value::from(candidate);
            assert!(!parses(value), "{candidate:?} was accepted");
        }
    }

    #[test]
    fn report_serializes_for_operators() {
        let mut value = exported_chain(1);
        value[1]["timestamp"] = Value::from(Timestamp::epoch().to_rfc3339());
        let report = audit_entries(&parse(value), &EntryHasher::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entry_count"], 2);
        assert_eq!(json["violations"][0]["kind"], "commitment_mismatch");
        assert_eq!(json["violations"][0]["index"], 1);
    }
}
