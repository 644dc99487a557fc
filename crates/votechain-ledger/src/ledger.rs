use std::fmt;
use std::sync::Arc;

use votechain_crypto::EntryHasher;
use votechain_types::{Ballot, Clock, EntryPayload, Link, SystemClock};

use crate::entry::Entry;
use crate::error::LedgerError;
use crate::validation::{audit_entries, verify_entries, IntegrityReport, IntegrityViolation};

/// Ordered, append-only sequence of hash-linked entries.
///
/// Index 0 is always the genesis entry and [`Ledger::append`] is the only
/// way the sequence changes. A `Ledger` is a plain owned value with no
/// internal locking; wrap it in a [`SharedLedger`](crate::SharedLedger) to
/// share it between threads.
pub struct Ledger {
    entries: Vec<Entry>,
    hasher: EntryHasher,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// A ledger hashed with SHA-256 and stamped by the system clock.
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_clock(EntryHasher::default(), Arc::new(SystemClock))
    }

    /// A ledger using the given hasher and the system clock.
    pub fn with_hasher(hasher: EntryHasher) -> Result<Self, LedgerError> {
        Self::with_clock(hasher, Arc::new(SystemClock))
    }

    /// A ledger using the given hasher and clock. The genesis entry is
    /// created here, stamped with the clock's current time.
    pub fn with_clock(hasher: EntryHasher, clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        let genesis = Entry::genesis(&hasher, clock.now())?;
        Ok(Self {
            entries: vec![genesis],
            hasher,
            clock,
        })
    }

    /// The genesis entry.
    pub fn genesis(&self) -> &Entry {
        &self.entries[0]
    }

    /// The most recently appended entry (genesis for a fresh ledger).
    pub fn latest(&self) -> &Entry {
        &self.entries[self.entries.len() - 1]
    }

    /// Link a new entry carrying `ballot` to the current tail and append it.
    ///
    /// The timestamp comes from the ledger's clock, clamped so it never
    /// precedes the tail's.
    pub fn append(&mut self, ballot: Ballot) -> Result<&Entry, LedgerError> {
        let tail = self.latest();
        let timestamp = self.clock.now().max(tail.timestamp());
        let entry = Entry::new_with(
            &self.hasher,
            tail.sequence_index() + 1,
            timestamp,
            EntryPayload::Vote(ballot),
            Link::from(tail.commitment()),
        )?;
        self.entries.push(entry);
        Ok(self.latest())
    }

    /// `true` if the whole chain is intact. Stops at the first violation.
    pub fn verify(&self) -> bool {
        self.check().is_ok()
    }

    /// The first violation in chain order, if any.
    pub fn check(&self) -> Result<(), IntegrityViolation> {
        verify_entries(&self.entries, &self.hasher)
    }

    /// Every violation in the chain.
    pub fn audit(&self) -> IntegrityReport {
        audit_entries(&self.entries, &self.hasher)
    }

    /// Read-only view of the full chain, genesis first.
    pub fn snapshot(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: u64) -> Option<&Entry> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    /// Number of entries, genesis included. Never zero.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn hasher(&self) -> &EntryHasher {
        &self.hasher
    }

    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("entries", &self.entries.len())
            .field("hasher", &self.hasher)
            .field("head", &self.latest().commitment())
            .finish()
    }
}
