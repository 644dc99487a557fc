use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use votechain_types::Ballot;

use crate::entry::Entry;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::validation::{IntegrityReport, IntegrityViolation};

/// Thread-safe handle to a [`Ledger`].
///
/// Appends hold the write lock across read-tail, build, and push, so they
/// are strictly serialized and no two entries can claim the same
/// predecessor. Reads share the read lock and return owned copies; an entry
/// becomes visible only once it is fully linked.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn append(&self, ballot: Ballot) -> Result<Entry, LedgerError> {
        let mut ledger = self.write()?;
        ledger.append(ballot).cloned()
    }

    pub fn latest(&self) -> Result<Entry, LedgerError> {
        Ok(self.read()?.latest().clone())
    }

    pub fn verify(&self) -> Result<bool, LedgerError> {
        Ok(self.read()?.verify())
    }

    pub fn check(&self) -> Result<Result<(), IntegrityViolation>, LedgerError> {
        Ok(self.read()?.check())
    }

    pub fn audit(&self) -> Result<IntegrityReport, LedgerError> {
        Ok(self.read()?.audit())
    }

    /// Owned copy of the full chain, genesis first.
    pub fn snapshot(&self) -> Result<Vec<Entry>, LedgerError> {
        Ok(self.read()?.snapshot().to_vec())
    }

    pub fn entry_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.entry_count())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
