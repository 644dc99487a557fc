use votechain_crypto::CryptoError;

/// Errors produced by ledger operations.
///
/// Integrity failures are not errors: they come back from
/// [`Ledger::check`](crate::Ledger::check) and friends as values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl From<CryptoError> for LedgerError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}
