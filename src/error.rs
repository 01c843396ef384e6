use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    /// Malformed bet or course data; surfaced before any evaluation runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A score advanced past the version the settlement was computed
    /// from. Recoverable: re-fetch and re-settle.
    #[error("stale snapshot: computed at version {computed}, store at {current}")]
    StaleSnapshot { computed: u64, current: u64 },
    /// Internal defect (zero-sum broken, duplicate pair entries). The
    /// run aborts and the ledger stays untouched.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for SettleError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<String> for SettleError {
    fn from(err: String) -> Self {
        Self::InvalidConfiguration(err)
    }
}

impl From<&str> for SettleError {
    fn from(err: &str) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}
