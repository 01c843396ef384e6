pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use std::error::Error;
use std::fmt;

use crate::SETTLE_MAX_RETRIES;
use crate::error::SettleError;
use crate::model::{AuditEntry, Bet, LedgerDiff, LedgerEntry, MatchSnapshot};
use crate::settle::{LedgerScope, Settlement, settle};

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Outcome of handing a ledger diff to the persistence sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A score advanced past the diff's base version; re-fetch and
    /// re-settle.
    Stale { current: u64 },
}

/// Point-in-time consistent snapshot of a match's scores, no score
/// half-written.
#[async_trait]
pub trait ScoreSnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self, match_id: &str) -> Result<MatchSnapshot, StorageError>;
}

/// Active bet configurations, stable for the duration of one
/// settlement call.
#[async_trait]
pub trait BetSource: Send + Sync {
    async fn active_bets(&self, match_id: &str) -> Result<Vec<Bet>, StorageError>;
}

#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn current_entries(&self, match_id: &str) -> Result<Vec<LedgerEntry>, StorageError>;
    async fn apply(&self, match_id: &str, diff: &LedgerDiff) -> Result<ApplyOutcome, StorageError>;
}

/// Append-only; there is no update or delete contract.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), StorageError>;
}

/// Fetch, settle, and persist one match's ledger, retrying with a
/// fresh snapshot when a score lands between settlement and apply.
///
/// # Errors
/// Returns `StaleSnapshot` once the retries are exhausted, or any
/// error raised by the engine or the seams.
pub async fn settle_match(
    scores: &dyn ScoreSnapshotSource,
    bets: &dyn BetSource,
    ledger: &dyn LedgerSink,
    audit: &dyn AuditSink,
    match_id: &str,
    scope: LedgerScope,
    recorded_at: NaiveDateTime,
) -> Result<Settlement, SettleError> {
    let mut last = (0u64, 0u64);
    for attempt in 0..SETTLE_MAX_RETRIES {
        let snapshot = scores.fetch_snapshot(match_id).await?;
        let active = bets.active_bets(match_id).await?;
        let previous = ledger.current_entries(match_id).await?;
        let settlement = settle(&snapshot, &active, &previous, scope, recorded_at)?;
        match ledger.apply(match_id, &settlement.diff).await? {
            ApplyOutcome::Applied => {
                audit.append(settlement.audit.clone()).await?;
                return Ok(settlement);
            }
            ApplyOutcome::Stale { current } => {
                debug!(
                    "match {match_id}: snapshot {} superseded by {current}, retry {}",
                    settlement.diff.base_version,
                    attempt + 1
                );
                last = (settlement.diff.base_version, current);
            }
        }
    }
    Err(SettleError::StaleSnapshot {
        computed: last.0,
        current: last.1,
    })
}
