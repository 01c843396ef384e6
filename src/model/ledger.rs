use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{BetId, ParticipantId};

/// Unordered participant pair in canonical (lexicographic) order.
/// Direction of money is carried by the entry, never by the key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub first: ParticipantId,
    pub second: ParticipantId,
}

impl PairKey {
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Identity of one ledger entry within a match: the unordered pair
/// plus the bet scope (None when the ledger is netted match-wide).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerKey {
    pub pair: PairKey,
    pub bet_scope: Option<BetId>,
}

/// Net amount one participant owes another. `amount` is always
/// positive; direction is the debtor/creditor assignment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub match_id: String,
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub bet_scope: Option<BetId>,
    pub amount: i64,
    /// Snapshot version this entry was settled from.
    pub settled_version: u64,
}

impl LedgerEntry {
    #[must_use]
    pub fn key(&self) -> LedgerKey {
        LedgerKey {
            pair: PairKey::new(&self.debtor, &self.creditor),
            bet_scope: self.bet_scope.clone(),
        }
    }
}

/// Minimal set of ledger mutations one settlement run produced,
/// pinned to the snapshot version it was computed from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct LedgerDiff {
    pub base_version: u64,
    pub upserts: Vec<LedgerEntry>,
    pub removals: Vec<LedgerKey>,
}

impl LedgerDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Settled,
    Pending,
}

/// Per-bet narration attached to the audit entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BetReport {
    pub bet_id: BetId,
    pub status: BetStatus,
    pub lines: Vec<String>,
}

/// Append-only record of one settlement run. Never mutated; the audit
/// log replayed in order is the history of the ledger.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub match_id: String,
    pub recorded_at: NaiveDateTime,
    /// Highest score version read during settlement.
    pub snapshot_version: u64,
    pub diff: LedgerDiff,
    pub reports: Vec<BetReport>,
}
