use log::warn;
use std::collections::BTreeMap;

use crate::error::SettleError;
use crate::model::{LedgerDiff, LedgerEntry, LedgerKey};

/// Apply a settlement diff against the store's current entries.
///
/// `live_version` is the highest score version in the store right now.
/// A diff computed from an older snapshot is rejected whole with
/// `StaleSnapshot`; the caller re-fetches and re-settles. The diff is
/// applied against a scratch copy and swapped in only after the
/// resulting ledger passes its invariants, so the entries are never
/// left half-updated. Re-applying the same diff is a no-op.
///
/// # Errors
/// `StaleSnapshot` when a score advanced past `diff.base_version`;
/// `InvariantViolation` when the current or resulting entries are
/// inconsistent (in which case `entries` is untouched).
pub fn apply_diff(
    entries: &mut Vec<LedgerEntry>,
    diff: &LedgerDiff,
    live_version: u64,
) -> Result<(), SettleError> {
    if live_version > diff.base_version {
        warn!(
            "rejecting ledger diff: computed at {}, store at {live_version}",
            diff.base_version
        );
        return Err(SettleError::StaleSnapshot {
            computed: diff.base_version,
            current: live_version,
        });
    }

    let mut next: BTreeMap<LedgerKey, LedgerEntry> = BTreeMap::new();
    for entry in entries.iter() {
        if next.insert(entry.key(), entry.clone()).is_some() {
            return Err(SettleError::InvariantViolation(format!(
                "duplicate ledger entries for pair {}",
                entry.key().pair
            )));
        }
    }

    for key in &diff.removals {
        next.remove(key);
    }
    for entry in &diff.upserts {
        next.insert(entry.key(), entry.clone());
    }

    for entry in next.values() {
        if entry.amount <= 0 {
            return Err(SettleError::InvariantViolation(format!(
                "ledger entry for pair {} has non-positive amount {}",
                entry.key().pair,
                entry.amount
            )));
        }
        if entry.debtor == entry.creditor {
            return Err(SettleError::InvariantViolation(format!(
                "ledger entry where {} owes itself",
                entry.debtor
            )));
        }
    }

    *entries = next.into_values().collect();
    Ok(())
}
