pub mod reconcile;

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bets::{self, BetOutcome, EvalContext};
use crate::error::SettleError;
use crate::handicap;
use crate::model::{
    AuditEntry, Bet, LedgerDiff, LedgerEntry, LedgerKey, MatchSnapshot, PairKey,
};

/// How ledger entries are keyed: one per pair per bet for
/// transparency, or netted match-wide for the fewest payments.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerScope {
    PerBet,
    MatchWide,
}

#[derive(Clone, Debug)]
pub struct Settlement {
    pub diff: LedgerDiff,
    pub audit: AuditEntry,
}

/// Recompute the full ledger for one match from a consistent snapshot
/// and diff it against the previously stored entries.
///
/// Deterministic: no clock, no store, and the output never depends on
/// the order bets, participants, or scores arrive in. Idempotent: run
/// twice against identical inputs, the second diff is empty.
///
/// # Errors
/// `InvalidConfiguration` before any evaluation for a malformed bet or
/// course, `InvariantViolation` when the run would produce or meet an
/// inconsistent ledger (nothing is emitted in that case).
pub fn settle(
    snapshot: &MatchSnapshot,
    bets: &[Bet],
    previous_ledger: &[LedgerEntry],
    scope: LedgerScope,
    recorded_at: NaiveDateTime,
) -> Result<Settlement, SettleError> {
    snapshot.validate()?;
    let mut ids: Vec<&str> = bets.iter().map(|b| b.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != bets.len() {
        return Err(SettleError::InvalidConfiguration(
            "duplicate bet ids in one settlement run".to_string(),
        ));
    }
    for bet in bets {
        bet.validate(snapshot)?;
    }

    let sheet = handicap::allocation_sheet(snapshot)?;
    let ctx = EvalContext::new(snapshot, &sheet);

    let mut outcomes: Vec<(&Bet, BetOutcome)> = Vec::with_capacity(bets.len());
    for bet in bets {
        let outcome = bets::evaluate(bet, &ctx)?;
        check_zero_sum(bet, &outcome)?;
        outcomes.push((bet, outcome));
    }

    let version = snapshot.snapshot_version();
    let entries = net_entries(snapshot, &outcomes, scope, version);
    let diff = diff_ledger(&entries, previous_ledger, version)?;

    let mut reports: Vec<_> = outcomes
        .into_iter()
        .map(|(_, outcome)| outcome.report)
        .collect();
    reports.sort_by(|a, b| a.bet_id.cmp(&b.bet_id));

    debug!(
        "settled match {} at version {version}: {} upserts, {} removals",
        snapshot.match_id,
        diff.upserts.len(),
        diff.removals.len()
    );

    Ok(Settlement {
        audit: AuditEntry {
            match_id: snapshot.match_id.clone(),
            recorded_at,
            snapshot_version: version,
            diff: diff.clone(),
            reports,
        },
        diff,
    })
}

/// Every transfer one bet produced must stay inside the bet's
/// participants, move a positive amount between two distinct people,
/// and sum to zero across the field.
fn check_zero_sum(bet: &Bet, outcome: &BetOutcome) -> Result<(), SettleError> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for transfer in &outcome.transfers {
        if transfer.amount <= 0 {
            return Err(SettleError::InvariantViolation(format!(
                "bet {}: non-positive transfer of {}",
                bet.id, transfer.amount
            )));
        }
        if transfer.from == transfer.to {
            return Err(SettleError::InvariantViolation(format!(
                "bet {}: transfer from {} to itself",
                bet.id, transfer.from
            )));
        }
        if !bet.participants.contains(&transfer.from) || !bet.participants.contains(&transfer.to)
        {
            return Err(SettleError::InvariantViolation(format!(
                "bet {}: transfer outside the bet's participants",
                bet.id
            )));
        }
        *totals.entry(transfer.from.as_str()).or_insert(0) -= transfer.amount;
        *totals.entry(transfer.to.as_str()).or_insert(0) += transfer.amount;
    }
    let sum: i64 = totals.values().sum();
    if sum != 0 {
        return Err(SettleError::InvariantViolation(format!(
            "bet {}: deltas sum to {sum}, not zero",
            bet.id
        )));
    }
    Ok(())
}

/// Net all transfers into at most one entry per (scope, unordered
/// pair). Positive accumulator means `pair.first` owes `pair.second`.
fn net_entries(
    snapshot: &MatchSnapshot,
    outcomes: &[(&Bet, BetOutcome)],
    scope: LedgerScope,
    version: u64,
) -> BTreeMap<LedgerKey, LedgerEntry> {
    let mut net: BTreeMap<LedgerKey, i64> = BTreeMap::new();
    for (bet, outcome) in outcomes {
        let bet_scope = match scope {
            LedgerScope::PerBet => Some(bet.id.clone()),
            LedgerScope::MatchWide => None,
        };
        for transfer in &outcome.transfers {
            let pair = PairKey::new(&transfer.from, &transfer.to);
            let signed = if transfer.from == pair.first {
                transfer.amount
            } else {
                -transfer.amount
            };
            *net.entry(LedgerKey {
                pair,
                bet_scope: bet_scope.clone(),
            })
            .or_insert(0) += signed;
        }
    }

    let mut entries = BTreeMap::new();
    for (key, amount) in net {
        if amount == 0 {
            continue;
        }
        let (debtor, creditor) = if amount > 0 {
            (key.pair.first.clone(), key.pair.second.clone())
        } else {
            (key.pair.second.clone(), key.pair.first.clone())
        };
        entries.insert(
            key.clone(),
            LedgerEntry {
                match_id: snapshot.match_id.clone(),
                debtor,
                creditor,
                bet_scope: key.bet_scope,
                amount: amount.abs(),
                settled_version: version,
            },
        );
    }
    entries
}

/// Only entries whose amount or direction changed are emitted; entries
/// whose key vanished become removals.
fn diff_ledger(
    entries: &BTreeMap<LedgerKey, LedgerEntry>,
    previous: &[LedgerEntry],
    version: u64,
) -> Result<LedgerDiff, SettleError> {
    let mut prev: BTreeMap<LedgerKey, &LedgerEntry> = BTreeMap::new();
    for entry in previous {
        if prev.insert(entry.key(), entry).is_some() {
            return Err(SettleError::InvariantViolation(format!(
                "duplicate ledger entries for pair {} in scope {:?}",
                entry.key().pair,
                entry.bet_scope
            )));
        }
    }

    let mut diff = LedgerDiff {
        base_version: version,
        ..LedgerDiff::default()
    };
    for (key, entry) in entries {
        match prev.get(key) {
            Some(old)
                if old.amount == entry.amount
                    && old.debtor == entry.debtor
                    && old.creditor == entry.creditor => {}
            _ => diff.upserts.push(entry.clone()),
        }
    }
    for key in prev.keys() {
        if !entries.contains_key(key) {
            diff.removals.push(key.clone());
        }
    }
    Ok(diff)
}
