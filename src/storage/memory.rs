use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::SettleError;
use crate::model::{
    AuditEntry, Bet, HoleCount, LedgerDiff, LedgerEntry, MatchSnapshot, Participant,
    ParticipantId, Score,
};
use crate::settle::reconcile;
use crate::storage::{
    ApplyOutcome, AuditSink, BetSource, LedgerSink, ScoreSnapshotSource, StorageError,
};

struct MatchState {
    course_name: String,
    holes: HoleCount,
    stroke_index: Vec<u8>,
    participants: Vec<Participant>,
    scores: HashMap<(ParticipantId, u8), Score>,
    bets: Vec<Bet>,
    ledger: Vec<LedgerEntry>,
    audit: Vec<AuditEntry>,
}

impl MatchState {
    fn max_score_version(&self) -> u64 {
        self.scores.values().map(|s| s.version).max().unwrap_or(0)
    }
}

/// In-memory implementation of all four storage seams plus the score
/// store's compare-and-swap write contract. Backs the test suite and
/// doubles as the reference for the optimistic-versioning behavior a
/// real store has to provide.
#[derive(Default)]
pub struct MemoryStore {
    matches: RwLock<HashMap<String, MatchState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_match(
        &self,
        match_id: &str,
        course_name: &str,
        holes: HoleCount,
        stroke_index: Vec<u8>,
        participants: Vec<Participant>,
    ) {
        self.matches.write().await.insert(
            match_id.to_string(),
            MatchState {
                course_name: course_name.to_string(),
                holes,
                stroke_index,
                participants,
                scores: HashMap::new(),
                bets: Vec::new(),
                ledger: Vec::new(),
                audit: Vec::new(),
            },
        );
    }

    /// # Errors
    /// Returns an error for an unknown match or a duplicate bet id.
    pub async fn add_bet(&self, match_id: &str, bet: Bet) -> Result<(), StorageError> {
        let mut matches = self.matches.write().await;
        let state = matches
            .get_mut(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        if state.bets.iter().any(|b| b.id == bet.id) {
            return Err(StorageError::new(format!("bet {} already exists", bet.id)));
        }
        state.bets.push(bet);
        Ok(())
    }

    /// Swap in a new configuration for an existing bet. Ledger entries
    /// scoped to the bet are dropped: a reconfigured bet invalidates
    /// its prior settlement and must be recomputed in full.
    ///
    /// # Errors
    /// Returns an error for an unknown match or bet.
    pub async fn replace_bet(&self, match_id: &str, bet: Bet) -> Result<(), StorageError> {
        let mut matches = self.matches.write().await;
        let state = matches
            .get_mut(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        let slot = state
            .bets
            .iter_mut()
            .find(|b| b.id == bet.id)
            .ok_or_else(|| StorageError::new(format!("no such bet: {}", bet.id)))?;
        *slot = bet;
        let dropped = slot.id.clone();
        state
            .ledger
            .retain(|e| e.bet_scope.as_deref() != Some(dropped.as_str()));
        Ok(())
    }

    /// Compare-and-swap score write. A new score needs no expected
    /// version and lands at version 1; a mutation must carry the
    /// version it read and is rejected as stale otherwise, never
    /// silently overwritten.
    ///
    /// # Errors
    /// `Storage` for an unknown match, `StaleSnapshot` on a version
    /// mismatch.
    pub async fn record_score(
        &self,
        match_id: &str,
        participant_id: &str,
        hole: u8,
        strokes: u32,
        putts: Option<u32>,
        expected_version: Option<u64>,
    ) -> Result<u64, SettleError> {
        let mut matches = self.matches.write().await;
        let state = matches
            .get_mut(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        let key = (participant_id.to_string(), hole);
        let current = state.scores.get(&key).map(|s| s.version);
        match (current, expected_version) {
            (None, None) => {
                state.scores.insert(
                    key,
                    Score {
                        participant_id: participant_id.to_string(),
                        hole_number: hole,
                        strokes,
                        putts,
                        version: 1,
                    },
                );
                Ok(1)
            }
            (Some(have), Some(read)) if have == read => {
                if let Some(score) = state.scores.get_mut(&key) {
                    score.strokes = strokes;
                    score.putts = putts;
                    score.version = have + 1;
                }
                Ok(have + 1)
            }
            (have, read) => Err(SettleError::StaleSnapshot {
                computed: read.unwrap_or(0),
                current: have.unwrap_or(0),
            }),
        }
    }

    pub async fn max_score_version(&self, match_id: &str) -> u64 {
        self.matches
            .read()
            .await
            .get(match_id)
            .map_or(0, MatchState::max_score_version)
    }

    pub async fn audit_log(&self, match_id: &str) -> Vec<AuditEntry> {
        self.matches
            .read()
            .await
            .get(match_id)
            .map_or_else(Vec::new, |state| state.audit.clone())
    }
}

#[async_trait]
impl ScoreSnapshotSource for MemoryStore {
    async fn fetch_snapshot(&self, match_id: &str) -> Result<MatchSnapshot, StorageError> {
        let matches = self.matches.read().await;
        let state = matches
            .get(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        let mut scores: Vec<Score> = state.scores.values().cloned().collect();
        scores.sort_by(|a, b| {
            (&a.participant_id, a.hole_number).cmp(&(&b.participant_id, b.hole_number))
        });
        Ok(MatchSnapshot {
            match_id: match_id.to_string(),
            course_name: state.course_name.clone(),
            holes: state.holes,
            stroke_index: state.stroke_index.clone(),
            participants: state.participants.clone(),
            scores,
        })
    }
}

#[async_trait]
impl BetSource for MemoryStore {
    async fn active_bets(&self, match_id: &str) -> Result<Vec<Bet>, StorageError> {
        let matches = self.matches.read().await;
        let state = matches
            .get(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        Ok(state.bets.clone())
    }
}

#[async_trait]
impl LedgerSink for MemoryStore {
    async fn current_entries(&self, match_id: &str) -> Result<Vec<LedgerEntry>, StorageError> {
        let matches = self.matches.read().await;
        let state = matches
            .get(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        Ok(state.ledger.clone())
    }

    async fn apply(&self, match_id: &str, diff: &LedgerDiff) -> Result<ApplyOutcome, StorageError> {
        let mut matches = self.matches.write().await;
        let state = matches
            .get_mut(match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {match_id}")))?;
        let current = state.max_score_version();
        if current > diff.base_version {
            return Ok(ApplyOutcome::Stale { current });
        }
        reconcile::apply_diff(&mut state.ledger, diff, current)
            .map_err(|e| StorageError::new(e.to_string()))?;
        Ok(ApplyOutcome::Applied)
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, entry: AuditEntry) -> Result<(), StorageError> {
        let mut matches = self.matches.write().await;
        let state = matches
            .get_mut(&entry.match_id)
            .ok_or_else(|| StorageError::new(format!("no such match: {}", entry.match_id)))?;
        state.audit.push(entry);
        Ok(())
    }
}
