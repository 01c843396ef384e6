use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::SettleError;

pub type ParticipantId = String;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TeeBox {
    Championship,
    Blue,
    White,
    Red,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// None means gross-only: zero handicap strokes on every hole.
    pub handicap_index: Option<f64>,
    pub tee_box: TeeBox,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Score {
    pub participant_id: ParticipantId,
    pub hole_number: u8,
    pub strokes: u32,
    /// Advisory only; settlement never reads putts.
    pub putts: Option<u32>,
    /// Starts at 1, incremented on every mutation.
    pub version: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoleCount {
    Nine,
    Eighteen,
}

impl HoleCount {
    #[must_use]
    pub fn count(self) -> u8 {
        match self {
            HoleCount::Nine => 9,
            HoleCount::Eighteen => 18,
        }
    }

    #[must_use]
    pub fn holes(self) -> RangeInclusive<u8> {
        1..=self.count()
    }
}

impl fmt::Display for HoleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Flattened point-in-time view of one match, as handed to the
/// settlement engine. All cross-references are by id; the engine never
/// holds a live store handle.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MatchSnapshot {
    pub match_id: String,
    pub course_name: String,
    pub holes: HoleCount,
    /// Stroke index per hole 1..=18, each value 1..=18 exactly once.
    pub stroke_index: Vec<u8>,
    pub participants: Vec<Participant>,
    pub scores: Vec<Score>,
}

impl MatchSnapshot {
    #[must_use]
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Highest score version in the snapshot; the optimistic token the
    /// resulting ledger diff is pinned to. Zero when no hole is scored.
    #[must_use]
    pub fn snapshot_version(&self) -> u64 {
        self.scores.iter().map(|s| s.version).max().unwrap_or(0)
    }

    /// Snapshot-level invariants: every score belongs to a known
    /// participant and an in-range hole, strokes are at least 1, and
    /// no (participant, hole) cell appears twice.
    ///
    /// # Errors
    /// Returns `InvariantViolation` when the snapshot is inconsistent.
    pub fn validate(&self) -> Result<(), SettleError> {
        let mut seen: AHashMap<(&str, u8), ()> = AHashMap::new();
        for score in &self.scores {
            if self.participant(&score.participant_id).is_none() {
                return Err(SettleError::InvariantViolation(format!(
                    "score for unknown participant {}",
                    score.participant_id
                )));
            }
            if !self.holes.holes().contains(&score.hole_number) {
                return Err(SettleError::InvariantViolation(format!(
                    "score on hole {} outside a {}-hole round",
                    score.hole_number, self.holes
                )));
            }
            if score.strokes == 0 {
                return Err(SettleError::InvariantViolation(format!(
                    "zero strokes recorded for {} on hole {}",
                    score.participant_id, score.hole_number
                )));
            }
            if seen
                .insert((score.participant_id.as_str(), score.hole_number), ())
                .is_some()
            {
                return Err(SettleError::InvariantViolation(format!(
                    "duplicate score for {} on hole {}",
                    score.participant_id, score.hole_number
                )));
            }
        }
        Ok(())
    }
}

/// Gross strokes indexed by (participant, hole) for evaluator lookups.
pub struct ScoreGrid<'a> {
    cells: AHashMap<(&'a str, u8), u32>,
}

impl<'a> ScoreGrid<'a> {
    #[must_use]
    pub fn new(snapshot: &'a MatchSnapshot) -> Self {
        let mut cells = AHashMap::with_capacity(snapshot.scores.len());
        for score in &snapshot.scores {
            cells.insert(
                (score.participant_id.as_str(), score.hole_number),
                score.strokes,
            );
        }
        Self { cells }
    }

    #[must_use]
    pub fn gross(&self, participant_id: &str, hole: u8) -> Option<u32> {
        self.cells.get(&(participant_id, hole)).copied()
    }
}
