use serde::{Deserialize, Serialize};

use crate::error::SettleError;
use crate::model::{MatchSnapshot, ParticipantId};

pub type BetId = String;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    Gross,
    Net,
}

/// How a skins pot is collected from the losers of a hole.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkinsPayout {
    /// Winner collects the full pot from every other participant.
    #[default]
    PerOpponent,
    /// Pot is divided evenly across opponents; an indivisible
    /// remainder is left unallocated and narrated in the audit.
    PotSplit,
}

/// Closed set of bet formats. Adding a format means touching every
/// exhaustive match on this enum.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BetConfig {
    Nassau {
        presses: bool,
    },
    Skins {
        carry_over: bool,
        #[serde(default)]
        payout: SkinsPayout,
    },
    MatchPlay {
        #[serde(default)]
        scale_by_margin: bool,
    },
    StrokePlay,
}

impl BetConfig {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BetConfig::Nassau { .. } => "nassau",
            BetConfig::Skins { .. } => "skins",
            BetConfig::MatchPlay { .. } => "match_play",
            BetConfig::StrokePlay => "stroke_play",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub id: BetId,
    pub scoring: ScoringMode,
    /// Stake in minor currency units, per contest the format defines.
    pub stake: i64,
    pub participants: Vec<ParticipantId>,
    pub config: BetConfig,
}

impl Bet {
    /// Configuration checks run before any evaluation starts.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` for a malformed bet.
    pub fn validate(&self, snapshot: &MatchSnapshot) -> Result<(), SettleError> {
        if self.stake <= 0 {
            return Err(SettleError::InvalidConfiguration(format!(
                "bet {}: stake must be positive, got {}",
                self.id, self.stake
            )));
        }
        let mut sorted = self.participants.clone();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != self.participants.len() {
            return Err(SettleError::InvalidConfiguration(format!(
                "bet {}: duplicate participant",
                self.id
            )));
        }
        for id in &self.participants {
            if snapshot.participant(id).is_none() {
                return Err(SettleError::InvalidConfiguration(format!(
                    "bet {}: participant {} is not in the match",
                    self.id, id
                )));
            }
        }
        match &self.config {
            BetConfig::MatchPlay { .. } => {
                if self.participants.len() != 2 {
                    return Err(SettleError::InvalidConfiguration(format!(
                        "bet {}: match play takes exactly 2 participants, got {}",
                        self.id,
                        self.participants.len()
                    )));
                }
            }
            BetConfig::Nassau { .. } => {
                if self.participants.len() < 2 {
                    return Err(SettleError::InvalidConfiguration(format!(
                        "bet {}: nassau needs at least 2 participants",
                        self.id
                    )));
                }
            }
            BetConfig::Skins { .. } | BetConfig::StrokePlay => {
                if self.participants.len() < 2 {
                    return Err(SettleError::InvalidConfiguration(format!(
                        "bet {}: {} needs at least 2 participants",
                        self.id,
                        self.config.kind()
                    )));
                }
            }
        }
        Ok(())
    }
}
