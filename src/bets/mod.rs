pub mod match_play;
pub mod nassau;
pub mod skins;
pub mod stroke_play;

use std::cmp::Ordering;

use crate::error::SettleError;
use crate::handicap::{AllocationSheet, net_strokes, strokes_received};
use crate::model::{Bet, BetConfig, BetReport, MatchSnapshot, ParticipantId, ScoreGrid, ScoringMode};

/// One directed transfer produced by an evaluator: `from` owes `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: i64,
}

/// Everything one bet evaluation yields: the money moved and the
/// narration the audit entry carries.
#[derive(Clone, Debug)]
pub struct BetOutcome {
    pub transfers: Vec<Transfer>,
    pub report: BetReport,
}

/// Read-only view shared by all evaluators for one settlement run.
pub struct EvalContext<'a> {
    pub snapshot: &'a MatchSnapshot,
    pub grid: ScoreGrid<'a>,
    pub sheet: &'a AllocationSheet,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn new(snapshot: &'a MatchSnapshot, sheet: &'a AllocationSheet) -> Self {
        Self {
            snapshot,
            grid: ScoreGrid::new(snapshot),
            sheet,
        }
    }

    /// Score used for comparison on one hole under the bet's scoring
    /// mode. An unscored hole is absent data, never a default.
    #[must_use]
    pub fn comparable(&self, mode: ScoringMode, participant_id: &str, hole: u8) -> Option<u32> {
        let gross = self.grid.gross(participant_id, hole)?;
        Some(match mode {
            ScoringMode::Gross => gross,
            ScoringMode::Net => {
                net_strokes(gross, strokes_received(self.sheet, participant_id, hole))
            }
        })
    }
}

/// Closed dispatch over the bet formats. Evaluators are pure: same
/// snapshot in, same outcome out, no clock, no store.
///
/// # Errors
/// Propagates `InvalidConfiguration` from the format evaluators.
pub fn evaluate(bet: &Bet, ctx: &EvalContext<'_>) -> Result<BetOutcome, SettleError> {
    match &bet.config {
        BetConfig::Nassau { presses } => nassau::evaluate(bet, *presses, ctx),
        BetConfig::Skins { carry_over, payout } => {
            skins::evaluate(bet, *carry_over, *payout, ctx)
        }
        BetConfig::MatchPlay { scale_by_margin } => {
            match_play::evaluate(bet, *scale_by_margin, ctx)
        }
        BetConfig::StrokePlay => stroke_play::evaluate(bet, ctx),
    }
}

/// Hole-by-hole match-play walk between two participants over an
/// ordered hole range. Margin is holes up for `a` (negative: `b`).
#[derive(Clone, Debug, Default)]
pub(crate) struct Walk {
    pub margin: i32,
    /// Closing hole, once one side leads by more holes than remain.
    /// Holes after it never alter the result.
    pub decided_at: Option<u8>,
    /// First hole in the range either side has no score for.
    pub missing_hole: Option<u8>,
    /// Holes whose result moved an undecided margin across |2|, one
    /// entry per crossing. Used by Nassau to open presses.
    pub press_starts: Vec<u8>,
}

impl Walk {
    /// Settled once decided early or every hole in the range scored.
    #[must_use]
    pub fn settled(&self) -> bool {
        self.decided_at.is_some() || self.missing_hole.is_none()
    }
}

pub(crate) fn head_to_head(
    ctx: &EvalContext<'_>,
    mode: ScoringMode,
    a: &str,
    b: &str,
    holes: impl Iterator<Item = u8>,
) -> Walk {
    let holes: Vec<u8> = holes.collect();
    let total = holes.len();
    let mut walk = Walk::default();

    for (i, &hole) in holes.iter().enumerate() {
        let (score_a, score_b) = match (ctx.comparable(mode, a, hole), ctx.comparable(mode, b, hole))
        {
            (Some(sa), Some(sb)) => (sa, sb),
            _ => {
                walk.missing_hole = Some(hole);
                break;
            }
        };
        let before = walk.margin.abs();
        match score_a.cmp(&score_b) {
            Ordering::Less => walk.margin += 1,
            Ordering::Greater => walk.margin -= 1,
            Ordering::Equal => {}
        }
        let remaining = (total - i - 1) as i32;
        if walk.margin.abs() > remaining {
            walk.decided_at = Some(hole);
            break;
        }
        if before < 2 && walk.margin.abs() == 2 && remaining > 0 {
            walk.press_starts.push(hole);
        }
    }
    walk
}
