use crate::bets::{BetOutcome, EvalContext, Transfer, head_to_head};
use crate::error::SettleError;
use crate::model::{Bet, BetReport, BetStatus};

/// Head-to-head over the whole round. Once one side leads by more
/// holes than remain the match is closed out; later scores never
/// change the result.
pub(crate) fn evaluate(
    bet: &Bet,
    scale_by_margin: bool,
    ctx: &EvalContext<'_>,
) -> Result<BetOutcome, SettleError> {
    let [a, b] = bet.participants.as_slice() else {
        return Err(SettleError::InvalidConfiguration(format!(
            "bet {}: match play takes exactly 2 participants",
            bet.id
        )));
    };
    let (a, b) = (a.as_str(), b.as_str());
    let last_hole = ctx.snapshot.holes.count();
    let walk = head_to_head(ctx, bet.scoring, a, b, ctx.snapshot.holes.holes());

    let name = |id: &str| {
        ctx.snapshot
            .participant(id)
            .map_or_else(|| id.to_string(), |p| p.display_name.clone())
    };

    if !walk.settled() {
        let hole = walk.missing_hole.unwrap_or(1);
        return Ok(BetOutcome {
            transfers: Vec::new(),
            report: BetReport {
                bet_id: bet.id.clone(),
                status: BetStatus::Pending,
                lines: vec![format!("match play: pending (hole {hole} unscored)")],
            },
        });
    }

    let mut transfers = Vec::new();
    let line = if walk.margin == 0 {
        "match play: all square".to_string()
    } else {
        let (from, to) = if walk.margin > 0 { (b, a) } else { (a, b) };
        let up = i64::from(walk.margin.abs());
        let amount = if scale_by_margin {
            bet.stake * up
        } else {
            bet.stake
        };
        transfers.push(Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        });
        match walk.decided_at {
            Some(hole) if hole < last_hole => {
                format!("match play: {} wins {up}&{}", name(to), last_hole - hole)
            }
            _ => format!("match play: {} wins {up} up", name(to)),
        }
    };

    Ok(BetOutcome {
        transfers,
        report: BetReport {
            bet_id: bet.id.clone(),
            status: BetStatus::Settled,
            lines: vec![line],
        },
    })
}
