use crate::bets::{BetOutcome, EvalContext, Transfer};
use crate::error::SettleError;
use crate::model::{Bet, BetReport, BetStatus, SkinsPayout};

/// Per-hole winner-take-all. A hole is evaluated only once every
/// participant has a score; skipped holes leave any carry standing.
pub(crate) fn evaluate(
    bet: &Bet,
    carry_over: bool,
    payout: SkinsPayout,
    ctx: &EvalContext<'_>,
) -> Result<BetOutcome, SettleError> {
    let mut transfers = Vec::new();
    let mut lines = Vec::new();
    let mut carried: i64 = 0;

    for hole in ctx.snapshot.holes.holes() {
        let mut scores = Vec::with_capacity(bet.participants.len());
        for id in &bet.participants {
            match ctx.comparable(bet.scoring, id, hole) {
                Some(s) => scores.push((id.as_str(), s)),
                None => {
                    scores.clear();
                    break;
                }
            }
        }
        if scores.is_empty() {
            // Not everyone has played the hole yet.
            continue;
        }

        let low = scores.iter().map(|&(_, s)| s).min().unwrap_or(0);
        let leaders: Vec<&str> = scores
            .iter()
            .filter(|&&(_, s)| s == low)
            .map(|&(id, _)| id)
            .collect();

        if leaders.len() > 1 {
            if carry_over {
                carried += bet.stake;
                lines.push(format!("hole {hole}: tied at {low}, {} carries", bet.stake));
            } else {
                lines.push(format!("hole {hole}: tied at {low}, stake forfeited"));
            }
            continue;
        }

        let winner = leaders[0];
        let pot = bet.stake + carried;
        carried = 0;
        let opponents: Vec<&str> = scores
            .iter()
            .map(|&(id, _)| id)
            .filter(|&id| id != winner)
            .collect();

        match payout {
            SkinsPayout::PerOpponent => {
                for &opp in &opponents {
                    transfers.push(Transfer {
                        from: opp.to_string(),
                        to: winner.to_string(),
                        amount: pot,
                    });
                }
                lines.push(format!(
                    "hole {hole}: {} takes a skin worth {pot} from each of {} opponents",
                    display(ctx, winner),
                    opponents.len()
                ));
            }
            SkinsPayout::PotSplit => {
                let share = pot / opponents.len() as i64;
                let remainder = pot - share * opponents.len() as i64;
                if share > 0 {
                    for &opp in &opponents {
                        transfers.push(Transfer {
                            from: opp.to_string(),
                            to: winner.to_string(),
                            amount: share,
                        });
                    }
                }
                let mut line = format!(
                    "hole {hole}: {} takes a skin worth {pot}, {share} per opponent",
                    display(ctx, winner)
                );
                if remainder > 0 {
                    line.push_str(&format!(" ({remainder} unallocated)"));
                }
                lines.push(line);
            }
        }
    }

    if carried > 0 {
        lines.push(format!("carry-over of {carried} unclaimed"));
    }

    Ok(BetOutcome {
        transfers,
        report: BetReport {
            bet_id: bet.id.clone(),
            // Skins settle hole by hole; there is no pending whole-bet
            // state, unevaluated holes simply have not paid yet.
            status: BetStatus::Settled,
            lines,
        },
    })
}

fn display(ctx: &EvalContext<'_>, id: &str) -> String {
    ctx.snapshot
        .participant(id)
        .map_or_else(|| id.to_string(), |p| p.display_name.clone())
}
