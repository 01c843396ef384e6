use crate::bets::{BetOutcome, EvalContext, Transfer};
use crate::error::SettleError;
use crate::model::{Bet, BetReport, BetStatus};

/// Total strokes across the round, winner-take-all against the field.
/// Partial totals are never compared: one unscored hole anywhere makes
/// the whole bet pending.
pub(crate) fn evaluate(bet: &Bet, ctx: &EvalContext<'_>) -> Result<BetOutcome, SettleError> {
    let mut totals: Vec<(&str, u64)> = Vec::with_capacity(bet.participants.len());
    for id in &bet.participants {
        let mut total: u64 = 0;
        for hole in ctx.snapshot.holes.holes() {
            match ctx.comparable(bet.scoring, id, hole) {
                Some(s) => total += u64::from(s),
                None => {
                    return Ok(BetOutcome {
                        transfers: Vec::new(),
                        report: BetReport {
                            bet_id: bet.id.clone(),
                            status: BetStatus::Pending,
                            lines: vec![format!(
                                "stroke play: pending ({id} has no score for hole {hole})"
                            )],
                        },
                    });
                }
            }
        }
        totals.push((id.as_str(), total));
    }

    let low = totals.iter().map(|&(_, t)| t).min().unwrap_or(0);
    let leaders: Vec<&str> = totals
        .iter()
        .filter(|&&(_, t)| t == low)
        .map(|&(id, _)| id)
        .collect();
    let losers: Vec<&str> = totals
        .iter()
        .filter(|&&(_, t)| t > low)
        .map(|&(id, _)| id)
        .collect();

    let name = |id: &str| {
        ctx.snapshot
            .participant(id)
            .map_or_else(|| id.to_string(), |p| p.display_name.clone())
    };

    let mut transfers = Vec::new();
    let mut lines = Vec::new();

    let share = bet.stake / leaders.len() as i64;
    let remainder = bet.stake - share * leaders.len() as i64;
    for &loser in &losers {
        if share > 0 {
            for &leader in &leaders {
                transfers.push(Transfer {
                    from: loser.to_string(),
                    to: leader.to_string(),
                    amount: share,
                });
            }
        }
    }

    if leaders.len() == 1 {
        lines.push(format!(
            "stroke play: {} wins at {low}, collects {} from each of {} others",
            name(leaders[0]),
            bet.stake,
            losers.len()
        ));
    } else {
        let names: Vec<String> = leaders.iter().map(|&id| name(id)).collect();
        let mut line = format!(
            "stroke play: {} tie at {low}, each loser pays {share} per winner",
            names.join(" and ")
        );
        if remainder > 0 && !losers.is_empty() {
            line.push_str(&format!(" ({remainder} unallocated per loser)"));
        }
        lines.push(line);
    }

    Ok(BetOutcome {
        transfers,
        report: BetReport {
            bet_id: bet.id.clone(),
            status: BetStatus::Settled,
            lines,
        },
    })
}
