use crate::bets::{BetOutcome, EvalContext, Transfer, head_to_head};
use crate::error::SettleError;
use crate::model::{Bet, BetReport, BetStatus, HoleCount};

/// Front/back/overall match-play contests, each worth the stake, plus
/// optional presses. A bet naming more than two participants
/// decomposes into every unordered pair, evaluated independently.
pub(crate) fn evaluate(
    bet: &Bet,
    presses: bool,
    ctx: &EvalContext<'_>,
) -> Result<BetOutcome, SettleError> {
    let segments = segments_for(ctx.snapshot.holes);
    let mut transfers = Vec::new();
    let mut lines = Vec::new();
    let mut all_settled = true;

    for (a, b) in pairs(&bet.participants) {
        for (label, start, end) in &segments {
            let walk = head_to_head(ctx, bet.scoring, a, b, *start..=*end);

            if walk.settled() {
                lines.push(segment_line(ctx, label, a, b, &walk, *end));
                push_flat(&mut transfers, a, b, walk.margin, bet.stake);
            } else {
                all_settled = false;
                let hole = walk.missing_hole.unwrap_or(*start);
                lines.push(format!("{label}: pending (hole {hole} unscored)"));
            }

            if !presses {
                continue;
            }
            for &pressed_after in &walk.press_starts {
                let press_label = format!("press ({label} from hole {})", pressed_after + 1);
                let press = head_to_head(ctx, bet.scoring, a, b, pressed_after + 1..=*end);
                if press.settled() {
                    lines.push(segment_line(ctx, &press_label, a, b, &press, *end));
                    push_flat(&mut transfers, a, b, press.margin, bet.stake);
                } else {
                    all_settled = false;
                    let hole = press.missing_hole.unwrap_or(pressed_after + 1);
                    lines.push(format!("{press_label}: pending (hole {hole} unscored)"));
                }
            }
        }
    }

    let status = if all_settled {
        BetStatus::Settled
    } else {
        BetStatus::Pending
    };
    Ok(BetOutcome {
        transfers,
        report: BetReport {
            bet_id: bet.id.clone(),
            status,
            lines,
        },
    })
}

fn segments_for(holes: HoleCount) -> Vec<(&'static str, u8, u8)> {
    match holes {
        // A nine-hole nassau collapses to a single contest.
        HoleCount::Nine => vec![("overall", 1, 9)],
        HoleCount::Eighteen => vec![
            ("front nine", 1, 9),
            ("back nine", 10, 18),
            ("overall", 1, 18),
        ],
    }
}

fn pairs(participants: &[String]) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    for (i, a) in participants.iter().enumerate() {
        for b in &participants[i + 1..] {
            out.push((a.as_str(), b.as_str()));
        }
    }
    out
}

fn push_flat(transfers: &mut Vec<Transfer>, a: &str, b: &str, margin: i32, stake: i64) {
    let (from, to) = match margin {
        m if m > 0 => (b, a),
        m if m < 0 => (a, b),
        _ => return,
    };
    transfers.push(Transfer {
        from: from.to_string(),
        to: to.to_string(),
        amount: stake,
    });
}

fn segment_line(
    ctx: &EvalContext<'_>,
    label: &str,
    a: &str,
    b: &str,
    walk: &crate::bets::Walk,
    last_hole: u8,
) -> String {
    let name = |id: &str| {
        ctx.snapshot
            .participant(id)
            .map_or_else(|| id.to_string(), |p| p.display_name.clone())
    };
    if walk.margin == 0 {
        return format!("{label}: halved");
    }
    let winner = if walk.margin > 0 { name(a) } else { name(b) };
    let up = walk.margin.abs();
    match walk.decided_at {
        Some(hole) if hole < last_hole => {
            format!("{label}: {winner} wins {up}&{}", last_hole - hole)
        }
        _ => format!("{label}: {winner} wins {up} up"),
    }
}
