mod common;

use rusty_wager::bets::{BetOutcome, EvalContext, evaluate};
use rusty_wager::handicap::allocation_sheet;
use rusty_wager::model::{Bet, BetConfig, BetStatus, HoleCount, MatchSnapshot, ScoringMode};

fn run(snap: &MatchSnapshot, bet: &Bet) -> BetOutcome {
    let sheet = allocation_sheet(snap).unwrap();
    let ctx = EvalContext::new(snap, &sheet);
    evaluate(bet, &ctx).unwrap()
}

fn threesome(a: &[u32], b: &[u32], c: &[u32]) -> MatchSnapshot {
    let mut scores = common::round("alice", a);
    scores.extend(common::round("bob", b));
    scores.extend(common::round("carol", c));
    common::snapshot(
        HoleCount::Nine,
        vec![
            common::participant("alice", None),
            common::participant("bob", None),
            common::participant("carol", None),
        ],
        scores,
    )
}

#[test]
fn lowest_total_collects_from_the_whole_field() {
    let mut a = [4u32; 9];
    a[0] = 3;
    let snap = threesome(&a, &[4; 9], &[5; 9]);
    let bet = common::bet("sp1", 10, &["alice", "bob", "carol"], BetConfig::StrokePlay);

    let outcome = run(&snap, &bet);
    assert_eq!(outcome.report.status, BetStatus::Settled);
    assert_eq!(outcome.transfers.len(), 2);
    assert!(outcome.transfers.iter().all(|t| t.to == "alice" && t.amount == 10));
    assert!(
        outcome.report.lines[0].contains("wins at 35"),
        "{:?}",
        outcome.report.lines
    );
}

#[test]
fn partial_totals_are_never_compared() {
    // Carol has not finished hole 9; the entire bet is pending even
    // though alice already leads by plenty.
    let mut a = [4u32; 9];
    a[0] = 3;
    let snap = threesome(&a, &[4; 9], &[5; 8]);
    let bet = common::bet("sp1", 10, &["alice", "bob", "carol"], BetConfig::StrokePlay);

    let outcome = run(&snap, &bet);
    assert_eq!(outcome.report.status, BetStatus::Pending);
    assert!(outcome.transfers.is_empty());
    assert_eq!(
        outcome.report.lines,
        vec!["stroke play: pending (carol has no score for hole 9)".to_string()]
    );
}

#[test]
fn tied_leaders_split_each_stake_with_remainder_unallocated() {
    let snap = threesome(&[4; 9], &[4; 9], &[5; 9]);
    let bet = common::bet("sp1", 11, &["alice", "bob", "carol"], BetConfig::StrokePlay);

    let outcome = run(&snap, &bet);
    assert_eq!(outcome.transfers.len(), 2);
    assert!(outcome.transfers.iter().all(|t| t.from == "carol" && t.amount == 5));
    let recipients: Vec<&str> = outcome.transfers.iter().map(|t| t.to.as_str()).collect();
    assert_eq!(recipients, vec!["alice", "bob"]);
    assert!(
        outcome
            .report
            .lines
            .iter()
            .any(|l| l.contains("(1 unallocated per loser)")),
        "{:?}",
        outcome.report.lines
    );
}

#[test]
fn everyone_tied_moves_no_money() {
    let snap = threesome(&[4; 9], &[4; 9], &[4; 9]);
    let bet = common::bet("sp1", 10, &["alice", "bob", "carol"], BetConfig::StrokePlay);
    let outcome = run(&snap, &bet);
    assert!(outcome.transfers.is_empty());
    assert_eq!(outcome.report.status, BetStatus::Settled);
}

#[test]
fn net_totals_can_flip_the_winner() {
    // Bob shoots 40 gross but gets a stroke on every hole of a
    // nine-hole round with a course handicap of 9.
    let mut scores = common::round("alice", &[4; 9]);
    scores.extend(common::round("bob", &[
        5, 5, 4, 5, 4, 5, 4, 4, 4,
    ]));
    let snap = common::snapshot(
        HoleCount::Nine,
        vec![
            common::participant("alice", None),
            common::participant("bob", Some(9.0)),
        ],
        scores,
    );
    let mut bet = common::bet("sp1", 10, &["alice", "bob"], BetConfig::StrokePlay);
    bet.scoring = ScoringMode::Net;

    let outcome = run(&snap, &bet);
    assert_eq!(outcome.transfers.len(), 1);
    let t = &outcome.transfers[0];
    assert_eq!((t.from.as_str(), t.to.as_str()), ("alice", "bob"));
}
