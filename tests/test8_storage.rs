mod common;

use rusty_wager::error::SettleError;
use rusty_wager::model::{BetConfig, HoleCount, SkinsPayout};
use rusty_wager::settle::LedgerScope;
use rusty_wager::storage::{ApplyOutcome, LedgerSink, MemoryStore, ScoreSnapshotSource, settle_match};

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .create_match(
            "m1",
            "Pebble Creek",
            HoleCount::Nine,
            common::standard_stroke_index(),
            vec![
                common::participant("alice", None),
                common::participant("bob", None),
            ],
        )
        .await;
    store
        .add_bet(
            "m1",
            common::bet("n1", 10, &["alice", "bob"], BetConfig::Nassau { presses: false }),
        )
        .await
        .unwrap();
    store
}

async fn record_full_round(store: &MemoryStore) {
    for hole in 1..=9u8 {
        let alice = if hole == 1 { 3 } else { 4 };
        store
            .record_score("m1", "alice", hole, alice, None, None)
            .await
            .unwrap();
        store
            .record_score("m1", "bob", hole, 4, None, None)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn score_writes_are_compare_and_swap() {
    let store = seeded_store().await;

    let v1 = store
        .record_score("m1", "alice", 1, 4, None, None)
        .await
        .unwrap();
    assert_eq!(v1, 1);

    let v2 = store
        .record_score("m1", "alice", 1, 5, Some(2), Some(1))
        .await
        .unwrap();
    assert_eq!(v2, 2);

    // Re-submitting against the version already superseded loses.
    let err = store
        .record_score("m1", "alice", 1, 6, None, Some(1))
        .await
        .unwrap_err();
    assert_eq!(err, SettleError::StaleSnapshot { computed: 1, current: 2 });

    // Creating over an existing score without a read version loses too.
    let err = store
        .record_score("m1", "alice", 1, 6, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, SettleError::StaleSnapshot { computed: 0, current: 2 });
}

#[tokio::test]
async fn settle_match_persists_ledger_and_audit() {
    let store = seeded_store().await;
    record_full_round(&store).await;

    let settlement = settle_match(
        &store,
        &store,
        &store,
        &store,
        "m1",
        LedgerScope::PerBet,
        common::noon(),
    )
    .await
    .unwrap();
    assert_eq!(settlement.diff.upserts.len(), 1);

    let entries = store.current_entries("m1").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].debtor, "bob");
    assert_eq!(entries[0].amount, 10);

    // Recomputing without any new score is recorded but changes nothing.
    let again = settle_match(
        &store,
        &store,
        &store,
        &store,
        "m1",
        LedgerScope::PerBet,
        common::noon(),
    )
    .await
    .unwrap();
    assert!(again.diff.is_empty());
    let audit = store.audit_log("m1").await;
    assert_eq!(audit.len(), 2, "every run appends exactly one audit entry");
    assert!(audit[1].diff.is_empty());
}

#[tokio::test]
async fn a_diff_against_a_moved_store_reports_stale() {
    let store = seeded_store().await;
    record_full_round(&store).await;

    let snapshot = store.fetch_snapshot("m1").await.unwrap();
    let bets = rusty_wager::storage::BetSource::active_bets(&store, "m1")
        .await
        .unwrap();
    let settlement = rusty_wager::settle::settle(
        &snapshot,
        &bets,
        &[],
        LedgerScope::PerBet,
        common::noon(),
    )
    .unwrap();

    // A correction lands before the diff is persisted.
    store
        .record_score("m1", "bob", 1, 5, None, Some(1))
        .await
        .unwrap();

    let outcome = store.apply("m1", &settlement.diff).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Stale { current: 2 });
    assert!(store.current_entries("m1").await.unwrap().is_empty());

    // The orchestrator retries with a fresh snapshot and lands it.
    let settlement = settle_match(
        &store,
        &store,
        &store,
        &store,
        "m1",
        LedgerScope::PerBet,
        common::noon(),
    )
    .await
    .unwrap();
    assert!(!settlement.diff.upserts.is_empty());
}

#[tokio::test]
async fn replacing_a_bet_invalidates_its_ledger_entries() {
    let store = seeded_store().await;
    record_full_round(&store).await;
    settle_match(
        &store,
        &store,
        &store,
        &store,
        "m1",
        LedgerScope::PerBet,
        common::noon(),
    )
    .await
    .unwrap();
    assert_eq!(store.current_entries("m1").await.unwrap().len(), 1);

    store
        .replace_bet(
            "m1",
            common::bet("n1", 50, &["alice", "bob"], BetConfig::Nassau { presses: false }),
        )
        .await
        .unwrap();
    assert!(
        store.current_entries("m1").await.unwrap().is_empty(),
        "a reconfigured bet cannot keep entries settled under the old config"
    );

    settle_match(
        &store,
        &store,
        &store,
        &store,
        "m1",
        LedgerScope::PerBet,
        common::noon(),
    )
    .await
    .unwrap();
    let entries = store.current_entries("m1").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 50, "recomputed in full at the new stake");
}

#[test]
fn persisted_documents_round_trip_through_json() {
    let bet = common::bet(
        "s1",
        10,
        &["alice", "bob"],
        BetConfig::Skins {
            carry_over: true,
            payout: SkinsPayout::PotSplit,
        },
    );
    let json = serde_json::to_string(&bet).unwrap();
    assert!(json.contains("\"type\":\"skins\""), "{json}");
    let back: rusty_wager::model::Bet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bet);

    let entry = rusty_wager::model::LedgerEntry {
        match_id: "m1".to_string(),
        debtor: "bob".to_string(),
        creditor: "alice".to_string(),
        bet_scope: Some("s1".to_string()),
        amount: 30,
        settled_version: 4,
    };
    let back: rusty_wager::model::LedgerEntry =
        serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
    assert_eq!(back, entry);
}
