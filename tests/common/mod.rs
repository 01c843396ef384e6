use chrono::{NaiveDate, NaiveDateTime};

use rusty_wager::model::{
    Bet, BetConfig, HoleCount, MatchSnapshot, Participant, Score, ScoringMode, TeeBox,
};

pub fn participant(id: &str, handicap_index: Option<f64>) -> Participant {
    Participant {
        id: id.to_string(),
        display_name: {
            let mut name = id.to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            name
        },
        handicap_index,
        tee_box: TeeBox::White,
    }
}

/// Hole n carries stroke index n.
pub fn standard_stroke_index() -> Vec<u8> {
    (1..=18).collect()
}

pub fn score(participant_id: &str, hole: u8, strokes: u32) -> Score {
    Score {
        participant_id: participant_id.to_string(),
        hole_number: hole,
        strokes,
        putts: None,
        version: 1,
    }
}

/// One score per hole starting at hole 1, all at version 1.
pub fn round(participant_id: &str, strokes: &[u32]) -> Vec<Score> {
    strokes
        .iter()
        .enumerate()
        .map(|(i, &s)| score(participant_id, i as u8 + 1, s))
        .collect()
}

pub fn snapshot(
    holes: HoleCount,
    participants: Vec<Participant>,
    scores: Vec<Score>,
) -> MatchSnapshot {
    MatchSnapshot {
        match_id: "m1".to_string(),
        course_name: "Pebble Creek".to_string(),
        holes,
        stroke_index: standard_stroke_index(),
        participants,
        scores,
    }
}

pub fn bet(id: &str, stake: i64, participants: &[&str], config: BetConfig) -> Bet {
    Bet {
        id: id.to_string(),
        scoring: ScoringMode::Gross,
        stake,
        participants: participants.iter().map(|s| s.to_string()).collect(),
        config,
    }
}

pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 1)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}
