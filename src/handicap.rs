use crate::error::SettleError;
use crate::model::{HoleCount, MatchSnapshot, ParticipantId};
use std::collections::HashMap;

/// Handicap strokes received per participant per hole, indexed hole-1.
pub type AllocationSheet = HashMap<ParticipantId, Vec<u32>>;

/// Distribute a participant's course handicap across the holes played.
///
/// Course handicap is the rounded handicap index; a `None`, zero, or
/// negative index receives no strokes. Strokes land one per hole in
/// ascending stroke-index order over the played holes, wrapping back to
/// the lowest-index holes when the course handicap exceeds the holes
/// played.
///
/// # Errors
/// Returns `InvalidConfiguration` unless `stroke_index` holds each
/// value 1..=18 exactly once.
pub fn allocate(
    handicap_index: Option<f64>,
    stroke_index: &[u8],
    holes: HoleCount,
) -> Result<Vec<u32>, SettleError> {
    validate_stroke_index(stroke_index)?;

    let played = holes.count() as usize;
    let mut received = vec![0u32; played];

    let course_handicap = match handicap_index {
        Some(index) if index > 0.0 => index.round() as u32,
        _ => 0,
    };
    if course_handicap == 0 {
        return Ok(received);
    }

    // Played holes ordered by stroke index, hardest (index 1) first.
    let mut order: Vec<usize> = (0..played).collect();
    order.sort_by_key(|&i| stroke_index[i]);

    for n in 0..course_handicap as usize {
        received[order[n % played]] += 1;
    }
    Ok(received)
}

fn validate_stroke_index(stroke_index: &[u8]) -> Result<(), SettleError> {
    if stroke_index.len() != 18 {
        return Err(SettleError::InvalidConfiguration(format!(
            "stroke index must list 18 holes, got {}",
            stroke_index.len()
        )));
    }
    let mut seen = [false; 18];
    for &idx in stroke_index {
        if !(1..=18).contains(&idx) || seen[idx as usize - 1] {
            return Err(SettleError::InvalidConfiguration(
                "stroke index must contain each value 1..18 exactly once".to_string(),
            ));
        }
        seen[idx as usize - 1] = true;
    }
    Ok(())
}

/// Allocation for every participant of a match, computed once per
/// settlement run and shared by all evaluators.
///
/// # Errors
/// Returns `InvalidConfiguration` when the course stroke index is
/// malformed.
pub fn allocation_sheet(snapshot: &MatchSnapshot) -> Result<AllocationSheet, SettleError> {
    let mut sheet = AllocationSheet::with_capacity(snapshot.participants.len());
    for participant in &snapshot.participants {
        let received = allocate(
            participant.handicap_index,
            &snapshot.stroke_index,
            snapshot.holes,
        )?;
        sheet.insert(participant.id.clone(), received);
    }
    Ok(sheet)
}

/// Strokes a participant receives on one hole, zero when unknown.
#[must_use]
pub fn strokes_received(sheet: &AllocationSheet, participant_id: &str, hole: u8) -> u32 {
    sheet
        .get(participant_id)
        .and_then(|holes| holes.get(hole as usize - 1))
        .copied()
        .unwrap_or(0)
}

/// Net strokes for one hole: gross minus strokes received, floored at
/// 1. A net score is never reported as zero or negative.
#[must_use]
pub fn net_strokes(gross: u32, received: u32) -> u32 {
    gross.saturating_sub(received).max(1)
}
