//! Match result state machine: record a result and propagate it, or revert
//! one under downstream-safety guards.

use crate::models::{
    AthleteId, Bracket, BracketError, FighterSlot, MatchId, MatchResult, THIRD_PLACE_ROUND,
};

/// Observational signals returned by [`record_result`]. They enable
/// "division complete" and "round complete" prompts downstream; they do not
/// change the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordOutcome {
    /// The whole bracket is now decided (final, and third-place when present).
    pub bracket_complete: bool,
    /// Every match in the just-updated round now has a winner.
    pub round_complete: Option<u32>,
}

/// Record a result on a contested match and propagate it through the bracket.
///
/// The whole call is atomic: it either rejects with no mutation, or applies
/// the result together with the winner's advancement, the semifinal loser's
/// third-place seeding, and the bracket-level winner fields.
pub fn record_result(
    bracket: &mut Bracket,
    match_id: MatchId,
    winner_id: AthleteId,
    result: MatchResult,
) -> Result<RecordOutcome, BracketError> {
    let (f1, f2, round, next_id) = {
        let m = bracket
            .match_ref(match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?;
        if m.has_bye() {
            return Err(BracketError::ByeMatch(match_id));
        }
        let (FighterSlot::Athlete(f1), FighterSlot::Athlete(f2)) = (m.fighter1, m.fighter2) else {
            return Err(BracketError::IncompleteMatch(match_id));
        };
        (f1, f2, m.round, m.next_match_id)
    };
    if winner_id != f1 && winner_id != f2 {
        return Err(BracketError::WinnerNotInMatch { match_id, winner_id });
    }
    let loser_id = if winner_id == f1 { f2 } else { f1 };

    if let Some(m) = bracket.match_mut(match_id) {
        m.winner_id = Some(winner_id);
        m.loser_id = Some(loser_id);
        m.result = Some(result);
    }

    // Winner advances into the linked next match's slot (index in the next
    // match's prev list decides which side).
    if let Some(next_id) = next_id {
        if let Some(next) = bracket.match_mut(next_id) {
            if let Some(idx) = next.prev_match_ids.iter().position(|&p| p == match_id) {
                let slot = if idx == 0 {
                    &mut next.fighter1
                } else {
                    &mut next.fighter2
                };
                *slot = FighterSlot::Athlete(winner_id);
            }
        }
    }

    // A semifinal loser seeds the third-place match.
    if is_semifinal(bracket, round) {
        if let Some(tp) = bracket.third_place_match.as_mut() {
            if let Some(idx) = tp.prev_match_ids.iter().position(|&p| p == match_id) {
                let slot = if idx == 0 {
                    &mut tp.fighter1
                } else {
                    &mut tp.fighter2
                };
                *slot = FighterSlot::Athlete(loser_id);
            }
        }
    }

    sync_bracket_results(bracket);

    let round_complete = (round != THIRD_PLACE_ROUND
        && bracket
            .rounds
            .get(round as usize - 1)
            .is_some_and(|r| r.iter().all(|m| m.winner_id.is_some())))
    .then_some(round);

    Ok(RecordOutcome {
        bracket_complete: bracket.is_decided(),
        round_complete,
    })
}

/// Revert a decided match back to its unset-result state.
///
/// Refused with no mutation when the linked next match, or a third-place
/// match fed by this semifinal, already has a winner: the downstream match
/// must be reverted first.
pub fn revert_result(bracket: &mut Bracket, match_id: MatchId) -> Result<(), BracketError> {
    let (winner_id, loser_id, round, next_id) = {
        let m = bracket
            .match_ref(match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?;
        let winner_id = m.winner_id.ok_or(BracketError::NotDecided(match_id))?;
        (winner_id, m.loser_id, m.round, m.next_match_id)
    };

    if let Some(next_id) = next_id {
        if bracket
            .match_ref(next_id)
            .is_some_and(|next| next.winner_id.is_some())
        {
            return Err(BracketError::DownstreamDecided {
                match_id,
                blocking: next_id,
            });
        }
    }
    if is_semifinal(bracket, round) {
        if let Some(tp) = &bracket.third_place_match {
            if tp.prev_match_ids.contains(&match_id) && tp.winner_id.is_some() {
                return Err(BracketError::DownstreamDecided {
                    match_id,
                    blocking: tp.id,
                });
            }
        }
    }

    if let Some(m) = bracket.match_mut(match_id) {
        m.winner_id = None;
        m.loser_id = None;
        m.result = None;
    }

    // Clear the advanced slot only if it still holds this match's winner, so a
    // slot filled by a sibling's BYE cascade is never clobbered.
    if let Some(next_id) = next_id {
        if let Some(next) = bracket.match_mut(next_id) {
            if let Some(idx) = next.prev_match_ids.iter().position(|&p| p == match_id) {
                let slot = if idx == 0 {
                    &mut next.fighter1
                } else {
                    &mut next.fighter2
                };
                if *slot == FighterSlot::Athlete(winner_id) {
                    *slot = FighterSlot::Empty;
                }
            }
        }
    }

    if is_semifinal(bracket, round) {
        if let (Some(tp), Some(loser_id)) = (bracket.third_place_match.as_mut(), loser_id) {
            if let Some(idx) = tp.prev_match_ids.iter().position(|&p| p == match_id) {
                let slot = if idx == 0 {
                    &mut tp.fighter1
                } else {
                    &mut tp.fighter2
                };
                if *slot == FighterSlot::Athlete(loser_id) {
                    *slot = FighterSlot::Empty;
                }
            }
        }
    }

    sync_bracket_results(bracket);

    Ok(())
}

/// A semifinal is the round directly before the final (only meaningful in
/// brackets with at least two rounds).
fn is_semifinal(bracket: &Bracket, round: u32) -> bool {
    round != THIRD_PLACE_ROUND && bracket.total_rounds() >= 2 && round + 1 == bracket.total_rounds()
}

/// Mirror match-level outcomes onto the bracket-level fields: winner and
/// runner-up track the final, third place tracks the third-place match. Also
/// clears them when the underlying match was reverted.
fn sync_bracket_results(bracket: &mut Bracket) {
    if let Some((winner, loser)) = bracket.final_match().map(|m| (m.winner_id, m.loser_id)) {
        bracket.winner_id = winner;
        bracket.runner_up_id = loser;
    }
    if let Some(third) = bracket.third_place_match.as_ref().map(|m| m.winner_id) {
        bracket.third_place_winner_id = third;
    }
}
