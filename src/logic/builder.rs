//! Bracket construction: seeding, BYE distribution, round wiring, BYE auto-advance.

use crate::models::{
    Athlete, AthleteId, Bracket, BracketError, BracketMatch, BracketOptions, Division, FighterSlot,
    THIRD_PLACE_ROUND,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// Build a fully wired bracket for one division (or one split group, when
/// `group_name` is set).
///
/// Round 1 is populated from a shuffled seed order with BYEs spread evenly;
/// later rounds are empty shells linked via `next_match_id`/`prev_match_ids`.
/// BYE matches are auto-resolved transitively before the bracket is returned.
///
/// A roster of exactly 1 produces the degenerate walkover-champion bracket
/// (size 1, no rounds, winner set directly). An empty roster is rejected.
pub fn build_bracket(
    division: &Division,
    athletes: &[Athlete],
    group_name: Option<&str>,
    options: &BracketOptions,
    rng: &mut impl Rng,
) -> Result<Bracket, BracketError> {
    if athletes.is_empty() {
        return Err(BracketError::EmptyRoster);
    }

    let bracket_id = match group_name {
        Some(g) => format!("{}-{}", division.id, g),
        None => division.id.to_string(),
    };

    if athletes.len() == 1 {
        return Ok(Bracket {
            id: bracket_id,
            division_id: division.id,
            rounds: Vec::new(),
            third_place_match: None,
            bracket_size: 1,
            participants: vec![FighterSlot::Athlete(athletes[0].id)],
            winner_id: Some(athletes[0].id),
            runner_up_id: None,
            third_place_winner_id: None,
            group_name: group_name.map(str::to_string),
        });
    }

    let n = athletes.len();
    let bracket_size = n.next_power_of_two();
    let num_rounds = bracket_size.trailing_zeros() as usize;
    let byes = bracket_size - n;
    let first_round_matches = bracket_size / 2;

    let mut seeds: Vec<AthleteId> = athletes.iter().map(|a| a.id).collect();
    seeds.shuffle(rng);

    let slots = seed_slots(&seeds, first_round_matches, byes);
    let slots = if options.team_separation {
        let clubs: HashMap<AthleteId, &str> =
            athletes.iter().map(|a| (a.id, a.club.as_str())).collect();
        separate_same_club(slots, &clubs)
    } else {
        slots
    };

    let mut rounds: Vec<Vec<BracketMatch>> = Vec::with_capacity(num_rounds);
    let first_round: Vec<BracketMatch> = slots
        .chunks_exact(2)
        .map(|pair| BracketMatch::new(1, pair[0], pair[1]))
        .collect();
    rounds.push(first_round);
    for r in 2..=num_rounds {
        let count = bracket_size >> r;
        rounds.push((0..count).map(|_| BracketMatch::shell(r as u32)).collect());
    }

    for r in 0..rounds.len().saturating_sub(1) {
        for j in 0..rounds[r].len() {
            let next_id = rounds[r + 1][j / 2].id;
            let this_id = rounds[r][j].id;
            rounds[r][j].next_match_id = Some(next_id);
            rounds[r + 1][j / 2].prev_match_ids.push(this_id);
        }
    }

    let third_place_match = if options.include_third_place && num_rounds >= 2 {
        let semis = &rounds[num_rounds - 2];
        let mut m = BracketMatch::shell(THIRD_PLACE_ROUND);
        m.prev_match_ids = semis.iter().map(|s| s.id).collect();
        Some(m)
    } else {
        None
    };

    let mut bracket = Bracket {
        id: bracket_id,
        division_id: division.id,
        rounds,
        third_place_match,
        bracket_size,
        participants: slots,
        winner_id: None,
        runner_up_id: None,
        third_place_winner_id: None,
        group_name: group_name.map(str::to_string),
    };

    auto_advance_byes(&mut bracket);

    if let Some(w) = bracket.final_match().and_then(|m| m.winner_id) {
        bracket.winner_id = Some(w);
    }

    Ok(bracket)
}

/// Lay out the shuffled seeds into `2 * first_round_matches` slots, spreading
/// the BYEs over evenly spaced matches so no match gets two unless the bye
/// count exceeds the match count.
fn seed_slots(seeds: &[AthleteId], first_round_matches: usize, byes: usize) -> Vec<FighterSlot> {
    let single_byes = byes.min(first_round_matches);
    let bye_matches: Vec<usize> = (0..single_byes)
        .map(|i| i * first_round_matches / single_byes.max(1))
        .collect();

    let mut slots = Vec::with_capacity(first_round_matches * 2);
    let mut next_seed = 0;
    let take = |next_seed: &mut usize| -> FighterSlot {
        match seeds.get(*next_seed) {
            Some(&id) => {
                *next_seed += 1;
                FighterSlot::Athlete(id)
            }
            None => FighterSlot::Bye,
        }
    };
    for m in 0..first_round_matches {
        slots.push(take(&mut next_seed));
        if bye_matches.contains(&m) {
            slots.push(FighterSlot::Bye);
        } else {
            slots.push(take(&mut next_seed));
        }
    }
    slots
}

/// Best-effort constrained shuffle: one repair pass over round-1 pairs,
/// swapping a clashing fighter with a non-clashing one from another pair when
/// the swap resolves the clash without creating a new one. Bounded, always
/// terminates; same-club pairings remain when the club dominates the roster.
fn separate_same_club(
    mut slots: Vec<FighterSlot>,
    clubs: &HashMap<AthleteId, &str>,
) -> Vec<FighterSlot> {
    let club_of = |slot: FighterSlot| slot.athlete().and_then(|id| clubs.get(&id).copied());
    let matches = slots.len() / 2;

    for i in 0..matches {
        let (a, b) = (slots[2 * i], slots[2 * i + 1]);
        let (Some(club_a), Some(club_b)) = (club_of(a), club_of(b)) else {
            continue;
        };
        if club_a != club_b {
            continue;
        }
        'swap: for j in 0..matches {
            if j == i {
                continue;
            }
            for offset in 0..2 {
                let s = 2 * j + offset;
                let Some(candidate_club) = club_of(slots[s]) else {
                    continue;
                };
                if candidate_club == club_a {
                    continue;
                }
                let partner = slots[2 * j + (1 - offset)];
                if club_of(partner) == Some(club_b) {
                    continue;
                }
                slots.swap(2 * i + 1, s);
                break 'swap;
            }
        }
    }
    slots
}

/// Resolve BYE matches to fixpoint with an iterative work queue.
///
/// A match with one real fighter and one BYE gets its winner set to the real
/// fighter (no loser: a BYE is never an opponent); the winner is pushed into
/// the linked next match's slot. A double-BYE match propagates a BYE onward.
/// Propagation cascades until no match changes. Idempotent: already-resolved
/// matches and already-filled slots are skipped.
pub fn auto_advance_byes(bracket: &mut Bracket) {
    let mut queue: VecDeque<_> = bracket
        .rounds
        .first()
        .map(|round| round.iter().map(|m| m.id).collect())
        .unwrap_or_default();

    while let Some(id) = queue.pop_front() {
        let Some((r, j)) = bracket.position_of(id) else {
            continue;
        };
        let m = &bracket.rounds[r][j];
        if m.winner_id.is_some() {
            continue;
        }
        let advance = match (m.fighter1, m.fighter2) {
            (FighterSlot::Athlete(a), FighterSlot::Bye) => Some(FighterSlot::Athlete(a)),
            (FighterSlot::Bye, FighterSlot::Athlete(b)) => Some(FighterSlot::Athlete(b)),
            (FighterSlot::Bye, FighterSlot::Bye) => Some(FighterSlot::Bye),
            _ => None,
        };
        let Some(advancing) = advance else {
            continue;
        };

        if let FighterSlot::Athlete(a) = advancing {
            bracket.rounds[r][j].winner_id = Some(a);
        }

        let Some(next_id) = bracket.rounds[r][j].next_match_id else {
            continue;
        };
        if let Some(next) = bracket.match_mut(next_id) {
            if let Some(idx) = next.prev_match_ids.iter().position(|&p| p == id) {
                let target = if idx == 0 {
                    &mut next.fighter1
                } else {
                    &mut next.fighter2
                };
                if *target == FighterSlot::Empty {
                    *target = advancing;
                    queue.push_back(next_id);
                }
            }
        }
    }
}
