//! Mat distribution and fight ordering: bin-pack category groups onto mats,
//! then number every schedulable fight per mat.

use crate::models::{
    Athlete, Bracket, BracketId, CategoryGroup, CategoryKey, Division, MatAssignment, MatPlan,
    MatchId, ScheduledFight,
};
use std::collections::{BTreeMap, HashMap};

/// Derive category groups from the event roster: enabled divisions keyed by
/// gender + age band (+ belt when belt grouping is on), athlete counts from
/// checked-in athletes at their effective division.
pub fn category_groups(
    divisions: &[Division],
    roster: &[Athlete],
    belt_grouping: bool,
) -> Vec<CategoryGroup> {
    let mut count_by_division: HashMap<_, usize> = HashMap::new();
    for athlete in roster.iter().filter(|a| a.is_checked_in()) {
        *count_by_division
            .entry(athlete.effective_division_id())
            .or_default() += 1;
    }

    // BTreeMap keeps group order deterministic across runs.
    let mut groups: BTreeMap<CategoryKey, CategoryGroup> = BTreeMap::new();
    for division in divisions.iter().filter(|d| d.enabled) {
        let key = CategoryKey {
            gender: division.gender,
            min_age: division.min_age,
            max_age: division.max_age,
            belt: belt_grouping.then_some(division.belt),
        };
        let group = groups.entry(key.clone()).or_insert_with(|| CategoryGroup {
            key,
            division_ids: Vec::new(),
            athlete_count: 0,
        });
        group.division_ids.push(division.id);
        group.athlete_count += count_by_division.get(&division.id).copied().unwrap_or(0);
    }
    groups.into_values().collect()
}

/// Greedy bin-pack of category groups onto `mat_count` mats.
///
/// Groups are taken in descending athlete-count order and each goes to the mat
/// with the lowest running total, ties broken by mat index. This balances load
/// well in practice but is an approximation, not an optimal packing.
pub fn distribute_mats(groups: &[CategoryGroup], mat_count: usize) -> MatAssignment {
    if mat_count == 0 {
        return MatAssignment::default();
    }
    let mut mats: Vec<MatPlan> = (1..=mat_count)
        .map(|i| MatPlan {
            mat: format!("Mat {}", i),
            groups: Vec::new(),
            athlete_count: 0,
        })
        .collect();

    let mut ordered: Vec<&CategoryGroup> = groups.iter().collect();
    ordered.sort_by(|a, b| {
        b.athlete_count
            .cmp(&a.athlete_count)
            .then_with(|| a.key.cmp(&b.key))
    });

    for group in ordered {
        let lightest = mats
            .iter()
            .enumerate()
            .min_by_key(|(i, m)| (m.athlete_count, *i))
            .map(|(i, _)| i)
            .unwrap_or(0);
        mats[lightest].groups.push(group.clone());
        mats[lightest].athlete_count += group.athlete_count;
    }

    MatAssignment { mats }
}

/// Number every schedulable fight per mat and write the mat name + sequence
/// onto the matches.
///
/// A match is schedulable once both sides are real athletes; completed matches
/// keep their place in the historical order. Within a mat, fights group by
/// category in assignment order, then by round ascending and match index
/// ascending per bracket (split groups in letter order); the third-place match
/// is numbered after the final. Previous mat/sequence marks are cleared first,
/// so this is safe to re-run whenever brackets or assignments change. No other
/// bracket state is touched.
pub fn generate_fight_order(
    brackets: &mut HashMap<BracketId, Bracket>,
    assignment: &MatAssignment,
) -> Vec<ScheduledFight> {
    for bracket in brackets.values_mut() {
        for m in bracket
            .rounds
            .iter_mut()
            .flatten()
            .chain(bracket.third_place_match.as_mut())
        {
            m.mat = None;
            m.sequence = None;
        }
    }

    let mut fights = Vec::new();
    for plan in &assignment.mats {
        let mut sequence = 0u32;
        for group in &plan.groups {
            for division_id in &group.division_ids {
                let mut bracket_ids: Vec<BracketId> = brackets
                    .values()
                    .filter(|b| b.division_id == *division_id)
                    .map(|b| b.id.clone())
                    .collect();
                bracket_ids.sort();
                for bracket_id in bracket_ids {
                    let Some(bracket) = brackets.get_mut(&bracket_id) else {
                        continue;
                    };
                    for match_id in schedulable_ids(bracket) {
                        sequence += 1;
                        let Some(m) = bracket.match_mut(match_id) else {
                            continue;
                        };
                        m.mat = Some(plan.mat.clone());
                        m.sequence = Some(sequence);
                        let (Some(f1), Some(f2)) = (m.fighter1.athlete(), m.fighter2.athlete())
                        else {
                            continue;
                        };
                        fights.push(ScheduledFight {
                            mat: plan.mat.clone(),
                            sequence,
                            bracket_id: bracket_id.clone(),
                            match_id: m.id,
                            round: m.round,
                            fighter1: f1,
                            fighter2: f2,
                            decided: m.winner_id.is_some(),
                        });
                    }
                }
            }
        }
    }
    fights
}

/// Schedulable matches of one bracket in play order: rounds ascending, match
/// index ascending, third-place after the final.
fn schedulable_ids(bracket: &Bracket) -> Vec<MatchId> {
    bracket
        .rounds
        .iter()
        .flatten()
        .chain(bracket.third_place_match.as_ref())
        .filter(|m| m.is_contested())
        .map(|m| m.id)
        .collect()
}
