//! Division splitting: partition oversized rosters into lettered groups and
//! build one bracket per group.

use crate::logic::builder::build_bracket;
use crate::models::{
    Athlete, Bracket, BracketError, BracketId, BracketOptions, Division, DivisionId,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Per-division outcome of a full bracket generation run.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    pub brackets: Vec<Bracket>,
    pub errors: Vec<(DivisionId, BracketError)>,
}

/// Group label for split brackets: A, B, C... with numeric suffixes past 26.
pub fn group_label(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Shuffle and chunk a roster into groups of at most `max_per_group`. A
/// trailing group of exactly 1 is merged into the previous chunk (a group of
/// size 1 cannot fight).
pub fn split_roster(roster: &[Athlete], max_per_group: usize, rng: &mut impl Rng) -> Vec<Vec<Athlete>> {
    if max_per_group == 0 || roster.len() <= max_per_group {
        return vec![roster.to_vec()];
    }
    let mut pool = roster.to_vec();
    pool.shuffle(rng);
    let mut groups: Vec<Vec<Athlete>> = pool.chunks(max_per_group).map(<[_]>::to_vec).collect();
    if groups.len() >= 2 && groups.last().map_or(false, |g| g.len() == 1) {
        let straggler = groups.pop().unwrap_or_default();
        if let Some(previous) = groups.last_mut() {
            previous.extend(straggler);
        }
    }
    groups
}

/// Build the bracket set for one division: a single bracket, or one per split
/// group when the roster exceeds `options.max_per_group`.
pub fn build_division_brackets(
    division: &Division,
    roster: &[Athlete],
    options: &BracketOptions,
    rng: &mut impl Rng,
) -> Result<Vec<Bracket>, BracketError> {
    if roster.is_empty() {
        return Err(BracketError::EmptyRoster);
    }
    let needs_split = options
        .max_per_group
        .map_or(false, |cap| cap > 0 && roster.len() > cap);
    if !needs_split {
        return Ok(vec![build_bracket(division, roster, None, options, rng)?]);
    }

    let cap = options.max_per_group.unwrap_or(roster.len());
    let groups = split_roster(roster, cap, rng);
    let mut brackets = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        brackets.push(build_bracket(
            division,
            group,
            Some(&group_label(i)),
            options,
            rng,
        )?);
    }
    Ok(brackets)
}

/// Delete every bracket belonging to a division: the plain division id and
/// all `<divisionId>-` split ids. Run before regeneration so a changed split
/// count leaves no stale group behind.
pub fn remove_division_brackets(brackets: &mut HashMap<BracketId, Bracket>, division_id: DivisionId) {
    let plain = division_id.to_string();
    let prefix = format!("{}-", division_id);
    brackets.retain(|id, _| *id != plain && !id.starts_with(&prefix));
}

/// Regenerate a division's bracket set in place: purge stale brackets, then
/// build and insert the new ones. Returns the new bracket ids.
pub fn regenerate_division(
    brackets: &mut HashMap<BracketId, Bracket>,
    division: &Division,
    roster: &[Athlete],
    options: &BracketOptions,
    rng: &mut impl Rng,
) -> Result<Vec<BracketId>, BracketError> {
    let fresh = build_division_brackets(division, roster, options, rng)?;
    remove_division_brackets(brackets, division.id);
    let ids: Vec<BracketId> = fresh.iter().map(|b| b.id.clone()).collect();
    for bracket in fresh {
        brackets.insert(bracket.id.clone(), bracket);
    }
    Ok(ids)
}

/// Build brackets for every enabled division with a checked-in roster.
/// Divisions with no eligible athletes contribute an error entry, not a
/// bracket; the roster is grouped by effective division (move overrides
/// already applied).
pub fn build_brackets(
    divisions: &[Division],
    roster: &[Athlete],
    options: &BracketOptions,
    rng: &mut impl Rng,
) -> BuildReport {
    let mut report = BuildReport::default();
    for division in divisions.iter().filter(|d| d.enabled) {
        let eligible: Vec<Athlete> = roster
            .iter()
            .filter(|a| a.is_checked_in() && a.effective_division_id() == division.id)
            .cloned()
            .collect();
        match build_division_brackets(division, &eligible, options, rng) {
            Ok(brackets) => report.brackets.extend(brackets),
            Err(e) => report.errors.push((division.id, e)),
        }
    }
    report
}
