//! Weigh-in reassignment: move an over-limit athlete to the tightest-fitting
//! eligible division, or flag them overweight.

use crate::models::{Athlete, Belt, CheckInStatus, Division, EventFlags, Gender};
use chrono::Utc;

/// Outcome of a weigh-in. "No division large enough" is a valid terminal
/// outcome (`Overweight`, no move), not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct ReweighOutcome {
    pub status: CheckInStatus,
    pub athlete: Athlete,
}

/// Check an athlete in at the scale.
///
/// Within the current division's limit (or with the weight check disabled) the
/// athlete checks in where they are. Over the limit with auto-move disabled,
/// check-in is flagged `Overweight` for a human to resolve. Otherwise the
/// search covers all *other* enabled divisions of the same discipline, age
/// band, and gender (and belt, when belt grouping is on) whose limit covers
/// the measured weight; the smallest such limit wins (tightest fit).
///
/// On a move, the athlete adopts the target's belt/gender only where the
/// target's field is the `Any` wildcard; otherwise their own value stays.
/// This can run before brackets exist (affects generation) or after (stale
/// membership is surfaced by the UI; brackets are not retroactively edited).
pub fn reassign_on_overweight(
    athlete: &Athlete,
    division: &Division,
    measured_weight: f64,
    flags: &EventFlags,
    divisions: &[Division],
) -> ReweighOutcome {
    let mut updated = athlete.clone();
    updated.measured_weight = Some(measured_weight);

    if !flags.weight_check_enabled || measured_weight <= division.max_weight {
        updated.check_in = CheckInStatus::CheckedIn;
        updated.checked_in_at = Some(Utc::now());
        return ReweighOutcome {
            status: CheckInStatus::CheckedIn,
            athlete: updated,
        };
    }

    if !flags.overweight_auto_move_enabled {
        updated.check_in = CheckInStatus::Overweight;
        return ReweighOutcome {
            status: CheckInStatus::Overweight,
            athlete: updated,
        };
    }

    let target = divisions
        .iter()
        .filter(|d| d.id != division.id && d.enabled)
        .filter(|d| d.no_gi == division.no_gi && d.same_age_band(division))
        .filter(|d| d.accepts_gender(athlete.gender))
        .filter(|d| !flags.belt_grouping_enabled || d.accepts_belt(athlete.belt))
        .filter(|d| d.max_weight >= measured_weight)
        .min_by(|a, b| a.max_weight.total_cmp(&b.max_weight));

    match target {
        Some(target) => {
            updated.moved_to_division_id = Some(target.id);
            if target.belt == Belt::Any {
                updated.belt = target.belt;
            }
            if target.gender == Gender::Any {
                updated.gender = target.gender;
            }
            updated.move_reason = Some(format!(
                "Weighed {:.1} kg, over the {:.1} kg limit of {}; moved to {}",
                measured_weight, division.max_weight, division.name, target.name
            ));
            updated.check_in = CheckInStatus::CheckedIn;
            updated.checked_in_at = Some(Utc::now());
            ReweighOutcome {
                status: CheckInStatus::CheckedIn,
                athlete: updated,
            }
        }
        None => {
            updated.check_in = CheckInStatus::Overweight;
            ReweighOutcome {
                status: CheckInStatus::Overweight,
                athlete: updated,
            }
        }
    }
}
