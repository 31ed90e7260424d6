//! Athlete data as the bracket engine sees it: club, belt, weight, division.

use crate::models::division::{Belt, DivisionId, Gender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an athlete (used in matches and lookups).
pub type AthleteId = Uuid;

/// Weigh-in / check-in state of an athlete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// Registered but not yet weighed in.
    #[default]
    Pending,
    /// Weighed in within limit (possibly after an automatic division move).
    CheckedIn,
    /// Over the limit with no eligible division to move to; needs a human.
    Overweight,
}

/// A competitor. `moved_to_division_id` supersedes `assigned_division_id`
/// everywhere downstream once set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    pub club: String,
    pub gender: Gender,
    pub belt: Belt,
    /// Weight in kg as registered (before weigh-in).
    pub weight: f64,
    pub assigned_division_id: DivisionId,
    /// Override set by a reweigh move or a manual correction.
    pub moved_to_division_id: Option<DivisionId>,
    /// Free text explaining the override.
    pub move_reason: Option<String>,
    pub check_in: CheckInStatus,
    /// Weight in kg as measured at weigh-in.
    pub measured_weight: Option<f64>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Athlete {
    pub fn new(
        name: impl Into<String>,
        club: impl Into<String>,
        gender: Gender,
        belt: Belt,
        weight: f64,
        assigned_division_id: DivisionId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            club: club.into(),
            gender,
            belt,
            weight,
            assigned_division_id,
            moved_to_division_id: None,
            move_reason: None,
            check_in: CheckInStatus::Pending,
            measured_weight: None,
            checked_in_at: None,
        }
    }

    /// The division this athlete actually competes in: the move override when
    /// set, the registration assignment otherwise.
    pub fn effective_division_id(&self) -> DivisionId {
        self.moved_to_division_id.unwrap_or(self.assigned_division_id)
    }

    /// Whether the athlete counts toward bracket generation.
    pub fn is_checked_in(&self) -> bool {
        self.check_in == CheckInStatus::CheckedIn
    }
}
