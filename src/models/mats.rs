//! Mat assignment and fight-order types.

use crate::models::athlete::AthleteId;
use crate::models::bracket::{BracketId, MatchId};
use crate::models::division::{Belt, DivisionId, Gender};
use serde::{Deserialize, Serialize};

/// Grouping key for mat distribution: gender + age band, plus belt when belt
/// grouping is enabled (`belt: None` means belts are pooled together).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CategoryKey {
    pub gender: Gender,
    pub min_age: u32,
    pub max_age: u32,
    pub belt: Option<Belt>,
}

/// A category group: the divisions sharing one key and their athlete count.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub key: CategoryKey,
    pub division_ids: Vec<DivisionId>,
    pub athlete_count: usize,
}

/// One physical mat's share of the event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatPlan {
    pub mat: String,
    pub groups: Vec<CategoryGroup>,
    pub athlete_count: usize,
}

/// Category-to-mat assignment produced by the auto-distributor.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatAssignment {
    pub mats: Vec<MatPlan>,
}

impl MatAssignment {
    pub fn is_empty(&self) -> bool {
        self.mats.is_empty()
    }
}

/// One numbered entry of a mat's fight list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFight {
    pub mat: String,
    /// 1-based sequence number within the mat.
    pub sequence: u32,
    pub bracket_id: BracketId,
    pub match_id: MatchId,
    pub round: u32,
    pub fighter1: AthleteId,
    pub fighter2: AthleteId,
    /// Completed fights stay in the historical order.
    pub decided: bool,
}
