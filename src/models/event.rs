//! Event: divisions, athletes, brackets, and mat assignment for one competition.

use crate::models::athlete::{Athlete, AthleteId};
use crate::models::bracket::{Bracket, BracketId, BracketOptions};
use crate::models::division::{Division, DivisionId};
use crate::models::mats::MatAssignment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Weigh-in behavior flags, passed explicitly into the reweigh logic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventFlags {
    pub weight_check_enabled: bool,
    pub overweight_auto_move_enabled: bool,
    pub belt_grouping_enabled: bool,
}

impl Default for EventFlags {
    fn default() -> Self {
        Self {
            weight_check_enabled: true,
            overweight_auto_move_enabled: true,
            belt_grouping_enabled: true,
        }
    }
}

/// Event-level configuration: weigh-in flags, bracket options, mat count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    pub weight_check_enabled: bool,
    pub overweight_auto_move_enabled: bool,
    pub belt_grouping_enabled: bool,
    pub include_third_place: bool,
    pub team_separation: bool,
    pub max_per_group: Option<usize>,
    pub mat_count: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            weight_check_enabled: true,
            overweight_auto_move_enabled: true,
            belt_grouping_enabled: true,
            include_third_place: true,
            team_separation: true,
            max_per_group: None,
            mat_count: 1,
        }
    }
}

impl EventSettings {
    pub fn flags(&self) -> EventFlags {
        EventFlags {
            weight_check_enabled: self.weight_check_enabled,
            overweight_auto_move_enabled: self.overweight_auto_move_enabled,
            belt_grouping_enabled: self.belt_grouping_enabled,
        }
    }

    pub fn bracket_options(&self) -> BracketOptions {
        BracketOptions {
            include_third_place: self.include_third_place,
            team_separation: self.team_separation,
            max_per_group: self.max_per_group,
        }
    }
}

/// Full event state. The owning store's write guard is the transactional
/// boundary for mutations that span a match and its propagation targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub divisions: Vec<Division>,
    pub athletes: Vec<Athlete>,
    pub brackets: HashMap<BracketId, Bracket>,
    pub mat_assignment: Option<MatAssignment>,
    pub settings: EventSettings,
}

impl Event {
    pub fn new(name: impl Into<String>, settings: EventSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            divisions: Vec::new(),
            athletes: Vec::new(),
            brackets: HashMap::new(),
            mat_assignment: None,
            settings,
        }
    }

    pub fn division(&self, id: DivisionId) -> Option<&Division> {
        self.divisions.iter().find(|d| d.id == id)
    }

    pub fn athlete(&self, id: AthleteId) -> Option<&Athlete> {
        self.athletes.iter().find(|a| a.id == id)
    }

    pub fn athlete_mut(&mut self, id: AthleteId) -> Option<&mut Athlete> {
        self.athletes.iter_mut().find(|a| a.id == id)
    }

    /// Checked-in athletes whose effective division is the given one.
    pub fn eligible_roster(&self, division_id: DivisionId) -> Vec<Athlete> {
        self.athletes
            .iter()
            .filter(|a| a.is_checked_in() && a.effective_division_id() == division_id)
            .cloned()
            .collect()
    }
}
