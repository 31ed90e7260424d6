//! Data structures for the tournament: athletes, divisions, brackets, events.

mod athlete;
mod bracket;
mod division;
mod event;
mod mats;

pub use athlete::{Athlete, AthleteId, CheckInStatus};
pub use bracket::{
    Bracket, BracketError, BracketId, BracketMatch, BracketOptions, FighterSlot, MatchId,
    MatchResult, ResultType, THIRD_PLACE_ROUND,
};
pub use division::{Belt, Division, DivisionId, Gender};
pub use event::{Event, EventFlags, EventId, EventSettings};
pub use mats::{CategoryGroup, CategoryKey, MatAssignment, MatPlan, ScheduledFight};
