//! Grappling tournament web app: library with models and bracket engine logic.

pub mod logic;
pub mod models;

pub use logic::{
    auto_advance_byes, build_bracket, build_brackets, build_division_brackets, category_groups,
    distribute_mats, generate_fight_order, group_label, reassign_on_overweight, record_result,
    regenerate_division, remove_division_brackets, replay, revert_result, split_roster,
    BuildReport, MutationQueue, QueuedMutation, RecordOutcome, ReplayConflict, ReplayReport,
    ReweighOutcome,
};
pub use models::{
    Athlete, AthleteId, Belt, Bracket, BracketError, BracketId, BracketMatch, BracketOptions,
    CategoryGroup, CategoryKey, CheckInStatus, Division, DivisionId, Event, EventFlags, EventId,
    EventSettings, FighterSlot, Gender, MatAssignment, MatPlan, MatchId, MatchResult, ResultType,
    ScheduledFight, THIRD_PLACE_ROUND,
};
