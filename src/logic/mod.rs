//! Bracket engine logic: construction, splitting, results, reweigh, mats.

mod builder;
mod mats;
mod offline;
mod results;
mod reweigh;
mod splitter;

pub use builder::{auto_advance_byes, build_bracket};
pub use mats::{category_groups, distribute_mats, generate_fight_order};
pub use offline::{replay, MutationQueue, QueuedMutation, ReplayConflict, ReplayReport};
pub use results::{record_result, revert_result, RecordOutcome};
pub use reweigh::{reassign_on_overweight, ReweighOutcome};
pub use splitter::{
    build_brackets, build_division_brackets, group_label, regenerate_division,
    remove_division_brackets, split_roster, BuildReport,
};
