//! Disconnected-mode support: a queue of match mutations applied to a local
//! replica, replayed in original order against the authoritative bracket map.

use crate::logic::results::{record_result, revert_result};
use crate::models::{AthleteId, Bracket, BracketError, BracketId, MatchId, MatchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A logical mutation queued while offline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QueuedMutation {
    RecordResult {
        bracket_id: BracketId,
        match_id: MatchId,
        winner_id: AthleteId,
        result: MatchResult,
    },
    RevertResult {
        bracket_id: BracketId,
        match_id: MatchId,
    },
}

/// FIFO mutation queue for one device's offline session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationQueue {
    entries: Vec<QueuedMutation>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: QueuedMutation) {
        self.entries.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A mutation that could not be applied at replay time, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConflict {
    pub mutation: QueuedMutation,
    pub reason: String,
}

/// Outcome of replaying a queue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayReport {
    pub applied: usize,
    pub conflicts: Vec<ReplayConflict>,
}

/// Replay queued mutations in original order against the authoritative map.
///
/// Conflict policy is last-write-wins, explicitly: a replayed result against a
/// match that is already decided reverts it first and re-records, so the
/// queued (later) write supersedes the stored one. When the revert guard
/// refuses (a downstream match is already decided) the mutation is skipped and
/// reported as a conflict instead of half-applied. Concurrent edits from two
/// devices are therefore never merged; whichever replays later wins.
pub fn replay(queue: MutationQueue, brackets: &mut HashMap<BracketId, Bracket>) -> ReplayReport {
    let mut report = ReplayReport::default();
    for mutation in queue.entries {
        let outcome = apply(&mutation, brackets);
        match outcome {
            Ok(()) => report.applied += 1,
            Err(reason) => report.conflicts.push(ReplayConflict { mutation, reason }),
        }
    }
    report
}

fn apply(
    mutation: &QueuedMutation,
    brackets: &mut HashMap<BracketId, Bracket>,
) -> Result<(), String> {
    match mutation {
        QueuedMutation::RecordResult {
            bracket_id,
            match_id,
            winner_id,
            result,
        } => {
            let bracket = brackets
                .get_mut(bracket_id)
                .ok_or_else(|| format!("Bracket {} not found", bracket_id))?;
            let already_decided = bracket
                .match_ref(*match_id)
                .map_or(false, |m| m.winner_id.is_some());
            // A failed re-record must not leave the stored result half-undone.
            let snapshot = already_decided.then(|| bracket.clone());
            if already_decided {
                revert_result(bracket, *match_id).map_err(err_string)?;
            }
            match record_result(bracket, *match_id, *winner_id, result.clone()) {
                Ok(_) => Ok(()),
                Err(e) => {
                    if let Some(snapshot) = snapshot {
                        *bracket = snapshot;
                    }
                    Err(err_string(e))
                }
            }
        }
        QueuedMutation::RevertResult {
            bracket_id,
            match_id,
        } => {
            let bracket = brackets
                .get_mut(bracket_id)
                .ok_or_else(|| format!("Bracket {} not found", bracket_id))?;
            revert_result(bracket, *match_id).map_err(err_string)
        }
    }
}

fn err_string(e: BracketError) -> String {
    e.to_string()
}
