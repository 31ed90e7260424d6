//! Bracket, match, and result types for single-elimination play.

use crate::models::athlete::AthleteId;
use crate::models::division::DivisionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Bracket identifier: the division id, or `<divisionId>-<letter>` for a split group.
pub type BracketId = String;

/// Sentinel round number for the third-place match (regular rounds are 1-based).
pub const THIRD_PLACE_ROUND: u32 = 0;

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// No athletes to build a bracket from (caller must exclude empty divisions).
    EmptyRoster,
    /// Match id not present in the bracket; the client's view is stale.
    MatchNotFound(MatchId),
    /// The match has a BYE side; BYE matches are auto-resolved, never scored.
    ByeMatch(MatchId),
    /// One of the fighter slots is not set yet.
    IncompleteMatch(MatchId),
    /// The given winner is not one of the match's two fighters.
    WinnerNotInMatch { match_id: MatchId, winner_id: AthleteId },
    /// Revert target has no result to revert.
    NotDecided(MatchId),
    /// Revert refused: a downstream match already has a winner.
    DownstreamDecided { match_id: MatchId, blocking: MatchId },
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::EmptyRoster => write!(f, "No eligible athletes to build a bracket from"),
            BracketError::MatchNotFound(id) => write!(f, "Match {} not found in bracket", id),
            BracketError::ByeMatch(id) => {
                write!(f, "Match {} has a BYE side and resolves automatically", id)
            }
            BracketError::IncompleteMatch(id) => {
                write!(f, "Match {} does not have both fighters yet", id)
            }
            BracketError::WinnerNotInMatch { match_id, winner_id } => {
                write!(f, "Athlete {} is not fighting in match {}", winner_id, match_id)
            }
            BracketError::NotDecided(id) => write!(f, "Match {} has no result to revert", id),
            BracketError::DownstreamDecided { match_id, blocking } => write!(
                f,
                "Cannot revert match {}: downstream match {} already has a winner (revert it first)",
                match_id, blocking
            ),
        }
    }
}

/// One side of a match: not yet known, a placeholder causing automatic
/// advancement, or a real athlete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterSlot {
    #[default]
    Empty,
    Bye,
    Athlete(AthleteId),
}

impl FighterSlot {
    pub fn athlete(&self) -> Option<AthleteId> {
        match self {
            FighterSlot::Athlete(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, FighterSlot::Bye)
    }
}

/// How a match was decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Submission,
    Points,
    Decision,
    Disqualification,
    Walkover,
}

/// A recorded result: how the match ended, plus free text (score, submission name).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub result_type: ResultType,
    pub details: Option<String>,
}

/// A single match in a bracket. Mutated in place by the result engine;
/// never deleted, only reverted back to an unset-result state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    /// 1-based round number; [`THIRD_PLACE_ROUND`] denotes the third-place match.
    pub round: u32,
    pub fighter1: FighterSlot,
    pub fighter2: FighterSlot,
    pub winner_id: Option<AthleteId>,
    pub loser_id: Option<AthleteId>,
    pub result: Option<MatchResult>,
    /// The match this one's winner advances into (None for the final and third-place).
    pub next_match_id: Option<MatchId>,
    /// Feeder matches; index 0 fills `fighter1` of this match, index 1 fills `fighter2`.
    pub prev_match_ids: Vec<MatchId>,
    /// Assigned by the fight-order scheduler, not by the builder.
    pub mat: Option<String>,
    pub sequence: Option<u32>,
}

impl BracketMatch {
    pub fn new(round: u32, fighter1: FighterSlot, fighter2: FighterSlot) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            fighter1,
            fighter2,
            winner_id: None,
            loser_id: None,
            result: None,
            next_match_id: None,
            prev_match_ids: Vec::new(),
            mat: None,
            sequence: None,
        }
    }

    /// An empty later-round shell, wired up by the builder.
    pub fn shell(round: u32) -> Self {
        Self::new(round, FighterSlot::Empty, FighterSlot::Empty)
    }

    /// Both sides are real athletes (the only matches the scheduler lists
    /// and the result engine accepts).
    pub fn is_contested(&self) -> bool {
        self.fighter1.athlete().is_some() && self.fighter2.athlete().is_some()
    }

    /// Exactly one side is a BYE (resolves automatically at build time).
    pub fn has_bye(&self) -> bool {
        self.fighter1.is_bye() || self.fighter2.is_bye()
    }
}

/// Options controlling bracket construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketOptions {
    pub include_third_place: bool,
    /// Best-effort: avoid same-club pairings in round 1 where possible.
    pub team_separation: bool,
    /// Split the division into lettered groups above this roster size.
    pub max_per_group: Option<usize>,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self {
            include_third_place: true,
            team_separation: true,
            max_per_group: None,
        }
    }
}

/// The single-elimination tree for one division or split group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub division_id: DivisionId,
    /// Index 0 = first round; the last round holds the single final.
    pub rounds: Vec<Vec<BracketMatch>>,
    pub third_place_match: Option<BracketMatch>,
    /// Smallest power of two >= participant count (1 for a walkover champion).
    pub bracket_size: usize,
    /// Seeded round-1 order, BYE-padded to `bracket_size`.
    pub participants: Vec<FighterSlot>,
    pub winner_id: Option<AthleteId>,
    pub runner_up_id: Option<AthleteId>,
    pub third_place_winner_id: Option<AthleteId>,
    /// Split group letter ("A", "B", ...) when the division was split.
    pub group_name: Option<String>,
}

impl Bracket {
    /// Total number of regular rounds.
    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// The sole match of the last round, when rounds exist.
    pub fn final_match(&self) -> Option<&BracketMatch> {
        self.rounds.last().and_then(|r| r.first())
    }

    /// Look up a match anywhere in the bracket (rounds or third-place).
    pub fn match_ref(&self, id: MatchId) -> Option<&BracketMatch> {
        self.rounds
            .iter()
            .flatten()
            .find(|m| m.id == id)
            .or_else(|| self.third_place_match.as_ref().filter(|m| m.id == id))
    }

    pub fn match_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        for round in &mut self.rounds {
            if let Some(m) = round.iter_mut().find(|m| m.id == id) {
                return Some(m);
            }
        }
        self.third_place_match.as_mut().filter(|m| m.id == id)
    }

    /// (round index, match index) of a regular-round match.
    pub fn position_of(&self, id: MatchId) -> Option<(usize, usize)> {
        for (r, round) in self.rounds.iter().enumerate() {
            if let Some(j) = round.iter().position(|m| m.id == id) {
                return Some((r, j));
            }
        }
        None
    }

    /// Whether every deciding match has been decided: the final, and the
    /// third-place match when one exists. A third-place match fed by a BYE
    /// semifinal can never be contested (a BYE match has no loser), so it does
    /// not block completion.
    pub fn is_decided(&self) -> bool {
        let final_done = self.winner_id.is_some();
        let third_done = match &self.third_place_match {
            Some(tp) => {
                tp.winner_id.is_some()
                    || tp
                        .prev_match_ids
                        .iter()
                        .any(|&id| self.match_ref(id).map_or(false, |m| m.has_bye()))
            }
            None => true,
        };
        final_done && third_done
    }

    /// Number of BYE slots in the seeded participant list.
    pub fn bye_count(&self) -> usize {
        self.participants.iter().filter(|s| s.is_bye()).count()
    }
}
