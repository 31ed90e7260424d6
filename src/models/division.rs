//! Division: an eligibility bucket (age/gender/belt/weight).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a division.
pub type DivisionId = Uuid;

/// Gender of an athlete or division filter. `Any` is the division wildcard.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Any,
}

/// Belt rank of an athlete or division filter. `Any` is the division wildcard.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Belt {
    White,
    Blue,
    Purple,
    Brown,
    Black,
    Any,
}

/// An eligibility bucket athletes register into. Age/weight ranges may overlap
/// with other divisions by design; manual override exists for that reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    pub gender: Gender,
    pub belt: Belt,
    pub min_age: u32,
    pub max_age: u32,
    /// Lower weight bound in kg. Invariant: `max_weight >= min_weight`.
    pub min_weight: f64,
    pub max_weight: f64,
    pub no_gi: bool,
    pub enabled: bool,
}

impl Division {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        gender: Gender,
        belt: Belt,
        min_age: u32,
        max_age: u32,
        min_weight: f64,
        max_weight: f64,
        no_gi: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            gender,
            belt,
            min_age,
            max_age,
            min_weight,
            max_weight,
            no_gi,
            enabled: true,
        }
    }

    /// Same age band as `other`. An athlete's age category follows the
    /// division they currently sit in, so reassignment candidates must share it.
    pub fn same_age_band(&self, other: &Division) -> bool {
        self.min_age == other.min_age && self.max_age == other.max_age
    }

    /// Whether this division admits the given gender (`Any` admits all).
    pub fn accepts_gender(&self, gender: Gender) -> bool {
        self.gender == Gender::Any || self.gender == gender
    }

    /// Whether this division admits the given belt (`Any` admits all).
    pub fn accepts_belt(&self, belt: Belt) -> bool {
        self.belt == Belt::Any || self.belt == belt
    }
}
