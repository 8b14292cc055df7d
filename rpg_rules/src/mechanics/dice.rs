//! Three-valued dice.
//!
//! Each die has six faces, two each of `-`, blank and `+`, so a single die is
//! -1, 0 or +1 with equal probability. A set of `n` dice sums to `[-n, n]`.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Default number of dice in a set.
pub const DEFAULT_SET_SIZE: u32 = 4;

/// Value shown on a rolled die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Minus,
    Blank,
    Plus,
}

impl Face {
    /// Map a physical face number (1..=6) to its value.
    pub fn from_face_number(face: i32) -> Self {
        match face {
            i32::MIN..=2 => Face::Minus,
            3 | 4 => Face::Blank,
            _ => Face::Plus,
        }
    }

    /// -1, 0 or +1.
    pub fn value(&self) -> i32 {
        match self {
            Face::Minus => -1,
            Face::Blank => 0,
            Face::Plus => 1,
        }
    }

    /// Single-character glyph for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Face::Minus => "-",
            Face::Blank => " ",
            Face::Plus => "+",
        }
    }
}

/// Outcome of rolling one set of dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub faces: Vec<Face>,
    /// Sum of face values.
    pub magnitude: i32,
}

impl DiceRoll {
    /// Build a roll from known faces (useful for replays and tests).
    pub fn from_faces(faces: Vec<Face>) -> Self {
        let magnitude = faces.iter().map(Face::value).sum();
        Self { faces, magnitude }
    }

    /// Whether the roll alone reached the critical band.
    pub fn criticality(&self, critical_magnitude: i32) -> Criticality {
        if self.magnitude >= critical_magnitude {
            Criticality::Critical
        } else if self.magnitude <= -critical_magnitude {
            Criticality::Fumble
        } else {
            Criticality::Normal
        }
    }

    /// Combine with a flat modifier into the presentation contract.
    pub fn with_modifier(&self, modifier: i32) -> RollResult {
        RollResult {
            total: self.magnitude + modifier,
            magnitude: self.magnitude,
            faces: self.faces.iter().map(|f| f.symbol().to_string()).collect(),
        }
    }
}

/// Flavor classification of a roll. Never changes success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Critical,
    Normal,
    Fumble,
}

/// Dice result as handed to the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub total: i32,
    pub magnitude: i32,
    pub faces: Vec<String>,
}

/// Roll a single die.
pub fn roll_die(rng: &mut impl RandomSource) -> Face {
    Face::from_face_number(rng.gen_range(1, 6))
}

/// Roll `n` dice and sum them.
pub fn roll_set(rng: &mut impl RandomSource, n: u32) -> DiceRoll {
    DiceRoll::from_faces((0..n).map(|_| roll_die(rng)).collect())
}
