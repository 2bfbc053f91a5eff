//! Ten-sided dice pools and rolling.
//!
//! Every check in the engine rolls a pool of d10s and counts faces:
//! a die showing 8 or more is a success, a die showing 1 is a botch,
//! and everything in between is blank.

pub mod pool;
pub mod roll;

pub use pool::DicePool;
pub use roll::RollResult;

use serde::{Deserialize, Serialize};

/// Number of faces on every die in a pool.
pub const DIE_FACES: u8 = 10;

/// Lowest face that counts as a success.
pub const SUCCESS_THRESHOLD: u8 = 8;

/// The face that counts as a botch.
pub const BOTCH_FACE: u8 = 1;

/// Smallest pool that can be rolled.
pub const MINIMUM_POOL: u32 = 1;

/// Whether a check rolls once, or twice keeping the better or worse roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Advantage {
    /// Roll the pool once.
    #[default]
    Normal,
    /// Roll twice, keep the roll with more net successes.
    Advantage,
    /// Roll twice, keep the roll with fewer net successes.
    Disadvantage,
}

impl Advantage {
    /// Parse from a string like "advantage", "adv", "disadvantage", "dis".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "none" => Some(Self::Normal),
            "advantage" | "adv" => Some(Self::Advantage),
            "disadvantage" | "dis" => Some(Self::Disadvantage),
            _ => None,
        }
    }
}

impl std::fmt::Display for Advantage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Advantage => write!(f, "advantage"),
            Self::Disadvantage => write!(f, "disadvantage"),
        }
    }
}
