//! Dice pool construction and rolling.

use rand::Rng;

use super::roll::RollResult;
use super::{DIE_FACES, MINIMUM_POOL};

/// A number of d10s to be rolled together. Never smaller than one die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DicePool {
    size: u32,
}

impl DicePool {
    /// Create a pool, clamping sizes below one up to a single die.
    pub fn new(size: i32) -> Self {
        Self {
            size: size.max(MINIMUM_POOL as i32) as u32,
        }
    }

    /// Returns how many dice are in the pool.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Roll every die in the pool using the given RNG.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> RollResult {
        RollResult::from_faces((0..self.size).map(|_| rng.random_range(1..=DIE_FACES)))
    }
}

impl Default for DicePool {
    fn default() -> Self {
        Self::new(MINIMUM_POOL as i32)
    }
}

impl std::fmt::Display for DicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d10", self.size)
    }
}
