//! Single-actor skill checks.
//!
//! A [`CheckRequest`] carries the raw pool inputs, a context and a DC;
//! [`perform_check`] turns it into a [`SkillCheckResult`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::context::SkillContext;
use crate::dice::{Advantage, DicePool, RollResult};
use crate::resolution::SkillOutcome;
use crate::sheet::SkillActor;

/// A request to perform a skill check.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    /// Skill being tested, kept for reporting.
    pub skill_id: String,
    /// Dice from training (or any caller-chosen base pool).
    pub base_pool: i32,
    /// Dice from the governing attribute.
    pub attribute_dice: i32,
    /// Modifiers in play.
    pub context: SkillContext,
    /// Difficulty class before context adjustments.
    pub difficulty_class: i32,
    /// Roll once, or twice keeping the better or worse roll.
    pub advantage: Advantage,
}

impl CheckRequest {
    /// Build a request from an actor's training and attribute in a skill.
    pub fn for_actor(actor: &dyn SkillActor, skill_id: &str, difficulty_class: i32) -> Self {
        Self {
            skill_id: skill_id.to_string(),
            base_pool: actor.proficiency_dice(skill_id),
            attribute_dice: actor.attribute_dice(skill_id),
            difficulty_class,
            ..Self::default()
        }
    }

    /// Set the modifiers in play.
    pub fn with_context(mut self, context: SkillContext) -> Self {
        self.context = context;
        self
    }

    /// Roll with advantage or disadvantage.
    pub fn with_advantage(mut self, advantage: Advantage) -> Self {
        self.advantage = advantage;
        self
    }

    /// Pool after attribute and context dice, never below one die.
    pub fn effective_pool(&self) -> DicePool {
        DicePool::new(
            self.base_pool
                .saturating_add(self.attribute_dice)
                .saturating_add(self.context.total_dice_modifier()),
        )
    }

    /// DC after context adjustments.
    pub fn effective_dc(&self) -> i32 {
        self.difficulty_class
            .saturating_add(self.context.total_dc_modifier())
    }
}

/// The classified result of one skill check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheckResult {
    /// Skill that was tested.
    pub skill_id: String,
    /// Dice actually rolled.
    pub pool_size: u32,
    /// The roll that counts.
    pub roll: RollResult,
    /// The other roll on an advantage or disadvantage check.
    pub discarded_roll: Option<RollResult>,
    /// Successes minus botches. Can be negative.
    pub net_successes: i32,
    /// DC including context adjustments.
    pub difficulty_class: i32,
    /// Net successes minus DC.
    pub margin: i32,
    /// Outcome tier.
    pub outcome: SkillOutcome,
}

impl SkillCheckResult {
    /// Classify an existing roll against a DC.
    pub fn from_roll(skill_id: impl Into<String>, roll: RollResult, difficulty_class: i32) -> Self {
        let net_successes = roll.net_successes();
        Self {
            skill_id: skill_id.into(),
            pool_size: roll.count() as u32,
            net_successes,
            difficulty_class,
            margin: net_successes - difficulty_class,
            outcome: SkillOutcome::classify(net_successes, difficulty_class),
            roll,
            discarded_roll: None,
        }
    }

    /// Marginal success or better.
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Critical failure.
    pub fn is_fumble(&self) -> bool {
        self.outcome.is_fumble()
    }

    /// Critical success.
    pub fn is_critical_success(&self) -> bool {
        self.outcome.is_critical_success()
    }

    /// Either extreme tier.
    pub fn is_critical(&self) -> bool {
        self.is_fumble() || self.is_critical_success()
    }
}

impl std::fmt::Display for SkillCheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} vs DC {} (margin {:+}) {}",
            self.skill_id, self.net_successes, self.difficulty_class, self.margin, self.outcome
        )
    }
}

/// Roll and classify a skill check.
pub fn perform_check<R: Rng>(request: &CheckRequest, rng: &mut R) -> SkillCheckResult {
    let pool = request.effective_pool();
    let dc = request.effective_dc();

    let (roll, discarded) = match request.advantage {
        Advantage::Normal => (pool.roll(rng), None),
        Advantage::Advantage => {
            let first = pool.roll(rng);
            let second = pool.roll(rng);
            if second.net_successes() > first.net_successes() {
                (second, Some(first))
            } else {
                (first, Some(second))
            }
        }
        Advantage::Disadvantage => {
            let first = pool.roll(rng);
            let second = pool.roll(rng);
            if second.net_successes() < first.net_successes() {
                (second, Some(first))
            } else {
                (first, Some(second))
            }
        }
    };

    let mut result = SkillCheckResult::from_roll(&request.skill_id, roll, dc);
    result.discarded_roll = discarded;

    tracing::debug!(
        skill = %request.skill_id,
        pool = pool.size(),
        base_dc = request.difficulty_class,
        dc,
        advantage = %request.advantage,
        roll = %result.roll,
        outcome = %result.outcome,
        margin = result.margin,
        "skill check resolved"
    );
    if request.context.has_modifiers() {
        tracing::trace!("applied modifiers:\n{}", request.context.describe());
    }
    if result.is_fumble() {
        tracing::info!(skill = %request.skill_id, "fumble");
    } else if result.is_critical_success() {
        tracing::info!(skill = %request.skill_id, "critical success");
    }

    result
}
