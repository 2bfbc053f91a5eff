//! Contested checks: two actors rolling against each other instead of a DC.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::context::SkillContext;
use crate::dice::Advantage;
use crate::resolution::{CheckRequest, SkillCheckResult, perform_check};
use crate::sheet::SkillActor;

/// How a contest ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestedOutcome {
    /// Initiator rolled more net successes.
    InitiatorWins,
    /// Defender rolled more net successes.
    DefenderWins,
    /// Equal net successes.
    Tie,
    /// Initiator fumbled; the defender wins outright.
    InitiatorFumble,
    /// Defender fumbled; the initiator wins outright.
    DefenderFumble,
    /// Both fumbled; nobody wins.
    BothFumble,
}

impl ContestedOutcome {
    /// Decide a contest from two rolls. Fumbles take priority over net successes.
    pub fn determine(initiator: &SkillCheckResult, defender: &SkillCheckResult) -> Self {
        match (initiator.roll.is_fumble(), defender.roll.is_fumble()) {
            (true, true) => Self::BothFumble,
            (true, false) => Self::InitiatorFumble,
            (false, true) => Self::DefenderFumble,
            (false, false) => match initiator.net_successes.cmp(&defender.net_successes) {
                std::cmp::Ordering::Greater => Self::InitiatorWins,
                std::cmp::Ordering::Less => Self::DefenderWins,
                std::cmp::Ordering::Equal => Self::Tie,
            },
        }
    }

    /// Whether the initiator came out ahead.
    pub fn initiator_wins(self) -> bool {
        matches!(self, Self::InitiatorWins | Self::DefenderFumble)
    }

    /// Whether the defender came out ahead.
    pub fn defender_wins(self) -> bool {
        matches!(self, Self::DefenderWins | Self::InitiatorFumble)
    }

    /// Whether anyone fumbled.
    pub fn had_fumble(self) -> bool {
        matches!(
            self,
            Self::InitiatorFumble | Self::DefenderFumble | Self::BothFumble
        )
    }
}

impl std::fmt::Display for ContestedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitiatorWins => write!(f, "Initiator Wins"),
            Self::DefenderWins => write!(f, "Defender Wins"),
            Self::Tie => write!(f, "Tie"),
            Self::InitiatorFumble => write!(f, "Initiator Fumble"),
            Self::DefenderFumble => write!(f, "Defender Fumble"),
            Self::BothFumble => write!(f, "Both Fumble"),
        }
    }
}

/// One side of a contest.
#[derive(Clone, Copy)]
pub struct ContestSide<'a> {
    /// Who is rolling.
    pub actor: &'a dyn SkillActor,
    /// Skill they roll.
    pub skill_id: &'a str,
    /// Their modifiers, if any.
    pub context: Option<&'a SkillContext>,
    /// Advantage state for their roll.
    pub advantage: Advantage,
}

impl<'a> ContestSide<'a> {
    /// A side with no modifiers and a normal roll.
    pub fn new(actor: &'a dyn SkillActor, skill_id: &'a str) -> Self {
        Self {
            actor,
            skill_id,
            context: None,
            advantage: Advantage::Normal,
        }
    }

    /// Attach modifiers.
    pub fn with_context(mut self, context: &'a SkillContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Roll with advantage or disadvantage.
    pub fn with_advantage(mut self, advantage: Advantage) -> Self {
        self.advantage = advantage;
        self
    }

    fn roll<R: Rng>(&self, rng: &mut R) -> SkillCheckResult {
        let request = CheckRequest::for_actor(self.actor, self.skill_id, 0)
            .with_context(self.context.cloned().unwrap_or_default())
            .with_advantage(self.advantage);
        perform_check(&request, rng)
    }
}

/// Result of a contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestedCheckResult {
    /// Initiator id.
    pub initiator_id: String,
    /// Skill the initiator rolled.
    pub initiator_skill: String,
    /// Initiator's check.
    pub initiator_result: SkillCheckResult,
    /// Defender id.
    pub defender_id: String,
    /// Skill the defender rolled.
    pub defender_skill: String,
    /// Defender's check.
    pub defender_result: SkillCheckResult,
    /// How the contest ended.
    pub outcome: ContestedOutcome,
    /// Initiator net minus defender net.
    pub margin: i32,
}

impl ContestedCheckResult {
    /// Id of the winner, if there is one.
    pub fn winner_id(&self) -> Option<&str> {
        if self.outcome.initiator_wins() {
            Some(&self.initiator_id)
        } else if self.outcome.defender_wins() {
            Some(&self.defender_id)
        } else {
            None
        }
    }
}

/// Roll a contest. The initiator rolls first.
pub fn resolve_contested<R: Rng>(
    initiator: ContestSide<'_>,
    defender: ContestSide<'_>,
    rng: &mut R,
) -> ContestedCheckResult {
    let initiator_result = initiator.roll(rng);
    let defender_result = defender.roll(rng);
    let outcome = ContestedOutcome::determine(&initiator_result, &defender_result);
    let margin = initiator_result.net_successes - defender_result.net_successes;

    if outcome.had_fumble() {
        tracing::info!(
            initiator = initiator.actor.id(),
            defender = defender.actor.id(),
            %outcome,
            "contest ended in a fumble"
        );
    } else {
        tracing::debug!(
            initiator = initiator.actor.id(),
            defender = defender.actor.id(),
            initiator_net = initiator_result.net_successes,
            defender_net = defender_result.net_successes,
            %outcome,
            margin,
            "contest resolved"
        );
    }

    ContestedCheckResult {
        initiator_id: initiator.actor.id().to_string(),
        initiator_skill: initiator.skill_id.to_string(),
        initiator_result,
        defender_id: defender.actor.id().to_string(),
        defender_skill: defender.skill_id.to_string(),
        defender_result,
        outcome,
        margin,
    }
}
