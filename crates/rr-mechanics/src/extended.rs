//! Extended checks: accumulate successes over several rounds.
//!
//! Each round rolls the actor's pool and adds the positive net successes to
//! a running total. Fumbled rounds cost accumulated progress, and a streak of
//! fumbles ends the attempt outright.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ExtendedCheckConfig;
use crate::context::SkillContext;
use crate::dice::Advantage;
use crate::error::{MechError, MechResult};
use crate::resolution::{CheckRequest, SkillCheckResult, perform_check};
use crate::sheet::SkillActor;

/// Where an extended check stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtendedStatus {
    /// More rounds may be rolled.
    InProgress,
    /// The target was reached.
    Succeeded,
    /// Rounds ran out first.
    Failed,
    /// Too many fumbles in a row.
    CatastrophicFailure,
    /// Given up by the caller.
    Abandoned,
}

impl std::fmt::Display for ExtendedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::CatastrophicFailure => write!(f, "CatastrophicFailure"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// State of an extended check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedCheckState {
    /// Check id, `ext-<uuid>`.
    pub id: String,
    /// Character making the check.
    pub character_id: String,
    /// Skill rolled each round.
    pub skill_id: String,
    /// Successes needed.
    pub target_successes: u32,
    /// Rounds allowed.
    pub max_rounds: u32,
    /// Successes banked so far.
    pub accumulated_successes: u32,
    /// Rounds rolled so far.
    pub rounds_completed: u32,
    /// Fumbles in a row, reset by any non-fumble round.
    pub consecutive_fumbles: u32,
    /// Fumbles over the whole check.
    pub total_fumbles: u32,
    /// Current status.
    pub status: ExtendedStatus,
}

impl ExtendedCheckState {
    /// Begin an extended check.
    pub fn new(
        character_id: impl Into<String>,
        skill_id: impl Into<String>,
        target_successes: u32,
        max_rounds: u32,
    ) -> MechResult<Self> {
        if target_successes < 1 {
            return Err(MechError::InvalidExtendedCheck(
                "target successes must be at least 1".to_string(),
            ));
        }
        if max_rounds < 1 {
            return Err(MechError::InvalidExtendedCheck(
                "max rounds must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            id: format!("ext-{}", uuid::Uuid::new_v4().simple()),
            character_id: character_id.into(),
            skill_id: skill_id.into(),
            target_successes,
            max_rounds,
            accumulated_successes: 0,
            rounds_completed: 0,
            consecutive_fumbles: 0,
            total_fumbles: 0,
            status: ExtendedStatus::InProgress,
        })
    }

    /// Rounds left before the check fails.
    pub fn rounds_remaining(&self) -> u32 {
        self.max_rounds.saturating_sub(self.rounds_completed)
    }

    /// Successes still needed.
    pub fn successes_needed(&self) -> u32 {
        self.target_successes.saturating_sub(self.accumulated_successes)
    }

    /// Whether more rounds may be rolled.
    pub fn is_active(&self) -> bool {
        self.status == ExtendedStatus::InProgress
    }

    /// Fold one round's check into the state.
    pub fn apply_round(
        &mut self,
        check: &SkillCheckResult,
        config: &ExtendedCheckConfig,
    ) -> MechResult<()> {
        self.ensure_active()?;
        self.rounds_completed += 1;

        if check.roll.is_fumble() {
            self.consecutive_fumbles += 1;
            self.total_fumbles += 1;
            self.accumulated_successes = self
                .accumulated_successes
                .saturating_sub(config.fumble_penalty);
            if self.consecutive_fumbles >= config.catastrophic_fumble_streak {
                self.status = ExtendedStatus::CatastrophicFailure;
                return Ok(());
            }
        } else {
            self.consecutive_fumbles = 0;
            self.accumulated_successes += check.net_successes.max(0) as u32;
        }

        if self.accumulated_successes >= self.target_successes {
            self.status = ExtendedStatus::Succeeded;
        } else if self.rounds_completed >= self.max_rounds {
            self.status = ExtendedStatus::Failed;
        }
        Ok(())
    }

    /// Give up on the check.
    pub fn abandon(&mut self) -> MechResult<()> {
        self.ensure_active()?;
        self.status = ExtendedStatus::Abandoned;
        tracing::info!(
            check = %self.id,
            accumulated = self.accumulated_successes,
            target = self.target_successes,
            "extended check abandoned"
        );
        Ok(())
    }

    fn ensure_active(&self) -> MechResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(MechError::ExtendedCheckInactive {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }
}

/// Roll one round of an extended check for an actor.
pub fn perform_round<R: Rng>(
    state: &mut ExtendedCheckState,
    actor: &dyn SkillActor,
    context: Option<&SkillContext>,
    advantage: Advantage,
    config: &ExtendedCheckConfig,
    rng: &mut R,
) -> MechResult<SkillCheckResult> {
    state.ensure_active()?;
    let request = CheckRequest::for_actor(actor, &state.skill_id, 0)
        .with_context(context.cloned().unwrap_or_default())
        .with_advantage(advantage);
    let check = perform_check(&request, rng);
    state.apply_round(&check, config)?;

    tracing::debug!(
        check = %state.id,
        round = state.rounds_completed,
        net = check.net_successes,
        fumble = check.roll.is_fumble(),
        accumulated = state.accumulated_successes,
        target = state.target_successes,
        "extended check round"
    );
    if !state.is_active() {
        tracing::info!(
            check = %state.id,
            status = %state.status,
            rounds = state.rounds_completed,
            fumbles = state.total_fumbles,
            "extended check finished"
        );
    }
    Ok(check)
}
