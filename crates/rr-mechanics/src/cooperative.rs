//! Cooperative checks: several actors working on one task.
//!
//! Four composition rules are supported:
//!
//! - **Weakest link**: the least capable participant rolls alone.
//! - **Best attempt**: everyone rolls; the best net result stands.
//! - **Combined**: everyone rolls; net successes are pooled.
//! - **Assisted**: helpers roll first to earn bonus dice for the primary.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MechanicsConfig;
use crate::context::{SituationalModifier, SkillContext};
use crate::error::{MechError, MechResult};
use crate::resolution::{CheckRequest, SkillCheckResult, SkillOutcome, perform_check};
use crate::sheet::SkillActor;

/// How individual efforts combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooperationType {
    /// The smallest pool rolls for the group.
    WeakestLink,
    /// The highest net result counts.
    BestAttempt,
    /// Net successes are summed.
    Combined,
    /// Helpers grant bonus dice to a primary roller.
    Assisted,
}

impl CooperationType {
    /// Parse from a CLI tag such as `weakest-link` or `assisted`.
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "weakest-link" | "weakest" => Some(Self::WeakestLink),
            "best-attempt" | "best" => Some(Self::BestAttempt),
            "combined" => Some(Self::Combined),
            "assisted" | "assist" => Some(Self::Assisted),
            _ => None,
        }
    }
}

impl std::fmt::Display for CooperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeakestLink => write!(f, "Weakest Link"),
            Self::BestAttempt => write!(f, "Best Attempt"),
            Self::Combined => write!(f, "Combined"),
            Self::Assisted => write!(f, "Assisted"),
        }
    }
}

/// One actor taking part in a cooperative check.
#[derive(Clone, Copy)]
pub struct Participant<'a> {
    /// The actor.
    pub actor: &'a dyn SkillActor,
    /// The actor's own modifiers, if any.
    pub context: Option<&'a SkillContext>,
}

impl<'a> Participant<'a> {
    /// A participant with no modifiers.
    pub fn new(actor: &'a dyn SkillActor) -> Self {
        Self {
            actor,
            context: None,
        }
    }

    /// A participant with their own modifiers.
    pub fn with_context(actor: &'a dyn SkillActor, context: &'a SkillContext) -> Self {
        Self {
            actor,
            context: Some(context),
        }
    }

    fn request(&self, skill_id: &str, difficulty_class: i32) -> CheckRequest {
        let request = CheckRequest::for_actor(self.actor, skill_id, difficulty_class);
        match self.context {
            Some(context) => request.with_context(context.clone()),
            None => request,
        }
    }

    fn pool_size(&self, skill_id: &str) -> u32 {
        self.request(skill_id, 0).effective_pool().size()
    }
}

impl std::fmt::Debug for Participant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("actor", &self.actor.id())
            .field("context", &self.context)
            .finish()
    }
}

/// What a helper managed on an assisted check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperContribution {
    /// Helper id.
    pub helper_id: String,
    /// Net successes on the helper's roll against DC 0.
    pub net_successes: i32,
    /// Whether the helper earned the primary a bonus die.
    pub granted_bonus: bool,
}

/// The combined result of a cooperative check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooperativeCheckResult {
    /// Composition rule used.
    pub cooperation_type: CooperationType,
    /// Skill tested.
    pub skill_id: String,
    /// Difficulty class the group faced.
    pub difficulty_class: i32,
    /// Everyone who took part, in order.
    pub participant_ids: Vec<String>,
    /// The checks that count toward the result.
    pub individual_results: Vec<SkillCheckResult>,
    /// Final outcome tier.
    pub outcome: SkillOutcome,
    /// Final net successes.
    pub net_successes: i32,
    /// Who made the deciding roll, if a single actor did.
    pub active_roller_id: Option<String>,
    /// Participants credited with the result.
    pub contributing_participants: Vec<String>,
    /// Helper rolls on an assisted check.
    pub helper_contributions: Vec<HelperContribution>,
}

impl CooperativeCheckResult {
    /// Marginal success or better.
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Critical failure.
    pub fn is_fumble(&self) -> bool {
        self.outcome.is_fumble()
    }

    /// Net successes minus DC.
    pub fn margin(&self) -> i32 {
        self.net_successes - self.difficulty_class
    }
}

/// Resolves cooperative checks.
#[derive(Debug, Clone)]
pub struct CooperativeResolver {
    assist_threshold: i32,
}

impl Default for CooperativeResolver {
    fn default() -> Self {
        Self::new(&MechanicsConfig::default())
    }
}

impl CooperativeResolver {
    /// Create a resolver using the config's assist threshold.
    pub fn new(config: &MechanicsConfig) -> Self {
        Self {
            assist_threshold: config.assist_threshold,
        }
    }

    /// Net successes a helper needs to grant a bonus die.
    pub fn assist_threshold(&self) -> i32 {
        self.assist_threshold
    }

    /// Resolve a cooperative check.
    pub fn resolve<R: Rng>(
        &self,
        participants: &[Participant<'_>],
        skill_id: &str,
        difficulty_class: i32,
        cooperation_type: CooperationType,
        rng: &mut R,
    ) -> MechResult<CooperativeCheckResult> {
        if participants.is_empty() {
            return Err(MechError::NoParticipants);
        }

        let mut result = match cooperation_type {
            CooperationType::WeakestLink => {
                weakest_link(participants, skill_id, difficulty_class, rng)
            }
            CooperationType::BestAttempt => {
                best_attempt(participants, skill_id, difficulty_class, rng)
            }
            CooperationType::Combined => combined(participants, skill_id, difficulty_class, rng),
            CooperationType::Assisted => {
                self.assisted(participants, skill_id, difficulty_class, rng)
            }
        };
        result.participant_ids = participants
            .iter()
            .map(|p| p.actor.id().to_string())
            .collect();

        tracing::debug!(
            skill = skill_id,
            mode = %cooperation_type,
            participants = participants.len(),
            net = result.net_successes,
            outcome = %result.outcome,
            "cooperative check resolved"
        );
        Ok(result)
    }

    fn assisted<R: Rng>(
        &self,
        participants: &[Participant<'_>],
        skill_id: &str,
        difficulty_class: i32,
        rng: &mut R,
    ) -> CooperativeCheckResult {
        let primary = participants[0];
        let mut contributors = vec![primary.actor.id().to_string()];
        let mut contributions = Vec::with_capacity(participants.len().saturating_sub(1));

        for helper in &participants[1..] {
            let help = perform_check(&helper.request(skill_id, 0), rng);
            let granted_bonus = help.net_successes >= self.assist_threshold;
            if granted_bonus {
                contributors.push(helper.actor.id().to_string());
            }
            contributions.push(HelperContribution {
                helper_id: helper.actor.id().to_string(),
                net_successes: help.net_successes,
                granted_bonus,
            });
        }

        let bonus = contributions.iter().filter(|c| c.granted_bonus).count() as i32;
        let mut context = primary.context.cloned().unwrap_or_default();
        if bonus > 0 {
            context = context.with_situational(SituationalModifier::assisted(bonus, "party members"));
        }
        let request = CheckRequest::for_actor(primary.actor, skill_id, difficulty_class)
            .with_context(context);
        let check = perform_check(&request, rng);

        tracing::debug!(
            primary = primary.actor.id(),
            bonus_dice = bonus,
            "assisted check helpers rolled"
        );

        CooperativeCheckResult {
            cooperation_type: CooperationType::Assisted,
            skill_id: skill_id.to_string(),
            difficulty_class,
            participant_ids: Vec::new(),
            outcome: check.outcome,
            net_successes: check.net_successes,
            active_roller_id: Some(primary.actor.id().to_string()),
            contributing_participants: contributors,
            helper_contributions: contributions,
            individual_results: vec![check],
        }
    }
}

fn single_roller(
    cooperation_type: CooperationType,
    roller: &Participant<'_>,
    check: SkillCheckResult,
    individual_results: Vec<SkillCheckResult>,
    difficulty_class: i32,
) -> CooperativeCheckResult {
    CooperativeCheckResult {
        cooperation_type,
        skill_id: check.skill_id.clone(),
        difficulty_class,
        participant_ids: Vec::new(),
        individual_results,
        outcome: check.outcome,
        net_successes: check.net_successes,
        active_roller_id: Some(roller.actor.id().to_string()),
        contributing_participants: vec![roller.actor.id().to_string()],
        helper_contributions: Vec::new(),
    }
}

fn weakest_link<R: Rng>(
    participants: &[Participant<'_>],
    skill_id: &str,
    difficulty_class: i32,
    rng: &mut R,
) -> CooperativeCheckResult {
    // min_by_key keeps the first of equal minima.
    let weakest = participants
        .iter()
        .min_by_key(|p| p.pool_size(skill_id))
        .unwrap_or(&participants[0]);
    let check = perform_check(&weakest.request(skill_id, difficulty_class), rng);
    single_roller(
        CooperationType::WeakestLink,
        weakest,
        check.clone(),
        vec![check],
        difficulty_class,
    )
}

fn best_attempt<R: Rng>(
    participants: &[Participant<'_>],
    skill_id: &str,
    difficulty_class: i32,
    rng: &mut R,
) -> CooperativeCheckResult {
    let results: Vec<SkillCheckResult> = participants
        .iter()
        .map(|p| perform_check(&p.request(skill_id, difficulty_class), rng))
        .collect();

    let mut best = 0;
    for (i, r) in results.iter().enumerate().skip(1) {
        if r.net_successes > results[best].net_successes {
            best = i;
        }
    }

    single_roller(
        CooperationType::BestAttempt,
        &participants[best],
        results[best].clone(),
        results,
        difficulty_class,
    )
}

fn combined<R: Rng>(
    participants: &[Participant<'_>],
    skill_id: &str,
    difficulty_class: i32,
    rng: &mut R,
) -> CooperativeCheckResult {
    let results: Vec<SkillCheckResult> = participants
        .iter()
        .map(|p| perform_check(&p.request(skill_id, difficulty_class), rng))
        .collect();
    let net_successes: i32 = results.iter().map(|r| r.net_successes).sum();
    let contributors = participants
        .iter()
        .zip(&results)
        .filter(|(_, r)| r.net_successes > 0)
        .map(|(p, _)| p.actor.id().to_string())
        .collect();

    CooperativeCheckResult {
        cooperation_type: CooperationType::Combined,
        skill_id: skill_id.to_string(),
        difficulty_class,
        participant_ids: Vec::new(),
        individual_results: results,
        outcome: SkillOutcome::classify(net_successes, difficulty_class),
        net_successes,
        active_roller_id: None,
        contributing_participants: contributors,
        helper_contributions: Vec::new(),
    }
}
