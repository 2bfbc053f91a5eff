//! Chained checks: multi-step procedures with per-step retry budgets.
//!
//! A chain is a sequence of independent skill checks (bypass the alarm, pick
//! the lock, crack the safe). Each step must succeed before the next is
//! attempted; a failed step can be retried while its budget lasts.
//!
//! ```text
//!   InProgress --fail, retries left--> AwaitingRetry --retry ok--> InProgress
//!       |                                   |
//!       +--fail, none left--> Failed <------+ retry fails, none left
//!       +--last step ok-----> Succeeded
//!   (any non-terminal) --abandon--> Abandoned
//! ```

pub mod repository;
pub mod service;

pub use repository::{ChainRepository, InMemoryChainRepository, sort_oldest_first};
pub use service::{ChainedCheckProcessResult, ChainedCheckService};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::SkillContext;
use crate::resolution::SkillOutcome;

/// One step of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    /// Step identifier.
    pub step_id: String,
    /// Display name used in messages.
    pub name: String,
    /// Skill tested by this step.
    pub skill_id: String,
    /// Difficulty class before context adjustments.
    pub difficulty_class: i32,
    /// How many times a failure may be retried.
    #[serde(default)]
    pub max_retries: u32,
    /// Modifiers used when the caller supplies none.
    #[serde(default)]
    pub context: Option<SkillContext>,
    /// Message shown on success instead of the stock text.
    #[serde(default)]
    pub success_message: Option<String>,
    /// Message shown on failure instead of the stock text.
    #[serde(default)]
    pub failure_message: Option<String>,
}

impl ChainStep {
    /// A step with no retries and no messages.
    pub fn new(
        step_id: impl Into<String>,
        name: impl Into<String>,
        skill_id: impl Into<String>,
        difficulty_class: i32,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            name: name.into(),
            skill_id: skill_id.into(),
            difficulty_class,
            max_retries: 0,
            context: None,
            success_message: None,
            failure_message: None,
        }
    }

    /// Set the retry budget.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the default modifiers.
    pub fn with_context(mut self, context: SkillContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Set custom success and failure messages.
    pub fn with_messages(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_message = Some(success.into());
        self.failure_message = Some(failure.into());
        self
    }
}

/// Where a chain stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainStatus {
    /// Ready to attempt the current step.
    InProgress,
    /// The current step failed; waiting for a retry or abandon.
    AwaitingRetry,
    /// Every step succeeded.
    Succeeded,
    /// A step failed with no retries left.
    Failed,
    /// Given up by the caller.
    Abandoned,
}

impl ChainStatus {
    /// Succeeded, Failed or Abandoned.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Abandoned)
    }
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::AwaitingRetry => write!(f, "AwaitingRetry"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// A recorded attempt at one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAttempt {
    /// Index of the step attempted.
    pub step_index: usize,
    /// Outcome tier.
    pub outcome: SkillOutcome,
    /// Net successes rolled.
    pub net_successes: i32,
    /// Whether this attempt spent a retry.
    pub was_retry: bool,
    /// When the attempt was made.
    pub at: DateTime<Utc>,
}

/// Persisted state of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedCheckState {
    /// Chain id, `chain-<uuid>`.
    pub id: String,
    /// Character working the chain.
    pub character_id: String,
    /// Display name used in messages.
    pub chain_name: String,
    /// What the chain is aimed at, if anything.
    pub target_id: Option<String>,
    /// Steps in order.
    pub steps: Vec<ChainStep>,
    /// Index of the step to attempt next.
    pub current_step_index: usize,
    /// Retries left per step.
    pub retries_remaining: Vec<u32>,
    /// Current status.
    pub status: ChainStatus,
    /// Every attempt made so far.
    #[serde(default)]
    pub history: Vec<StepAttempt>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl ChainedCheckState {
    /// A fresh chain at step 0 with full retry budgets.
    pub fn new(
        character_id: impl Into<String>,
        chain_name: impl Into<String>,
        steps: Vec<ChainStep>,
        target_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("chain-{}", uuid::Uuid::new_v4().simple()),
            character_id: character_id.into(),
            chain_name: chain_name.into(),
            target_id,
            retries_remaining: steps.iter().map(|s| s.max_retries).collect(),
            steps,
            current_step_index: 0,
            status: ChainStatus::InProgress,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The step to attempt next, if the chain has not run past the end.
    pub fn current_step(&self) -> Option<&ChainStep> {
        self.steps.get(self.current_step_index)
    }

    /// Retries left on the current step.
    pub fn current_retries(&self) -> u32 {
        self.retries_remaining
            .get(self.current_step_index)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the chain has reached a terminal status.
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the chain still needs attention.
    pub fn is_active(&self) -> bool {
        !self.is_complete()
    }

    /// Number of steps.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chain_has_full_budgets() {
        let state = ChainedCheckState::new(
            "kael",
            "Vault Heist",
            vec![
                ChainStep::new("alarm", "Bypass Alarm", "tech", 2).with_retries(1),
                ChainStep::new("lock", "Pick Lock", "lockpicking", 3).with_retries(2),
            ],
            Some("vault-7".to_string()),
        );
        assert!(state.id.starts_with("chain-"));
        assert_eq!(state.id.len(), "chain-".len() + 32);
        assert_eq!(state.status, ChainStatus::InProgress);
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.retries_remaining, vec![1, 2]);
        assert_eq!(state.current_step().unwrap().name, "Bypass Alarm");
        assert_eq!(state.current_retries(), 1);
        assert!(state.is_active());
        assert_eq!(state.created_at, state.updated_at);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ChainStatus::InProgress.is_terminal());
        assert!(!ChainStatus::AwaitingRetry.is_terminal());
        assert!(ChainStatus::Succeeded.is_terminal());
        assert!(ChainStatus::Failed.is_terminal());
        assert!(ChainStatus::Abandoned.is_terminal());
    }

    #[test]
    fn step_json_defaults() {
        let step: ChainStep = serde_json::from_str(
            r#"{"step_id": "s1", "name": "Climb", "skill_id": "athletics", "difficulty_class": 2}"#,
        )
        .unwrap();
        assert_eq!(step.max_retries, 0);
        assert!(step.context.is_none());
        assert!(step.success_message.is_none());
    }

    #[test]
    fn state_survives_json() {
        let state = ChainedCheckState::new(
            "kael",
            "Climb",
            vec![ChainStep::new("s1", "Climb", "athletics", 2)],
            None,
        );
        let json = serde_json::to_string(&state).unwrap();
        let back: ChainedCheckState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
