//! The chain state machine.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chain::{ChainRepository, ChainStatus, ChainStep, ChainedCheckState, StepAttempt};
use crate::context::SkillContext;
use crate::error::{MechError, MechResult};
use crate::resolution::{CheckRequest, SkillCheckResult, perform_check};
use crate::sheet::SkillActor;

/// What happened when a step was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedCheckProcessResult {
    /// Chain state after the attempt.
    pub state: ChainedCheckState,
    /// The check that was rolled.
    pub step_result: SkillCheckResult,
    /// Whether the chain is now terminal.
    pub is_chain_complete: bool,
    /// Whether the attempt spent a retry.
    pub was_retry: bool,
    /// Narration for the attempt.
    pub message: String,
}

/// Drives chains through their steps, persisting every change.
#[derive(Debug)]
pub struct ChainedCheckService<S: ChainRepository> {
    store: S,
}

impl<S: ChainRepository> ChainedCheckService<S> {
    /// Create a service over a repository.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Start a new chain at its first step.
    pub fn start(
        &mut self,
        character_id: &str,
        chain_name: &str,
        steps: Vec<ChainStep>,
        target_id: Option<String>,
    ) -> MechResult<ChainedCheckState> {
        if steps.is_empty() {
            return Err(MechError::EmptyChain);
        }
        let state = ChainedCheckState::new(character_id, chain_name, steps, target_id);
        self.store.add(state.clone())?;
        tracing::info!(
            chain = %state.id,
            character = character_id,
            name = chain_name,
            steps = state.total_steps(),
            "chain started"
        );
        Ok(state)
    }

    /// Attempt the current step.
    ///
    /// The check uses `context_override` if given, otherwise the step's own
    /// context, otherwise no modifiers.
    pub fn process_step<R: Rng>(
        &mut self,
        actor: &dyn SkillActor,
        chain_id: &str,
        context_override: Option<&SkillContext>,
        rng: &mut R,
    ) -> MechResult<ChainedCheckProcessResult> {
        let state = self.load(chain_id)?;
        if state.is_complete() {
            return Err(MechError::ChainComplete {
                id: state.id,
                status: state.status,
            });
        }
        if state.status == ChainStatus::AwaitingRetry {
            return Err(MechError::AwaitingRetry(state.id));
        }
        self.attempt(state, actor, context_override, false, rng)
    }

    /// Spend one retry on the failed current step.
    pub fn retry_step<R: Rng>(
        &mut self,
        actor: &dyn SkillActor,
        chain_id: &str,
        context_override: Option<&SkillContext>,
        rng: &mut R,
    ) -> MechResult<ChainedCheckProcessResult> {
        let mut state = self.load(chain_id)?;
        if state.status != ChainStatus::AwaitingRetry {
            return Err(MechError::NotRetryable(state.id));
        }
        let index = state.current_step_index;
        match state.retries_remaining.get_mut(index) {
            Some(0) => return Err(MechError::NotRetryable(state.id)),
            Some(left) => *left -= 1,
            None => {
                return Err(MechError::CorruptChain {
                    id: state.id,
                    step: index,
                });
            }
        }
        self.attempt(state, actor, context_override, true, rng)
    }

    /// Give up on a chain that has not finished.
    pub fn abandon(&mut self, chain_id: &str) -> MechResult<ChainedCheckState> {
        let mut state = self.load(chain_id)?;
        if state.is_complete() {
            return Err(MechError::ChainComplete {
                id: state.id,
                status: state.status,
            });
        }
        state.status = ChainStatus::Abandoned;
        state.touch();
        self.store.update(&state)?;
        tracing::info!(chain = %state.id, "chain abandoned");
        Ok(state)
    }

    /// Look up a chain.
    pub fn get(&self, chain_id: &str) -> MechResult<Option<ChainedCheckState>> {
        self.store.get_by_id(chain_id)
    }

    /// Non-terminal chains for a character.
    pub fn active_for_character(&self, character_id: &str) -> MechResult<Vec<ChainedCheckState>> {
        self.store.active_for_character(character_id)
    }

    fn load(&self, chain_id: &str) -> MechResult<ChainedCheckState> {
        self.store
            .get_by_id(chain_id)?
            .ok_or_else(|| MechError::ChainNotFound(chain_id.to_string()))
    }

    fn attempt<R: Rng>(
        &mut self,
        mut state: ChainedCheckState,
        actor: &dyn SkillActor,
        context_override: Option<&SkillContext>,
        was_retry: bool,
        rng: &mut R,
    ) -> MechResult<ChainedCheckProcessResult> {
        let index = state.current_step_index;
        let step = state
            .current_step()
            .cloned()
            .ok_or_else(|| MechError::CorruptChain {
                id: state.id.clone(),
                step: index,
            })?;

        let context = context_override
            .cloned()
            .or_else(|| step.context.clone())
            .unwrap_or_default();
        let request = CheckRequest::for_actor(actor, &step.skill_id, step.difficulty_class)
            .with_context(context);
        let step_result = perform_check(&request, rng);

        state.history.push(StepAttempt {
            step_index: index,
            outcome: step_result.outcome,
            net_successes: step_result.net_successes,
            was_retry,
            at: chrono::Utc::now(),
        });

        let message = if step_result.is_success() {
            if index + 1 == state.steps.len() {
                state.status = ChainStatus::Succeeded;
                step.success_message.clone().unwrap_or_else(|| {
                    format!("{} succeeded. {} complete!", step.name, state.chain_name)
                })
            } else {
                state.current_step_index += 1;
                state.status = ChainStatus::InProgress;
                step.success_message
                    .clone()
                    .unwrap_or_else(|| format!("{} succeeded. Proceed to next step.", step.name))
            }
        } else {
            let retries = state.current_retries();
            if retries > 0 {
                state.status = ChainStatus::AwaitingRetry;
                step.failure_message.clone().unwrap_or_else(|| {
                    format!("{} failed. {retries} retry(ies) remaining.", step.name)
                })
            } else {
                state.status = ChainStatus::Failed;
                step.failure_message.clone().unwrap_or_else(|| {
                    format!("{} failed. {} cannot continue.", step.name, state.chain_name)
                })
            }
        };

        state.touch();
        self.store.update(&state)?;

        tracing::info!(
            chain = %state.id,
            step = %step.step_id,
            outcome = %step_result.outcome,
            status = %state.status,
            was_retry,
            "chain step resolved"
        );

        Ok(ChainedCheckProcessResult {
            is_chain_complete: state.is_complete(),
            state,
            step_result,
            was_retry,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::chain::InMemoryChainRepository;
    use crate::chain::repository::MockChainRepository;
    use crate::context::SituationalModifier;
    use crate::sheet::CharacterSheet;

    fn service() -> ChainedCheckService<InMemoryChainRepository> {
        ChainedCheckService::new(InMemoryChainRepository::new())
    }

    /// An untrained actor rolls a single die and can never reach DC 5.
    fn novice() -> CharacterSheet {
        CharacterSheet::new("kael")
    }

    /// Drops the DC far enough that any roll succeeds.
    fn sure_thing() -> SkillContext {
        SkillContext::new().with_situational(SituationalModifier::new(
            "easy", "Trivial", 0, -15, "gm",
        ))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_chain_is_rejected() {
        let err = service().start("kael", "Nothing", vec![], None).unwrap_err();
        assert!(matches!(err, MechError::EmptyChain));
    }

    #[test]
    fn start_stores_the_chain() {
        let mut svc = service();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Alarm", "tech", 2)],
                Some("vault".to_string()),
            )
            .unwrap();
        assert_eq!(svc.get(&state.id).unwrap(), Some(state.clone()));
        assert_eq!(svc.active_for_character("kael").unwrap().len(), 1);
        assert_eq!(state.target_id.as_deref(), Some("vault"));
    }

    #[test]
    fn failed_step_without_retries_fails_the_chain() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start("kael", "Vault", vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5)], None)
            .unwrap();

        let result = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();
        assert_eq!(result.state.status, ChainStatus::Failed);
        assert!(result.is_chain_complete);
        assert!(!result.was_retry);
        assert_eq!(result.message, "Pick Lock failed. Vault cannot continue.");

        let err = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(
            err,
            MechError::ChainComplete {
                status: ChainStatus::Failed,
                ..
            }
        ));
        assert!(svc.active_for_character("kael").unwrap().is_empty());
    }

    #[test]
    fn retry_rescues_a_failed_step() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(1)],
                None,
            )
            .unwrap();

        let first = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();
        assert_eq!(first.state.status, ChainStatus::AwaitingRetry);
        assert!(!first.is_chain_complete);
        assert_eq!(first.message, "Pick Lock failed. 1 retry(ies) remaining.");

        let retry = svc
            .retry_step(&actor, &state.id, Some(&sure_thing()), &mut rng())
            .unwrap();
        assert_eq!(retry.state.status, ChainStatus::Succeeded);
        assert!(retry.was_retry);
        assert!(retry.is_chain_complete);
        assert_eq!(retry.message, "Pick Lock succeeded. Vault complete!");
        assert_eq!(retry.state.retries_remaining, vec![0]);
        assert_eq!(retry.state.history.len(), 2);
        assert!(retry.state.history[1].was_retry);

        let err = svc.retry_step(&actor, &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::NotRetryable(_)));
    }

    #[test]
    fn process_while_awaiting_retry_is_rejected() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(2)],
                None,
            )
            .unwrap();
        svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();
        let err = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::AwaitingRetry(_)));
    }

    #[test]
    fn retry_without_failure_is_rejected() {
        let mut svc = service();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(2)],
                None,
            )
            .unwrap();
        let err = svc.retry_step(&novice(), &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::NotRetryable(_)));
    }

    #[test]
    fn exhausting_retries_fails_the_chain() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(1)],
                None,
            )
            .unwrap();
        svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();
        let retry = svc.retry_step(&actor, &state.id, None, &mut rng()).unwrap();
        assert_eq!(retry.state.status, ChainStatus::Failed);
        assert_eq!(retry.message, "Pick Lock failed. Vault cannot continue.");
    }

    #[test]
    fn success_advances_through_steps() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![
                    ChainStep::new("s1", "Bypass Alarm", "tech", 1),
                    ChainStep::new("s2", "Pick Lock", "lockpicking", 1)
                        .with_context(sure_thing())
                        .with_messages("The lock clicks open.", "The pick snaps."),
                ],
                None,
            )
            .unwrap();

        let first = svc
            .process_step(&actor, &state.id, Some(&sure_thing()), &mut rng())
            .unwrap();
        assert_eq!(first.state.status, ChainStatus::InProgress);
        assert_eq!(first.state.current_step_index, 1);
        assert_eq!(first.message, "Bypass Alarm succeeded. Proceed to next step.");

        // The step's own context applies when no override is given.
        let second = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();
        assert_eq!(second.state.status, ChainStatus::Succeeded);
        assert_eq!(second.message, "The lock clicks open.");
        assert_eq!(second.step_result.difficulty_class, -14);
    }

    #[test]
    fn custom_failure_message_is_used() {
        let mut svc = service();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5)
                    .with_messages("Open.", "The pick snaps.")],
                None,
            )
            .unwrap();
        let result = svc.process_step(&novice(), &state.id, None, &mut rng()).unwrap();
        assert_eq!(result.message, "The pick snaps.");
    }

    #[test]
    fn abandon_rules() {
        let mut svc = service();
        let actor = novice();
        let state = svc
            .start(
                "kael",
                "Vault",
                vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(1)],
                None,
            )
            .unwrap();
        svc.process_step(&actor, &state.id, None, &mut rng()).unwrap();

        let abandoned = svc.abandon(&state.id).unwrap();
        assert_eq!(abandoned.status, ChainStatus::Abandoned);

        let err = svc.abandon(&state.id).unwrap_err();
        assert!(matches!(
            err,
            MechError::ChainComplete {
                status: ChainStatus::Abandoned,
                ..
            }
        ));
        let err = svc.process_step(&actor, &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::ChainComplete { .. }));
        let err = svc.retry_step(&actor, &state.id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::NotRetryable(_)));
    }

    #[test]
    fn unknown_chain_is_not_found() {
        let mut svc = service();
        let err = svc
            .process_step(&novice(), "chain-nope", None, &mut rng())
            .unwrap_err();
        assert!(matches!(err, MechError::ChainNotFound(id) if id == "chain-nope"));
        assert!(matches!(svc.abandon("chain-nope"), Err(MechError::ChainNotFound(_))));
        assert_eq!(svc.get("chain-nope").unwrap(), None);
    }

    #[test]
    fn step_index_past_the_end_is_corrupt() {
        let mut repo = InMemoryChainRepository::new();
        let mut state = ChainedCheckState::new(
            "kael",
            "Vault",
            vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5).with_retries(1)],
            None,
        );
        state.current_step_index = 3;
        let id = state.id.clone();
        repo.add(state.clone()).unwrap();
        state.status = ChainStatus::AwaitingRetry;
        state.id = "chain-waiting".to_string();
        repo.add(state).unwrap();

        let mut svc = ChainedCheckService::new(repo);
        let err = svc.process_step(&novice(), &id, None, &mut rng()).unwrap_err();
        assert!(matches!(err, MechError::CorruptChain { step: 3, .. }));
        assert_eq!(err.to_string(), format!("chain {id} has no step 3"));

        let err = svc
            .retry_step(&novice(), "chain-waiting", None, &mut rng())
            .unwrap_err();
        assert!(matches!(err, MechError::CorruptChain { step: 3, .. }));
    }

    #[test]
    fn mocked_store_sees_update_after_step() {
        let stored = ChainedCheckState::new(
            "kael",
            "Vault",
            vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5)],
            None,
        );
        let chain_id = stored.id.clone();
        let expected = chain_id.clone();

        let mut mock = MockChainRepository::new();
        mock.expect_get_by_id()
            .withf(move |requested: &str| requested == expected)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        mock.expect_update()
            .withf(|state| state.status == ChainStatus::Failed && state.history.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        let mut svc = ChainedCheckService::new(mock);
        let result = svc
            .process_step(&novice(), &chain_id, None, &mut rng())
            .unwrap();
        assert!(result.is_chain_complete);
    }

    #[test]
    fn storage_errors_propagate() {
        let mut mock = MockChainRepository::new();
        mock.expect_add()
            .returning(|_| Err(MechError::Storage("disk full".to_string())));
        let mut svc = ChainedCheckService::new(mock);
        let err = svc
            .start("kael", "Vault", vec![ChainStep::new("s1", "A", "b", 1)], None)
            .unwrap_err();
        assert!(matches!(err, MechError::Storage(msg) if msg == "disk full"));
    }
}
