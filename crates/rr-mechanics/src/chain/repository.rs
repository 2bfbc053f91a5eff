//! Storage contract for chain state.

use std::collections::HashMap;

use crate::chain::ChainedCheckState;
use crate::error::{MechError, MechResult};

/// Where chain state lives between steps.
///
/// Implementations must be safe to call with one in-flight mutation per
/// chain id; the service does no locking of its own.
#[cfg_attr(test, mockall::automock)]
pub trait ChainRepository {
    /// Look up a chain by id.
    fn get_by_id(&self, id: &str) -> MechResult<Option<ChainedCheckState>>;

    /// Store a new chain.
    fn add(&mut self, state: ChainedCheckState) -> MechResult<()>;

    /// Replace a stored chain.
    fn update(&mut self, state: &ChainedCheckState) -> MechResult<()>;

    /// Non-terminal chains for a character.
    fn active_for_character(&self, character_id: &str) -> MechResult<Vec<ChainedCheckState>>;
}

/// Order chains oldest first, breaking ties on id.
pub fn sort_oldest_first(chains: &mut [ChainedCheckState]) {
    chains.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// A repository that keeps chains in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChainRepository {
    chains: HashMap<String, ChainedCheckState>,
}

impl InMemoryChainRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chains, terminal or not.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl ChainRepository for InMemoryChainRepository {
    fn get_by_id(&self, id: &str) -> MechResult<Option<ChainedCheckState>> {
        Ok(self.chains.get(id).cloned())
    }

    fn add(&mut self, state: ChainedCheckState) -> MechResult<()> {
        self.chains.insert(state.id.clone(), state);
        Ok(())
    }

    fn update(&mut self, state: &ChainedCheckState) -> MechResult<()> {
        match self.chains.get_mut(&state.id) {
            Some(slot) => {
                *slot = state.clone();
                Ok(())
            }
            None => Err(MechError::ChainNotFound(state.id.clone())),
        }
    }

    fn active_for_character(&self, character_id: &str) -> MechResult<Vec<ChainedCheckState>> {
        let mut active: Vec<_> = self
            .chains
            .values()
            .filter(|c| c.character_id == character_id && c.is_active())
            .cloned()
            .collect();
        sort_oldest_first(&mut active);
        Ok(active)
    }
}
