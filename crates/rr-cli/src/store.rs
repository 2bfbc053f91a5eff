//! Chain repository backed by a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rr_mechanics::{ChainRepository, ChainedCheckState, MechError, MechResult, sort_oldest_first};

/// Every chain lives in one JSON object keyed by chain id. Each write
/// rewrites the whole file.
pub struct JsonChainStore {
    path: PathBuf,
    chains: BTreeMap<String, ChainedCheckState>,
}

impl JsonChainStore {
    /// Open a store, starting empty if the file does not exist yet.
    pub fn open(path: &Path) -> MechResult<Self> {
        let chains: BTreeMap<String, ChainedCheckState> = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| MechError::Storage(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&text)
                .map_err(|e| MechError::Storage(format!("{}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), chains = chains.len(), "chain store opened");
        Ok(Self {
            path: path.to_path_buf(),
            chains,
        })
    }

    fn save(&self) -> MechResult<()> {
        let json = serde_json::to_string_pretty(&self.chains)
            .map_err(|e| MechError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| MechError::Storage(format!("{}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), chains = self.chains.len(), "chain store saved");
        Ok(())
    }
}

impl ChainRepository for JsonChainStore {
    fn get_by_id(&self, id: &str) -> MechResult<Option<ChainedCheckState>> {
        Ok(self.chains.get(id).cloned())
    }

    fn add(&mut self, state: ChainedCheckState) -> MechResult<()> {
        self.chains.insert(state.id.clone(), state);
        self.save()
    }

    fn update(&mut self, state: &ChainedCheckState) -> MechResult<()> {
        if !self.chains.contains_key(&state.id) {
            return Err(MechError::ChainNotFound(state.id.clone()));
        }
        self.chains.insert(state.id.clone(), state.clone());
        self.save()
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

#[cfg(test)]
mod tests {
    use rr_mechanics::{ChainStatus, ChainStep};
    use tempfile::TempDir;

    use super::*;

    fn chain(id: &str) -> ChainedCheckState {
        let mut state = ChainedCheckState::new(
            "kael",
            "Vault",
            vec![ChainStep::new("s1", "Pick Lock", "lockpicking", 5)],
            None,
        );
        state.id = id.to_string();
        state
    }

    #[test]
    fn chains_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chains.json");
        let mut store = JsonChainStore::open(&path).unwrap();
        let mut state = chain("chain-a");
        store.add(state.clone()).unwrap();
        state.status = ChainStatus::Abandoned;
        store.update(&state).unwrap();

        let reopened = JsonChainStore::open(&path).unwrap();
        assert_eq!(reopened.get_by_id("chain-a").unwrap(), Some(state));
    }

    #[test]
    fn active_chains_match_in_memory_order() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonChainStore::open(&dir.path().join("chains.json")).unwrap();
        let b = chain("chain-b");
        let mut a = b.clone();
        a.id = "chain-a".to_string();
        store.add(b).unwrap();
        store.add(a).unwrap();

        let ids: Vec<_> = store
            .active_for_character("kael")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["chain-a", "chain-b"]);
    }

    #[test]
    fn update_of_unknown_chain_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonChainStore::open(&dir.path().join("chains.json")).unwrap();
        let err = store.update(&chain("chain-x")).unwrap_err();
        assert!(matches!(err, MechError::ChainNotFound(_)));
    }

    #[test]
    fn unreadable_store_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chains.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonChainStore::open(&path), Err(MechError::Storage(_))));
    }
}
