use super::{PersistedState, StateStore};
use crate::error::{FolderTagError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// In-memory state store for tests.
///
/// Clones share the same slot, so a test can keep a handle after giving the
/// store to [`crate::api::TaggerApi`] and inspect what was saved.
#[derive(Clone, Default)]
pub struct MemStateStore {
    state: Rc<RefCell<PersistedState>>,
    saves: Rc<Cell<usize>>,
    simulate_write_error: Rc<Cell<bool>>,
}

impl MemStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        let store = Self::default();
        *store.state.borrow_mut() = state;
        store
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn saved(&self) -> PersistedState {
        self.state.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl StateStore for MemStateStore {
    fn load(&self) -> Result<PersistedState> {
        Ok(self.state.borrow().clone())
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(FolderTagError::Store("Simulated write error".to_string()));
        }
        *self.state.borrow_mut() = state.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let handle = MemStateStore::new();
        let mut store = handle.clone();
        let mut state = PersistedState::default();
        state.settings.inherit_depth = 3;
        store.save(&state).unwrap();
        assert_eq!(handle.saved().settings.inherit_depth, 3);
        assert_eq!(handle.save_count(), 1);
    }

    #[test]
    fn test_simulated_write_error() {
        let mut store = MemStateStore::new();
        store.set_simulate_write_error(true);
        assert!(store.save(&PersistedState::default()).is_err());
        assert_eq!(store.save_count(), 0);
    }
}
