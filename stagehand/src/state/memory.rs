//! In-memory state store for tests and single-process embedding.

use crate::errors::StateError;
use crate::state::StateStore;
use crate::workspace::Workspace;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Keeps option blobs in process memory, keyed by workspace id.
///
/// Offers no durability across invocations; use [`super::FileStateStore`]
/// for anything a later process needs to resume from.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of workspaces with saved options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no workspace has saved options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn save(&self, workspace: &Workspace, options: &serde_json::Value) -> Result<(), StateError> {
        self.entries
            .write()
            .insert(workspace.id().to_string(), options.clone());
        Ok(())
    }

    fn load(&self, workspace: &Workspace) -> Result<serde_json::Value, StateError> {
        self.entries
            .read()
            .get(workspace.id())
            .cloned()
            .ok_or_else(|| StateError::not_found(workspace.id()))
    }
}
