//! Durable persistence of inter-stage options.
//!
//! A stage run in one process invocation saves its options here so that a
//! later, independent invocation (e.g. a later CI stage with a fresh
//! process) can load them back and resume where the previous one left off.

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::InMemoryStateStore;

use crate::errors::StateError;
use crate::workspace::Workspace;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Durable store for per-workspace option blobs.
///
/// The blob is opaque to the store: whatever one stage needs to hand to a
/// later one, such as provisioning variables or computed unique
/// identifiers. The store is the only component that mutates persisted
/// options.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send + Sync {
    /// Persists `options` under the workspace, replacing any prior value.
    fn save(&self, workspace: &Workspace, options: &serde_json::Value) -> Result<(), StateError>;

    /// Loads the options previously saved for the workspace.
    ///
    /// Fails with [`StateError::NotFound`] if nothing was ever saved.
    /// Callers must treat that as a fatal ordering bug, never default it.
    fn load(&self, workspace: &Workspace) -> Result<serde_json::Value, StateError>;
}

/// Typed convenience layer over the opaque blob API.
pub trait StateStoreExt: StateStore {
    /// Serializes and persists a typed options value.
    fn save_options<T: Serialize>(
        &self,
        workspace: &Workspace,
        options: &T,
    ) -> Result<(), StateError> {
        let value = serde_json::to_value(options)
            .map_err(|source| StateError::serialization(workspace.id(), source))?;
        self.save(workspace, &value)
    }

    /// Loads and deserializes a typed options value.
    fn load_options<T: DeserializeOwned>(&self, workspace: &Workspace) -> Result<T, StateError> {
        let value = self.load(workspace)?;
        serde_json::from_value(value)
            .map_err(|source| StateError::serialization(workspace.id(), source))
    }
}

impl<S: StateStore + ?Sized> StateStoreExt for S {}
