//! Filesystem-backed state store.

use crate::errors::StateError;
use crate::state::StateStore;
use crate::workspace::Workspace;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_FILE_NAME: &str = "options.json";

/// Stores one JSON options file per workspace on local disk.
///
/// Layout: `<workspace root>/<workspace id>/options.json`. Because the
/// workspace id is part of the path, concurrent invocations on distinct
/// workspaces write to disjoint files with no extra locking.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    file_name: String,
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl FileStateStore {
    /// Creates a store using the default options file name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the options file name within each workspace directory.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    fn options_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.state_dir().join(&self.file_name)
    }
}

impl StateStore for FileStateStore {
    fn save(&self, workspace: &Workspace, options: &serde_json::Value) -> Result<(), StateError> {
        let dir = workspace.state_dir();
        fs::create_dir_all(&dir)
            .map_err(|source| StateError::persistence(workspace.id(), source))?;

        let encoded = serde_json::to_vec_pretty(options)
            .map_err(|source| StateError::serialization(workspace.id(), source))?;

        let path = self.options_path(workspace);
        fs::write(&path, encoded)
            .map_err(|source| StateError::persistence(workspace.id(), source))?;

        debug!(workspace = workspace.id(), path = %path.display(), "saved options");
        Ok(())
    }

    fn load(&self, workspace: &Workspace) -> Result<serde_json::Value, StateError> {
        let path = self.options_path(workspace);
        if !path.exists() {
            return Err(StateError::not_found(workspace.id()));
        }

        let bytes =
            fs::read(&path).map_err(|source| StateError::persistence(workspace.id(), source))?;
        serde_json::from_slice(&bytes)
            .map_err(|source| StateError::serialization(workspace.id(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStoreExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path(), "ws1");
        let store = FileStateStore::new();

        let options = serde_json::json!({"resource_prefix": "arcci4k2x9", "location": "canadacentral"});
        store.save(&workspace, &options).unwrap();

        assert_eq!(store.load(&workspace).unwrap(), options);
    }

    #[test]
    fn test_load_before_save_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path(), "ws1");
        let store = FileStateStore::new();

        let err = store.load(&workspace).unwrap_err();
        assert!(matches!(err, StateError::NotFound { .. }));
    }

    #[test]
    fn test_save_overwrites_prior_value() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path(), "ws1");
        let store = FileStateStore::new();

        store.save(&workspace, &serde_json::json!({"v": 1})).unwrap();
        store.save(&workspace, &serde_json::json!({"v": 2})).unwrap();

        assert_eq!(store.load(&workspace).unwrap(), serde_json::json!({"v": 2}));
    }

    #[test]
    fn test_fresh_store_instance_sees_saved_options() {
        // A later process invocation constructs its own store; only the
        // workspace coordinates are shared.
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path(), "ws1");

        FileStateStore::new()
            .save_options(&workspace, &serde_json::json!({"unique_id": "4k2x9z"}))
            .unwrap();

        let loaded: serde_json::Value =
            FileStateStore::new().load_options(&workspace).unwrap();
        assert_eq!(loaded["unique_id"], "4k2x9z");
    }

    #[test]
    fn test_workspaces_do_not_cross_talk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new();
        let a = Workspace::new(dir.path(), "run-a");
        let b = Workspace::new(dir.path(), "run-b");

        store.save(&a, &serde_json::json!({"run": "a"})).unwrap();
        store.save(&b, &serde_json::json!({"run": "b"})).unwrap();

        assert_eq!(store.load(&a).unwrap(), serde_json::json!({"run": "a"}));
        assert_eq!(store.load(&b).unwrap(), serde_json::json!({"run": "b"}));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path(), "ws1");
        let store = FileStateStore::new();

        fs::create_dir_all(workspace.state_dir()).unwrap();
        fs::write(workspace.state_dir().join("options.json"), b"not json").unwrap();

        let err = store.load(&workspace).unwrap_err();
        assert!(matches!(err, StateError::Serialization { .. }));
    }
}
