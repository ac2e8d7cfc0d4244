//! Workspace identity scoping one pipeline invocation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 6;

/// Identifier and filesystem root scoping one execution of a pipeline.
///
/// The workspace id is embedded in every persistence key and every
/// provisioned-resource name, so concurrent invocations on distinct
/// workspaces never cross-talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    id: String,
    root: PathBuf,
}

impl Workspace {
    /// Creates a workspace with a caller-chosen id under `root`.
    pub fn new(root: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
        }
    }

    /// Creates a workspace whose id is `prefix` plus a fresh unique suffix.
    ///
    /// One of these is created per top-level run, so that re-provisioned
    /// resources and remote state keys never collide with a parallel run.
    pub fn with_unique_id(root: impl Into<PathBuf>, prefix: &str) -> Self {
        Self::new(root, format!("{prefix}{}", unique_id()))
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the filesystem root the workspace lives under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding this workspace's durable state.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(&self.id)
    }

    /// Prefixes a resource name with the workspace id.
    ///
    /// Stage bodies use this when naming externally provisioned resources.
    #[must_use]
    pub fn scoped_name(&self, name: &str) -> String {
        format!("{}-{}", self.id, name)
    }
}

/// Generates a short lowercase alphanumeric suffix.
///
/// Six characters is enough to keep concurrent invocations against one
/// backend from colliding.
#[must_use]
pub fn unique_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unique_id_shape() {
        let id = unique_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_unique_ids_differ() {
        // Not a proof, but two collisions in a row would be suspicious.
        let a = unique_id();
        let b = unique_id();
        let c = unique_id();
        assert!(a != b || b != c);
    }

    #[test]
    fn test_with_unique_id_keeps_prefix() {
        let ws = Workspace::with_unique_id("/tmp/runs", "ci");
        assert!(ws.id().starts_with("ci"));
        assert_eq!(ws.id().len(), 2 + ID_LEN);
    }

    #[test]
    fn test_state_dir_is_scoped_by_id() {
        let ws = Workspace::new("/tmp/runs", "ci4k2x9");
        assert_eq!(ws.state_dir(), PathBuf::from("/tmp/runs/ci4k2x9"));
    }

    #[test]
    fn test_scoped_name() {
        let ws = Workspace::new("/tmp/runs", "ci4k2x9");
        assert_eq!(ws.scoped_name("aks"), "ci4k2x9-aks");
    }

    #[test]
    fn test_workspace_serializes() {
        let ws = Workspace::new("/tmp/runs", "ws1");
        let json = serde_json::to_string(&ws).unwrap();
        let restored: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ws);
    }
}
