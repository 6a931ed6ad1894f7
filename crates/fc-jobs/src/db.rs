//! Persistent job database.
//!
//! One manifest file per job tree, written on enqueue and on every status
//! change. The database is what survives a process restart: finished trees
//! found here are replayed by the engine to rebuild its in-memory estimation
//! state without re-running anything.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JobsError, JobsResult};
use crate::tree::{JobTree, JobTreeId, TreeStatus};
use crate::workflow::{JobParams, Stage};

/// Persisted record of one job tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeManifest {
    pub id: JobTreeId,
    pub status: TreeStatus,
    pub stages: Vec<Stage>,
    pub params: JobParams,
    pub parallelism: usize,
    pub out_dir: PathBuf,
    pub updated_at: String,
}

impl TreeManifest {
    pub fn from_tree(tree: &JobTree, status: TreeStatus) -> Self {
        Self {
            id: tree.id,
            status,
            stages: tree.workflow.stages.clone(),
            params: tree.workflow.params.clone(),
            parallelism: tree.workflow.parallelism,
            out_dir: tree.out_dir.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// On-disk job records under `<root>/jobs/<tree-id>/manifest.json`.
#[derive(Debug, Clone)]
pub struct JobDb {
    root_dir: PathBuf,
}

impl JobDb {
    pub fn open(root_dir: &Path) -> JobsResult<Self> {
        let root_dir = root_dir.join("jobs");
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn manifest_path(&self, id: JobTreeId) -> PathBuf {
        self.root_dir.join(id.to_string()).join("manifest.json")
    }

    pub fn save(&self, manifest: &TreeManifest) -> JobsResult<()> {
        let path = self.manifest_path(manifest.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(&self, id: JobTreeId) -> JobsResult<TreeManifest> {
        let path = self.manifest_path(id);
        if !path.exists() {
            return Err(JobsError::TreeNotFound { id });
        }
        let content = fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn set_status(&self, tree: &JobTree, status: TreeStatus) -> JobsResult<()> {
        self.save(&TreeManifest::from_tree(tree, status))
    }

    /// All persisted manifests, in directory order.
    pub fn list(&self) -> JobsResult<Vec<TreeManifest>> {
        let mut manifests = Vec::new();
        if !self.root_dir.exists() {
            return Ok(manifests);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let manifest_path = entry.path().join("manifest.json");
            if !manifest_path.exists() {
                continue;
            }
            let content = fs::read_to_string(manifest_path)?;
            if let Ok(manifest) = serde_json::from_str::<TreeManifest>(&content) {
                manifests.push(manifest);
            }
        }
        Ok(manifests)
    }

    /// Manifests of trees that ran to successful completion.
    pub fn finished_trees(&self) -> JobsResult<Vec<TreeManifest>> {
        let mut finished: Vec<TreeManifest> = self
            .list()?
            .into_iter()
            .filter(|m| m.status == TreeStatus::Finished)
            .collect();
        // Directory order is arbitrary; replay in a stable order.
        finished.sort_by_key(|m| m.id);
        Ok(finished)
    }
}
