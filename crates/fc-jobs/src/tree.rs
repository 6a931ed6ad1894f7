//! Job trees and their lifecycle status.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::Workflow;

/// Stable identifier of one enqueued job tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobTreeId(Uuid);

impl JobTreeId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobTreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a job tree. Terminal states are Finished and Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl TreeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TreeStatus::Finished | TreeStatus::Failed)
    }
}

/// One enqueued workflow with its output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTree {
    pub id: JobTreeId,
    pub workflow: Workflow,
    pub out_dir: PathBuf,
}

impl JobTree {
    pub fn new(workflow: Workflow, out_dir: PathBuf) -> Self {
        Self {
            id: JobTreeId::random(),
            workflow,
            out_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Stage;

    #[test]
    fn ids_are_unique() {
        let a = JobTree::new(Workflow::new(vec![Stage::EnergyPlus]), PathBuf::from("a"));
        let b = JobTree::new(Workflow::new(vec![Stage::EnergyPlus]), PathBuf::from("b"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn terminal_states() {
        assert!(!TreeStatus::Queued.is_terminal());
        assert!(!TreeStatus::Running.is_terminal());
        assert!(TreeStatus::Finished.is_terminal());
        assert!(TreeStatus::Failed.is_terminal());
    }
}
