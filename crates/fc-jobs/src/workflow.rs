//! Workflow descriptions.
//!
//! A workflow is an ordered list of named stages plus a string key/value
//! parameter map. Parameters travel with the job into the persistent job
//! database, so whatever enqueued the workflow can recover its own tags when
//! the tree completes (or when it is replayed after a restart).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named workflow stages, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    ModelToIdf,
    ExpandObjects,
    Daylighting,
    EnergyPlus,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ModelToIdf => "model_to_idf",
            Stage::ExpandObjects => "expand_objects",
            Stage::Daylighting => "daylighting",
            Stage::EnergyPlus => "energyplus",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key/value tags attached to a workflow.
pub type JobParams = BTreeMap<String, String>;

/// An ordered stage list with parameters and a parallelism hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub stages: Vec<Stage>,
    pub params: JobParams,
    pub parallelism: usize,
}

impl Workflow {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            params: JobParams::new(),
            parallelism: 1,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
