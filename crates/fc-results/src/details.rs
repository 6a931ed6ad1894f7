//! Best-known outcome per simulation request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Confidence and result location of the best completed run for one request.
///
/// Upgraded only when a completing source's confidence exceeds the stored
/// one; completion order never decides which result wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDetails {
    pub confidence: f64,
    pub result_path: Option<PathBuf>,
}

impl SimulationDetails {
    pub fn new(confidence: f64, result_path: PathBuf) -> Self {
        Self {
            confidence,
            result_path: Some(result_path),
        }
    }

    /// Replace the stored details iff `other` carries strictly higher
    /// confidence. Returns whether the upgrade happened.
    pub fn upgrade(&mut self, other: &SimulationDetails) -> bool {
        if other.confidence > self.confidence {
            *self = other.clone();
            true
        } else {
            false
        }
    }
}
