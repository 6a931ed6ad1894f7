//! Job-execution substrate for fuelcast.
//!
//! Provides:
//! - workflow descriptions (named stages + string parameters)
//! - a persistent job database (one manifest per tree, scanned for replay)
//! - a worker-pool queue with per-tree completion notifications
//!
//! The substrate knows nothing about estimation or fuel uses; it executes
//! whatever stage list it is handed and reports terminal status.

pub mod db;
pub mod error;
pub mod queue;
pub mod tree;
pub mod workflow;

pub use db::{JobDb, TreeManifest};
pub use error::{JobsError, JobsResult};
pub use queue::{JobQueue, QueueStats, StageRunner};
pub use tree::{JobTree, JobTreeId, TreeStatus};
pub use workflow::{JobParams, Stage, Workflow};
