//! Simulation caching and estimation engine for fuelcast.
//!
//! This crate ties the workspace together:
//! - requests are deduplicated by the exact pair of variable vectors
//! - each unique request fans out into a three-tier job cascade
//!   (estimation / full / radiance) through the fc-jobs substrate
//! - completed results are ingested into per-bucket error estimation and
//!   merged by per-tier confidence, never by completion order
//! - callers are never blocked: every read returns the current best answer
//!   with a confidence tag

pub mod engine;
pub mod error;
pub mod model;
pub mod tier;

// Re-export key types for convenience
pub use engine::{EngineConfig, FuelUsesOptions, SimulationEngine};
pub use error::{EngineError, EngineResult};
pub use model::{MODEL_FILE_NAME, SimModel};
pub use tier::{
    PARAM_CONTINUOUS_VARS, PARAM_DISCRETE_VARS, PARAM_RUN_TYPE, PARAM_SIMULATION_ID,
    PARAM_WEATHER_FILE, RunTier,
};
