//! Estimation layer for fuelcast.
//!
//! This crate provides the numerical half of the simulation cache:
//! - a multivariate affine interpolator anchored at a baseline observation
//! - per-source, per-fuel-type model families with confidence-ranked merging

pub mod error;
pub mod estimation;
pub mod linear;

pub use error::{ApproxError, ApproxResult};
pub use estimation::ErrorEstimation;
pub use linear::LinearApproximation;
