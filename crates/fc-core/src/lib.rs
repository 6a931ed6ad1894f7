//! fc-core: stable foundation for fuelcast.
//!
//! Contains:
//! - fuel (fuel types + per-fuel energy maps with confidence tags)
//! - key (simulation request keys over exact float vectors)
//! - numeric (Real + tolerances + float helpers)
//! - units (uom SI types + constructors)
//! - error (shared error types)

pub mod error;
pub mod fuel;
pub mod key;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use fuel::{FuelType, FuelUse, FuelUses};
pub use key::{KEY_ENCODING_VERSION, RequestKey, VariablePoint};
pub use numeric::*;
pub use units::*;
