//! Result-reader seam.
//!
//! The engine never interprets result artifacts itself; it reads fuel-use
//! totals through a [`FuelUseReader`]. The shipped implementation understands
//! the flat JSON summary written by stage runners. A reader for a different
//! artifact format (an EnergyPlus SQL output, say) plugs in as another
//! implementation without touching the engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fc_core::{FuelType, FuelUses};

use crate::error::{ResultsError, ResultsResult};

/// Name of the summary artifact inside a run's output directory.
pub const SUMMARY_FILE_NAME: &str = "results.json";

/// Reads per-fuel energy totals out of a completed run's artifact.
pub trait FuelUseReader: Send + Sync {
    fn read(&self, path: &Path) -> ResultsResult<FuelUses>;
}

/// On-disk form of the fuel-use summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FuelUseSummary {
    fuel_uses_j: BTreeMap<FuelType, f64>,
}

/// Reader for the JSON summary artifact.
#[derive(Debug, Clone, Default)]
pub struct JsonSummaryReader;

impl FuelUseReader for JsonSummaryReader {
    fn read(&self, path: &Path) -> ResultsResult<FuelUses> {
        if !path.exists() {
            return Err(ResultsError::ResultNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let summary: FuelUseSummary =
            serde_json::from_str(&content).map_err(|e| ResultsError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut uses = FuelUses::new(0.0);
        for (fuel, value) in summary.fuel_uses_j {
            uses.add_use(fuel, value);
        }
        Ok(uses)
    }
}

/// Write a fuel-use summary artifact. Used by stage runners and tests.
pub fn write_summary(path: &Path, uses: &FuelUses) -> ResultsResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let summary = FuelUseSummary {
        fuel_uses_j: uses.iter().collect(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(path, json)?;
    Ok(())
}
