//! Run tiers of the simulation cascade.
//!
//! Every unique request fans out into three workflow variants that differ in
//! fidelity and cost. Completion order across tiers is not guaranteed; the
//! per-tier confidence decides which result wins, never arrival order.

use fc_jobs::Stage;

/// Job-parameter key carrying the tier name.
pub const PARAM_RUN_TYPE: &str = "run_type";
/// Job-parameter key carrying the JSON-encoded continuous variable vector.
pub const PARAM_CONTINUOUS_VARS: &str = "continuous_vars";
/// Job-parameter key carrying the JSON-encoded discrete variable vector.
pub const PARAM_DISCRETE_VARS: &str = "discrete_vars";
/// Job-parameter key carrying the caller-supplied simulation id, if any.
pub const PARAM_SIMULATION_ID: &str = "simulation_id";
/// Job-parameter key carrying the weather file path, if any.
pub const PARAM_WEATHER_FILE: &str = "weather_file";

/// One fidelity level of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTier {
    /// Simplified model, minimal parallelism. Cheap and early.
    Estimation,
    /// Unmodified model.
    Full,
    /// Unmodified model plus the daylighting sub-workflow. Highest fidelity.
    Radiance,
}

impl RunTier {
    pub const ALL: [RunTier; 3] = [RunTier::Estimation, RunTier::Full, RunTier::Radiance];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunTier::Estimation => "estimation",
            RunTier::Full => "full",
            RunTier::Radiance => "radiance",
        }
    }

    pub fn parse(s: &str) -> Option<RunTier> {
        match s {
            "estimation" => Some(RunTier::Estimation),
            "full" => Some(RunTier::Full),
            "radiance" => Some(RunTier::Radiance),
            _ => None,
        }
    }

    /// Source confidence attached to this tier's results. Callers recognize
    /// a fully converged request by the radiance value.
    pub fn confidence(&self) -> f64 {
        match self {
            RunTier::Estimation => 0.75,
            RunTier::Full => 0.9,
            RunTier::Radiance => 1.0,
        }
    }

    pub fn parallelism(&self) -> usize {
        match self {
            RunTier::Estimation => 1,
            RunTier::Full | RunTier::Radiance => 4,
        }
    }

    pub fn stages(&self) -> Vec<Stage> {
        match self {
            RunTier::Estimation | RunTier::Full => {
                vec![Stage::ModelToIdf, Stage::ExpandObjects, Stage::EnergyPlus]
            }
            RunTier::Radiance => vec![
                Stage::ModelToIdf,
                Stage::ExpandObjects,
                Stage::Daylighting,
                Stage::EnergyPlus,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_names_roundtrip() {
        for tier in RunTier::ALL {
            assert_eq!(RunTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(RunTier::parse("unknown"), None);
    }

    #[test]
    fn radiance_is_the_highest_confidence() {
        for tier in RunTier::ALL {
            assert!(tier.confidence() <= RunTier::Radiance.confidence());
        }
    }

    #[test]
    fn only_radiance_carries_daylighting() {
        assert!(RunTier::Radiance.stages().contains(&Stage::Daylighting));
        assert!(!RunTier::Full.stages().contains(&Stage::Daylighting));
        assert!(!RunTier::Estimation.stages().contains(&Stage::Daylighting));
    }
}
