//! Multivariate affine approximation from sparse observations.
//!
//! The model is anchored at the first recorded observation (the baseline) and
//! keeps one finite-difference slope per variable dimension. Each new
//! observation updates the slopes of every dimension in which it differs from
//! the nearest previously recorded point. Evaluation is a plain affine sum
//! over the baseline, so dimensions never observed contribute nothing.
//!
//! An observation that varies several dimensions at once attributes its full
//! value delta to each differing dimension independently. That is a
//! simplification, not a least-squares fit; slopes are only exact when
//! observations vary one dimension at a time.

use nalgebra::DVector;

use fc_core::{CoreError, ensure_dimension, ensure_finite};

use crate::error::{ApproxError, ApproxResult};

#[derive(Debug, Clone)]
struct Observation {
    point: DVector<f64>,
    value: f64,
}

/// Affine interpolator over a fixed number of continuous variables.
#[derive(Debug, Clone)]
pub struct LinearApproximation {
    num_variables: usize,
    observations: Vec<Observation>,
    slopes: Vec<Option<f64>>,
}

impl LinearApproximation {
    /// Create a model of fixed dimensionality. Zero dimensions is rejected.
    pub fn new(num_variables: usize) -> ApproxResult<Self> {
        if num_variables == 0 {
            return Err(CoreError::InvalidArg {
                what: "num_variables must be positive",
            }
            .into());
        }
        Ok(Self {
            num_variables,
            observations: Vec::new(),
            slopes: vec![None; num_variables],
        })
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    /// Record an observation at `variables`.
    ///
    /// The first call establishes the baseline. Later calls update the slope
    /// of every dimension in which `variables` differs from the nearest
    /// previously recorded point: `(value - ref_value) / (x_i - ref_x_i)`.
    pub fn add_vals(&mut self, variables: &[f64], value: f64) -> ApproxResult<()> {
        ensure_dimension("observation point", self.num_variables, variables.len())?;
        for &v in variables {
            ensure_finite(v, "observation coordinate")?;
        }
        ensure_finite(value, "observation value")?;

        let point = DVector::from_column_slice(variables);

        if let Some(reference) = self.nearest_observation(&point) {
            let reference = reference.clone();
            for i in 0..self.num_variables {
                let dx = point[i] - reference.point[i];
                if dx != 0.0 {
                    self.slopes[i] = Some((value - reference.value) / dx);
                }
            }
        }

        self.observations.push(Observation { point, value });
        Ok(())
    }

    /// Evaluate the model at `variables`.
    ///
    /// Returns the baseline value plus the slope contribution of every
    /// dimension with a recorded slope. Fails when nothing has been recorded.
    pub fn approximate(&self, variables: &[f64]) -> ApproxResult<f64> {
        ensure_dimension("evaluation point", self.num_variables, variables.len())?;

        let baseline = self.observations.first().ok_or(ApproxError::NoObservations)?;

        let mut value = baseline.value;
        for i in 0..self.num_variables {
            if let Some(slope) = self.slopes[i] {
                value += slope * (variables[i] - baseline.point[i]);
            }
        }
        Ok(value)
    }

    fn nearest_observation(&self, point: &DVector<f64>) -> Option<&Observation> {
        let mut best: Option<(&Observation, f64)> = None;
        for obs in &self.observations {
            let d2 = (point - &obs.point).norm_squared();
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((obs, d2));
            }
        }
        best.map(|(obs, _)| obs)
    }
}
