//! Confidence-ranked error estimation across result sources.
//!
//! One `ErrorEstimation` owns a family of [`LinearApproximation`] models, one
//! per (source name, fuel type), plus a confidence weight per source. Sources
//! must be registered with [`ErrorEstimation::set_confidence`] before their
//! observations are accepted; there is no implicit default weight.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use fc_core::{FuelType, FuelUses, ensure_dimension};

use crate::error::{ApproxError, ApproxResult};
use crate::linear::LinearApproximation;

/// Per-source fuel-use models with confidence-ranked merging.
#[derive(Debug, Clone)]
pub struct ErrorEstimation {
    num_variables: usize,
    confidences: BTreeMap<String, f64>,
    models: BTreeMap<(String, FuelType), LinearApproximation>,
}

impl ErrorEstimation {
    pub fn new(num_variables: usize) -> ApproxResult<Self> {
        // Surface the dimensionality error here rather than on first add.
        LinearApproximation::new(num_variables)?;
        Ok(Self {
            num_variables,
            confidences: BTreeMap::new(),
            models: BTreeMap::new(),
        })
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Register (or update) the confidence weight of a source.
    pub fn set_confidence(&mut self, source: &str, confidence: f64) {
        self.confidences.insert(source.to_string(), confidence);
    }

    /// Confidence of a registered source. Unregistered sources are an error.
    pub fn confidence(&self, source: &str) -> ApproxResult<f64> {
        self.confidences
            .get(source)
            .copied()
            .ok_or_else(|| ApproxError::UnknownSource {
                name: source.to_string(),
            })
    }

    pub fn validate_num_variables(&self, variables: &[f64]) -> ApproxResult<()> {
        ensure_dimension("variable vector", self.num_variables, variables.len())?;
        Ok(())
    }

    /// Ingest one observation from `source` at `variables`.
    ///
    /// Each fuel type's value is fed into the model keyed by (source, fuel).
    /// The returned fuel uses are the observation corrected by the
    /// discrepancy between this source's approximation and the
    /// highest-confidence source's approximation at the same point, where
    /// both can evaluate; fuel types without a comparable model pass through
    /// unchanged. The returned confidence is the source's registered weight.
    pub fn add(
        &mut self,
        observation: &FuelUses,
        source: &str,
        variables: &[f64],
    ) -> ApproxResult<FuelUses> {
        self.validate_num_variables(variables)?;
        let source_confidence = self.confidence(source)?;

        for (fuel, value) in observation.iter() {
            let model = match self.models.entry((source.to_string(), fuel)) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(LinearApproximation::new(self.num_variables)?),
            };
            model.add_vals(variables, value)?;
        }

        let mut corrected = FuelUses::new(source_confidence);
        let best_source = self.best_source();
        for (fuel, value) in observation.iter() {
            let adjustment = match &best_source {
                Some(best) if best != source => {
                    let best_approx = self.try_approximate(best, fuel, variables);
                    let own_approx = self.try_approximate(source, fuel, variables);
                    match (best_approx, own_approx) {
                        (Some(b), Some(o)) => b - o,
                        _ => 0.0,
                    }
                }
                _ => 0.0,
            };
            corrected.add_use(fuel, value + adjustment);
        }
        Ok(corrected)
    }

    /// Evaluate the best-known fuel uses at `variables` without adding data.
    ///
    /// Each fuel type is served by the highest-confidence source holding a
    /// usable model for it; sources are never blended within one fuel type.
    /// The returned confidence is the minimum across the sources consulted.
    pub fn approximate(&self, variables: &[f64]) -> ApproxResult<FuelUses> {
        self.validate_num_variables(variables)?;
        if self.models.is_empty() {
            return Err(ApproxError::NoObservations);
        }

        let ranked = self.sources_by_confidence();
        let mut fuels: Vec<FuelType> = self.models.keys().map(|(_, fuel)| *fuel).collect();
        fuels.sort();
        fuels.dedup();

        let mut uses = FuelUses::new(0.0);
        let mut confidence: Option<f64> = None;
        for fuel in fuels {
            for (source, source_confidence) in &ranked {
                if let Some(value) = self.try_approximate(source, fuel, variables) {
                    uses.add_use(fuel, value);
                    confidence = Some(match confidence {
                        Some(c) => c.min(*source_confidence),
                        None => *source_confidence,
                    });
                    break;
                }
            }
        }

        if let Some(confidence) = confidence {
            uses.set_confidence(confidence);
            Ok(uses)
        } else {
            Err(ApproxError::NoObservations)
        }
    }

    fn try_approximate(&self, source: &str, fuel: FuelType, variables: &[f64]) -> Option<f64> {
        self.models
            .get(&(source.to_string(), fuel))
            .and_then(|model| model.approximate(variables).ok())
    }

    /// Registered sources sorted by descending confidence, name as tiebreak.
    fn sources_by_confidence(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .confidences
            .iter()
            .map(|(name, c)| (name.clone(), *c))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    fn best_source(&self) -> Option<String> {
        self.sources_by_confidence()
            .into_iter()
            .next()
            .map(|(name, _)| name)
    }
}
