//! Fuel-use value types.
//!
//! A [`FuelUses`] maps fuel type to an energy quantity in joules and carries a
//! single confidence scalar describing how much the holder trusts the values.
//! Arithmetic combines the value maps key-wise; confidence is never combined
//! automatically and must be set explicitly by the caller.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Div, DivAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::units::{Energy, j};

/// Fuel categories tracked in simulation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Electricity,
    Gas,
    Propane,
    FuelOil,
    DistrictHeating,
    DistrictCooling,
    Steam,
    Water,
}

impl FuelType {
    pub const ALL: [FuelType; 8] = [
        FuelType::Electricity,
        FuelType::Gas,
        FuelType::Propane,
        FuelType::FuelOil,
        FuelType::DistrictHeating,
        FuelType::DistrictCooling,
        FuelType::Steam,
        FuelType::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Electricity => "electricity",
            FuelType::Gas => "gas",
            FuelType::Propane => "propane",
            FuelType::FuelOil => "fuel_oil",
            FuelType::DistrictHeating => "district_heating",
            FuelType::DistrictCooling => "district_cooling",
            FuelType::Steam => "steam",
            FuelType::Water => "water",
        }
    }
}

/// A single fuel's energy use, in joules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelUse {
    pub fuel: FuelType,
    pub value_j: f64,
}

impl FuelUse {
    pub fn new(fuel: FuelType, value_j: f64) -> Self {
        Self { fuel, value_j }
    }

    pub fn energy(&self) -> Energy {
        j(self.value_j)
    }
}

/// Per-fuel energy totals (joules) with one confidence tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelUses {
    uses_j: BTreeMap<FuelType, f64>,
    confidence: f64,
}

impl FuelUses {
    pub fn new(confidence: f64) -> Self {
        Self {
            uses_j: BTreeMap::new(),
            confidence,
        }
    }

    /// Accumulate `value_j` joules onto `fuel`.
    pub fn add_use(&mut self, fuel: FuelType, value_j: f64) {
        *self.uses_j.entry(fuel).or_insert(0.0) += value_j;
    }

    pub fn with_use(mut self, fuel: FuelType, value_j: f64) -> Self {
        self.add_use(fuel, value_j);
        self
    }

    /// Energy recorded for `fuel`, in joules. Absent fuel types read as 0.0.
    pub fn fuel_use(&self, fuel: FuelType) -> f64 {
        self.uses_j.get(&fuel).copied().unwrap_or(0.0)
    }

    pub fn energy(&self, fuel: FuelType) -> Energy {
        j(self.fuel_use(fuel))
    }

    pub fn fuel_types(&self) -> impl Iterator<Item = FuelType> + '_ {
        self.uses_j.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FuelType, f64)> + '_ {
        self.uses_j.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.uses_j.is_empty()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = confidence;
    }

    /// Sum over all recorded fuel types, in joules.
    pub fn sum(&self) -> f64 {
        self.uses_j.values().sum()
    }

    /// Mean over recorded fuel types, 0.0 when nothing is recorded.
    pub fn average(&self) -> f64 {
        if self.uses_j.is_empty() {
            0.0
        } else {
            self.sum() / self.uses_j.len() as f64
        }
    }

    /// Mean of absolute values over recorded fuel types.
    pub fn absolute_average(&self) -> f64 {
        if self.uses_j.is_empty() {
            0.0
        } else {
            self.uses_j.values().map(|v| v.abs()).sum::<f64>() / self.uses_j.len() as f64
        }
    }
}

impl AddAssign<&FuelUses> for FuelUses {
    fn add_assign(&mut self, rhs: &FuelUses) {
        for (fuel, value) in rhs.iter() {
            self.add_use(fuel, value);
        }
    }
}

impl SubAssign<&FuelUses> for FuelUses {
    fn sub_assign(&mut self, rhs: &FuelUses) {
        for (fuel, value) in rhs.iter() {
            self.add_use(fuel, -value);
        }
    }
}

impl DivAssign<f64> for FuelUses {
    fn div_assign(&mut self, rhs: f64) {
        for value in self.uses_j.values_mut() {
            *value /= rhs;
        }
    }
}

impl Add<&FuelUses> for FuelUses {
    type Output = FuelUses;

    fn add(mut self, rhs: &FuelUses) -> FuelUses {
        self += rhs;
        self
    }
}

impl Sub<&FuelUses> for FuelUses {
    type Output = FuelUses;

    fn sub(mut self, rhs: &FuelUses) -> FuelUses {
        self -= rhs;
        self
    }
}

impl Div<f64> for FuelUses {
    type Output = FuelUses;

    fn div(mut self, rhs: f64) -> FuelUses {
        self /= rhs;
        self
    }
}

impl AddAssign<FuelUse> for FuelUses {
    fn add_assign(&mut self, rhs: FuelUse) {
        self.add_use(rhs.fuel, rhs.value_j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fuel_type_reads_zero() {
        let uses = FuelUses::new(1.0).with_use(FuelType::Gas, 10.0);
        assert_eq!(uses.fuel_use(FuelType::Electricity), 0.0);
        assert_eq!(uses.fuel_use(FuelType::Gas), 10.0);
    }

    #[test]
    fn subtraction_treats_missing_as_zero() {
        let a = FuelUses::new(1.0)
            .with_use(FuelType::Gas, 10.0)
            .with_use(FuelType::Electricity, 5.0);
        let b = FuelUses::new(1.0).with_use(FuelType::Gas, 3.0);

        let diff = a - &b;
        assert_eq!(diff.fuel_use(FuelType::Gas), 7.0);
        assert_eq!(diff.fuel_use(FuelType::Electricity), 5.0);
    }

    #[test]
    fn addition_unions_keys() {
        let a = FuelUses::new(0.5).with_use(FuelType::Gas, 1.0);
        let b = FuelUses::new(0.9).with_use(FuelType::Electricity, 2.0);

        let total = a + &b;
        assert_eq!(total.fuel_use(FuelType::Gas), 1.0);
        assert_eq!(total.fuel_use(FuelType::Electricity), 2.0);
        // Confidence is caller-managed, not combined.
        assert_eq!(total.confidence(), 0.5);
    }

    #[test]
    fn scalar_division() {
        let mut uses = FuelUses::new(1.0)
            .with_use(FuelType::Gas, 8.0)
            .with_use(FuelType::Electricity, 4.0);
        uses /= 2.0;
        assert_eq!(uses.fuel_use(FuelType::Gas), 4.0);
        assert_eq!(uses.fuel_use(FuelType::Electricity), 2.0);
    }

    #[test]
    fn reductions() {
        let uses = FuelUses::new(1.0)
            .with_use(FuelType::Gas, -6.0)
            .with_use(FuelType::Electricity, 2.0);
        assert_eq!(uses.sum(), -4.0);
        assert_eq!(uses.average(), -2.0);
        assert_eq!(uses.absolute_average(), 4.0);

        let empty = FuelUses::new(0.0);
        assert_eq!(empty.sum(), 0.0);
        assert_eq!(empty.average(), 0.0);
    }

    #[test]
    fn serde_roundtrip() {
        let uses = FuelUses::new(0.75)
            .with_use(FuelType::Gas, 123.0)
            .with_use(FuelType::DistrictHeating, 4.5);
        let json = serde_json::to_string(&uses).expect("serialize");
        assert!(json.contains("district_heating"));
        let back: FuelUses = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, uses);
    }
}
