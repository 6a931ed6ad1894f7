//! Simulation request keys.
//!
//! A request is identified by the exact pair (continuous variables, discrete
//! variables). Continuous variables are compared bit-for-bit through
//! [`f64::total_cmp`], so the keys are totally ordered even for NaN and keep
//! -0.0 distinct from 0.0. The canonical byte encoding exists only to derive
//! deterministic on-disk names; equality always goes through the key types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An ordered vector of continuous design variables, usable as a map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariablePoint(Vec<f64>);

impl VariablePoint {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<f64>> for VariablePoint {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for VariablePoint {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl PartialEq for VariablePoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VariablePoint {}

impl PartialOrd for VariablePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariablePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

/// Cache key for one simulation request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub continuous: VariablePoint,
    pub discrete: Vec<i32>,
}

/// Canonical encoding version, bumped whenever the byte layout changes.
pub const KEY_ENCODING_VERSION: u8 = 1;

impl RequestKey {
    pub fn new(continuous: impl Into<VariablePoint>, discrete: Vec<i32>) -> Self {
        Self {
            continuous: continuous.into(),
            discrete,
        }
    }

    /// Versioned little-endian byte encoding of both vectors.
    ///
    /// Used only for deriving deterministic cache-directory names, never for
    /// equality comparisons.
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(1 + 8 + self.continuous.len() * 8 + self.discrete.len() * 4);
        out.push(KEY_ENCODING_VERSION);
        out.extend_from_slice(&(self.continuous.len() as u32).to_le_bytes());
        for v in self.continuous.iter() {
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        out.extend_from_slice(&(self.discrete.len() as u32).to_le_bytes());
        for d in &self.discrete {
            out.extend_from_slice(&d.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn points_order_totally() {
        let a = VariablePoint::new(vec![1.0, 2.0]);
        let b = VariablePoint::new(vec![1.0, 3.0]);
        let c = VariablePoint::new(vec![1.0, 2.0]);
        assert!(a < b);
        assert_eq!(a, c);
    }

    #[test]
    fn nan_is_a_usable_key() {
        let mut set = BTreeSet::new();
        set.insert(VariablePoint::new(vec![f64::NAN]));
        set.insert(VariablePoint::new(vec![f64::NAN]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn negative_zero_is_distinct() {
        let a = VariablePoint::new(vec![0.0]);
        let b = VariablePoint::new(vec![-0.0]);
        assert_ne!(a, b);
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        let a = VariablePoint::new(vec![1.0]);
        let b = VariablePoint::new(vec![1.0, 0.0]);
        assert!(a < b);
    }

    #[test]
    fn encoding_is_stable_and_sensitive() {
        let key = RequestKey::new(vec![1.0, 2.5], vec![3, -1]);
        let same = RequestKey::new(vec![1.0, 2.5], vec![3, -1]);
        assert_eq!(key.encode(), same.encode());

        let other = RequestKey::new(vec![1.0, 2.5], vec![3, 0]);
        assert_ne!(key.encode(), other.encode());

        assert_eq!(key.encode()[0], KEY_ENCODING_VERSION);
    }
}
