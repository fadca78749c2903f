//! Difficulty curve
//!
//! Piecewise-linear mapping from session progress to difficulty. Both the
//! input and the output are clamped to [0, 1]. The curve does not have to be
//! monotonic.

use serde::{Deserialize, Serialize};

use crate::{clamp01, inverse_lerp, lerp};

/// Keyframes as `(progress, difficulty)` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct DifficultyCurve {
    keys: Vec<(f32, f32)>,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self::new(vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)])
    }
}

impl From<Vec<(f32, f32)>> for DifficultyCurve {
    fn from(keys: Vec<(f32, f32)>) -> Self {
        Self::new(keys)
    }
}

impl From<DifficultyCurve> for Vec<(f32, f32)> {
    fn from(curve: DifficultyCurve) -> Self {
        curve.keys
    }
}

impl DifficultyCurve {
    /// Build a curve; keys are sorted by progress and non-finite keys dropped
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.retain(|(x, y)| x.is_finite() && y.is_finite());
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// A curve that always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![(0.0, value)])
    }

    /// Straight line from 0 to 1
    pub fn linear() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    /// Difficulty at `progress`, both clamped to [0, 1]
    ///
    /// An empty curve evaluates to 0. Outside the first/last key the nearest
    /// key's value is held.
    pub fn evaluate(&self, progress: f32) -> f32 {
        let x = clamp01(progress);
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if x <= first.0 {
            return clamp01(first.1);
        }
        if x >= last.0 {
            return clamp01(last.1);
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x >= a.0 && x <= b.0 {
                let t = inverse_lerp(a.0, b.0, x);
                return clamp01(lerp(a.1, b.1, t));
            }
        }
        clamp01(last.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let curve = DifficultyCurve::default();
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.25).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.75).abs() < 1e-6);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_domain_and_range_clamped() {
        let curve = DifficultyCurve::new(vec![(0.0, -0.5), (0.5, 2.0), (1.0, 0.3)]);
        assert_eq!(curve.evaluate(-3.0), 0.0);
        assert_eq!(curve.evaluate(0.5), 1.0);
        assert!((curve.evaluate(7.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_unsorted_keys_are_sorted() {
        let curve = DifficultyCurve::new(vec![(1.0, 1.0), (0.0, 0.0)]);
        assert!((curve.evaluate(0.4) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_empty_and_constant() {
        assert_eq!(DifficultyCurve::new(Vec::new()).evaluate(0.5), 0.0);
        assert_eq!(DifficultyCurve::constant(0.7).evaluate(0.9), 0.7);
    }

    #[test]
    fn test_serde_as_pairs() {
        let curve: DifficultyCurve = serde_json::from_str("[[0.0, 0.2], [1.0, 0.8]]").unwrap();
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        let json = serde_json::to_string(&curve).unwrap();
        assert_eq!(json, "[[0.0,0.2],[1.0,0.8]]");
    }
}
