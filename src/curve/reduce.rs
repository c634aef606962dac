//! Lossless keyframe reduction.
//!
//! The baking pipeline treats reduction as a black-box contract: a pure,
//! deterministic function of `(curve, tolerance)` that returns an equivalent
//! curve with redundant interior keyframes removed. [`LinearReducer`] is the
//! default implementation; callers can substitute their own.

use super::keyframe::{Curve, Keyframe};

/// Lossless curve-reduction contract.
///
/// Implementations must be pure and deterministic: the same input curve and
/// tolerance always yield the same output, and sampling the output curve
/// must match the input within the tolerance.
pub trait CurveReducer {
    /// Reduce a curve, removing keyframes that carry no information beyond
    /// `tolerance`.
    fn reduce(&self, curve: &Curve, tolerance: f32) -> Curve;
}

/// Default reducer: drops interior keyframes that lie on the straight line
/// between their surviving neighbors, within tolerance. Endpoints are always
/// kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearReducer;

impl CurveReducer for LinearReducer {
    fn reduce(&self, curve: &Curve, tolerance: f32) -> Curve {
        let keys = curve.keys();
        if keys.len() <= 2 {
            return curve.clone();
        }

        let mut kept: Vec<Keyframe> = Vec::with_capacity(keys.len());
        kept.push(keys[0]);
        for i in 1..keys.len() - 1 {
            let prev = kept[kept.len() - 1];
            let cur = keys[i];
            let next = keys[i + 1];

            let dt = next.time - prev.time;
            let predicted = if dt <= 0.0 {
                prev.value
            } else {
                let t = ((cur.time - prev.time) / dt) as f32;
                prev.value + (next.value - prev.value) * t
            };

            if (cur.value - predicted).abs() > tolerance {
                kept.push(cur);
            }
        }
        kept.push(keys[keys.len() - 1]);

        Curve::from_keys(kept)
    }
}
