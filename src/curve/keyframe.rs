//! Keyframes and curves.
//!
//! A [`Curve`] is an ordered sequence of `{time, value}` keyframes with
//! non-decreasing times. Curves are append-only during recording and
//! synthesis; the monotonic tick clock keeps them ordered by construction.

use crate::util::Chrono;

/// One keyframe: a value at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Time in seconds since recording start.
    pub time: Chrono,
    /// Channel value at that time.
    pub value: f32,
}

/// Ordered sequence of keyframes, time non-decreasing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Create an empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from keyframes. The keys must already be time-ordered.
    pub fn from_keys(keys: Vec<Keyframe>) -> Self {
        debug_assert!(
            keys.windows(2).all(|w| w[0].time <= w[1].time),
            "keyframes must be time-ordered"
        );
        Self { keys }
    }

    /// Append a keyframe. Time must not precede the last key's time.
    pub fn push(&mut self, time: Chrono, value: f32) {
        debug_assert!(
            self.keys.last().is_none_or(|k| k.time <= time),
            "keyframe times must be non-decreasing"
        );
        self.keys.push(Keyframe { time, value });
    }

    /// All keyframes in time order.
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the curve has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// First keyframe, if any.
    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.first()
    }

    /// Last keyframe, if any.
    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.last()
    }

    /// Check if every value lies within `tolerance` of the first value.
    ///
    /// Empty and single-key curves are constant.
    pub fn is_constant(&self, tolerance: f32) -> bool {
        match self.keys.first() {
            Some(first) => self
                .keys
                .iter()
                .all(|k| (k.value - first.value).abs() <= tolerance),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut c = Curve::new();
        assert!(c.is_empty());

        c.push(0.0, 1.0);
        c.push(0.1, 2.0);
        c.push(0.1, 2.5); // equal times are allowed
        c.push(0.2, 3.0);

        assert_eq!(c.len(), 4);
        assert!(c.keys().windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(c.first().unwrap().value, 1.0);
        assert_eq!(c.last().unwrap().value, 3.0);
    }

    #[test]
    fn test_constancy() {
        let mut c = Curve::new();
        assert!(c.is_constant(0.0), "empty curve is constant");

        c.push(0.0, 0.5);
        assert!(c.is_constant(0.0), "single key is constant");

        c.push(1.0, 0.5);
        assert!(c.is_constant(0.0));

        c.push(2.0, 0.5 + 1e-3);
        assert!(!c.is_constant(f32::EPSILON));
        assert!(c.is_constant(1e-2), "within a loose tolerance");
    }
}
