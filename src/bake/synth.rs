//! Curve Synthesizer: pose sample series to per-channel keyframe curves.
//!
//! Each of the four pose channel groups (position, rotation, scale,
//! activity) gets one constancy decision for the whole group: if every
//! sample's group fields equal the first sample's, no curve is emitted for
//! any channel in the group. Otherwise one curve per channel is built
//! through the pose codec.

use tracing::debug;

use crate::curve::{codec, ChannelGroup, Curve, PoseSample};

use super::set::CurveSet;

/// Check whether a sample's group-relevant fields equal the reference's.
fn group_equal(reference: &PoseSample, sample: &PoseSample, group: ChannelGroup) -> bool {
    match group {
        ChannelGroup::Position => reference.position == sample.position,
        ChannelGroup::Rotation => reference.rotation == sample.rotation,
        ChannelGroup::Scale => reference.scale == sample.scale,
        ChannelGroup::Activity => reference.enabled == sample.enabled,
    }
}

/// Convert one node's pose series into 0-11 channel curves, inserting them
/// into the working set under the node's `path`.
///
/// Duplicate bindings are an integrity error handled by the set: the
/// existing curve is kept and the new one dropped.
pub fn synthesize(path: &str, series: &[PoseSample], out: &mut CurveSet) {
    if series.is_empty() {
        return;
    }
    let first = &series[0];

    for group in ChannelGroup::ALL {
        let constant = series.iter().all(|s| group_equal(first, s, group));
        if constant {
            continue;
        }
        for channel in group.channels() {
            let mut curve = Curve::new();
            for sample in series {
                curve.push(sample.time, codec::decode(sample, channel));
            }
            out.insert(codec::channel_binding(path, channel), curve);
        }
    }
    debug!(path, samples = series.len(), "synthesized pose curves");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Binding, TargetKind, TRANSFORM_BEHAVIOR};

    fn series(len: usize) -> Vec<PoseSample> {
        (0..len).map(|i| PoseSample::identity(i as f64 * 0.1)).collect()
    }

    #[test]
    fn test_all_constant_yields_no_curves() {
        let mut set = CurveSet::new();
        synthesize("Arm", &series(10), &mut set);
        assert!(set.is_empty());
    }

    #[test]
    fn test_single_rotation_change_yields_four_rotation_curves() {
        let mut s = series(10);
        s[5].rotation = crate::util::Quat::from_xyzw(0.0, 0.1, 0.0, 0.995);

        let mut set = CurveSet::new();
        synthesize("Arm", &s, &mut set);

        assert_eq!(set.len(), 4, "exactly the rotation group is emitted");
        for suffix in ["x", "y", "z", "w"] {
            let b = Binding::behavior("Arm", TRANSFORM_BEHAVIOR, format!("localRotation.{suffix}"));
            let curve = set.get(&b).expect("rotation channel missing");
            assert_eq!(curve.len(), 10, "one key per sample");
        }
    }

    #[test]
    fn test_activity_change_emits_node_bound_curve() {
        let mut s = series(4);
        s[2].enabled = false;

        let mut set = CurveSet::new();
        synthesize("Arm", &s, &mut set);

        assert_eq!(set.len(), 1);
        let b = Binding::node("Arm", "active");
        let curve = set.get(&b).expect("activity curve missing");
        assert_eq!(
            curve.keys().iter().map(|k| k.value).collect::<Vec<_>>(),
            vec![1.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(b.target, TargetKind::Node);
    }

    #[test]
    fn test_position_change_emits_three_curves_with_sample_times() {
        let mut s = series(3);
        s[1].position.y = 2.0;

        let mut set = CurveSet::new();
        synthesize("", &s, &mut set);

        assert_eq!(set.len(), 3);
        let b = Binding::behavior("", TRANSFORM_BEHAVIOR, "localPosition.y");
        let curve = set.get(&b).unwrap();
        let times: Vec<_> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.1, 0.2]);
        assert_eq!(curve.keys()[1].value, 2.0);
    }

    #[test]
    fn test_empty_series_is_a_no_op() {
        let mut set = CurveSet::new();
        synthesize("Arm", &[], &mut set);
        assert!(set.is_empty());
    }
}
