//! Curve Post-Processor.
//!
//! Runs over the unified binding→curve mapping after synthesis, in strict
//! order: sibling-group constant elimination, lossless reduction,
//! post-reduction constant elimination, proxy remapping, target resolution,
//! and aggregation onto the target nodes. Group decisions are made per
//! group over the full set, so processing order does not affect which
//! curves are retained.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::curve::{Curve, CurveReducer, GroupKey, TargetKind};
use crate::scene::{NodeId, SceneGraph};
use crate::util::{Error, Result};

use super::set::CurveSet;

/// Numeric tolerance used for reduction and constancy checks.
pub const BAKE_TOLERANCE: f32 = f32::EPSILON;

/// One finalized curve attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundCurve {
    /// Path of the binding, relative to the recorded root.
    pub path: String,
    /// Property name of the channel.
    pub property: String,
    /// Stable type name of the playback target.
    pub target_type: String,
    /// Reduced keyframe curve.
    pub curve: Curve,
}

/// Per-node collection of finalized curves, attached at bake time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackAggregate {
    pub curves: Vec<BoundCurve>,
}

/// Mapping from proxy behavior types to concrete playback types.
///
/// A proxy type only exists during capture; before persistence its bindings
/// are rewritten to the playback type it stands for.
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    map: HashMap<String, String>,
}

impl ProxyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proxy type and the playback type it maps to.
    pub fn register(&mut self, proxy: impl Into<String>, playback: impl Into<String>) {
        self.map.insert(proxy.into(), playback.into());
    }

    /// Check if a type name is a registered proxy.
    pub fn is_proxy(&self, type_name: &str) -> bool {
        self.map.contains_key(type_name)
    }

    /// Playback type for a proxy type, if registered.
    pub fn playback_type(&self, type_name: &str) -> Option<&str> {
        self.map.get(type_name).map(|s| s.as_str())
    }
}

/// Drop every channel group whose members are all constant.
///
/// A constant curve is only removed when all its group siblings are also
/// constant; partial constancy retains the whole group, since a consumer
/// expects a group's channels to be present together. Returns the number of
/// curves removed.
pub fn eliminate_constant_groups(set: &mut CurveSet, tolerance: f32) -> usize {
    let mut decided: HashSet<GroupKey> = HashSet::new();
    let mut to_remove = Vec::new();

    for id in set.ids() {
        let Some(entry) = set.entry(id) else { continue };
        let key = entry.binding.group_key();
        if !decided.insert(key.clone()) {
            continue;
        }
        let members = set.group_members(&key);
        let all_constant = members.iter().all(|&m| {
            set.entry(m)
                .map(|e| e.curve.is_constant(tolerance))
                .unwrap_or(true)
        });
        if all_constant {
            to_remove.extend(members);
        }
    }

    for id in &to_remove {
        set.remove(*id);
    }
    to_remove.len()
}

/// Run the full post-processing pass over the working set and attach the
/// results to their target nodes under `root`.
///
/// An unresolvable target is a structural error: the pass aborts and the
/// artifact is not marked complete.
pub fn post_process(
    mut set: CurveSet,
    scene: &mut SceneGraph,
    root: NodeId,
    proxies: &ProxyRegistry,
    reducer: &dyn CurveReducer,
) -> Result<()> {
    // 1. Pre-reduction group elimination.
    let dropped = eliminate_constant_groups(&mut set, BAKE_TOLERANCE);

    // 2. Lossless reduction of every surviving curve.
    for id in set.ids() {
        let reduced = match set.entry(id) {
            Some(entry) => reducer.reduce(&entry.curve, BAKE_TOLERANCE),
            None => continue,
        };
        set.replace_curve(id, reduced);
    }

    // 3. Reduction can turn a curve constant; re-check with the same rule.
    let dropped = dropped + eliminate_constant_groups(&mut set, BAKE_TOLERANCE);
    info!(retained = set.len(), dropped, "curve set reduced");

    // 4-6. Per curve, in insertion order: remap proxy targets, resolve the
    // target node, append to its aggregate.
    for id in set.ids() {
        let Some(mut entry) = set.remove(id) else { continue };

        let remapped = match &entry.binding.target {
            TargetKind::Behavior(type_name) => {
                proxies.playback_type(type_name).map(str::to_string)
            }
            TargetKind::Node => None,
        };
        if let Some(playback) = remapped {
            debug!(%entry.binding, %playback, "remapped proxy target");
            entry.binding.target = TargetKind::Behavior(playback);
        }

        let target = scene.resolve_from(root, &entry.binding.path).ok_or_else(|| {
            Error::TargetNotFound {
                path: entry.binding.path.clone(),
                target: entry.binding.target.type_name().to_string(),
            }
        })?;

        if let TargetKind::Behavior(type_name) = &entry.binding.target {
            scene.ensure_behavior(target, type_name);
        }

        let node = scene.node_mut(target);
        node.aggregate
            .get_or_insert_with(PlaybackAggregate::default)
            .curves
            .push(BoundCurve {
                path: entry.binding.path,
                property: entry.binding.property,
                target_type: entry.binding.target.type_name().to_string(),
                curve: entry.curve,
            });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Binding, LinearReducer};

    fn curve(keys: &[(f64, f32)]) -> Curve {
        let mut c = Curve::new();
        for &(t, v) in keys {
            c.push(t, v);
        }
        c
    }

    fn flat(value: f32) -> Curve {
        curve(&[(0.0, value), (1.0, value), (2.0, value)])
    }

    fn ramp() -> Curve {
        curve(&[(0.0, 0.0), (1.0, 0.5), (2.0, 2.0)])
    }

    #[test]
    fn test_fully_constant_group_dropped() {
        let mut set = CurveSet::new();
        for suffix in ["x", "y", "z"] {
            set.insert(
                Binding::behavior("A", "Transform", format!("localPosition.{suffix}")),
                flat(1.0),
            );
        }
        let removed = eliminate_constant_groups(&mut set, BAKE_TOLERANCE);
        assert_eq!(removed, 3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_partially_constant_group_fully_retained() {
        let mut set = CurveSet::new();
        set.insert(Binding::behavior("A", "T", "p.x"), flat(1.0));
        set.insert(Binding::behavior("A", "T", "p.y"), ramp());
        set.insert(Binding::behavior("A", "T", "p.z"), flat(0.0));

        let removed = eliminate_constant_groups(&mut set, BAKE_TOLERANCE);
        assert_eq!(removed, 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_sibling_group_retention_survives_reduction() {
        // Two channels reduce to constant, one does not; all three stay.
        let mut scene = SceneGraph::new("Root");
        let node = scene.add_child(scene.root(), "A");
        let root = scene.root();

        let mut set = CurveSet::new();
        set.insert(Binding::behavior("A", "T", "p.x"), curve(&[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]));
        set.insert(Binding::behavior("A", "T", "p.y"), ramp());
        set.insert(Binding::behavior("A", "T", "p.z"), curve(&[(0.0, 2.0), (1.0, 2.0), (2.0, 2.0)]));

        post_process(set, &mut scene, root, &ProxyRegistry::new(), &LinearReducer).unwrap();

        let aggregate = scene.node(node).aggregate.as_ref().unwrap();
        assert_eq!(aggregate.curves.len(), 3);
        // Constant members were still reduced to their endpoints.
        let x = aggregate.curves.iter().find(|c| c.property == "p.x").unwrap();
        assert_eq!(x.curve.len(), 2);
    }

    #[test]
    fn test_proxy_remap_creates_playback_behavior_once() {
        let mut scene = SceneGraph::new("Root");
        let node = scene.add_child(scene.root(), "A");
        let root = scene.root();

        let mut proxies = ProxyRegistry::new();
        proxies.register("CaptureBlend", "Blend");

        let mut set = CurveSet::new();
        set.insert(Binding::behavior("A", "CaptureBlend", "weight1"), ramp());
        set.insert(Binding::behavior("A", "CaptureBlend", "weight2"), ramp());

        post_process(set, &mut scene, root, &proxies, &LinearReducer).unwrap();

        let n = scene.node(node);
        assert!(n.has_behavior("Blend"));
        assert_eq!(n.behaviors().iter().filter(|b| *b == "Blend").count(), 1);
        let aggregate = n.aggregate.as_ref().unwrap();
        assert!(aggregate.curves.iter().all(|c| c.target_type == "Blend"));
    }

    #[test]
    fn test_unresolvable_target_is_fatal() {
        let mut scene = SceneGraph::new("Root");
        let root = scene.root();

        let mut set = CurveSet::new();
        set.insert(Binding::behavior("Ghost", "T", "p.x"), ramp());

        let err = post_process(set, &mut scene, root, &ProxyRegistry::new(), &LinearReducer)
            .unwrap_err();
        assert!(matches!(err, Error::TargetNotFound { .. }));
    }

    #[test]
    fn test_retained_set_independent_of_insertion_order() {
        let bindings = [
            (Binding::behavior("A", "T", "p.x"), flat(1.0)),
            (Binding::behavior("A", "T", "p.y"), ramp()),
            (Binding::behavior("B", "T", "q.x"), flat(3.0)),
            (Binding::node("A", "active"), ramp()),
        ];

        let retained = |order: &[usize]| {
            let mut set = CurveSet::new();
            for &i in order {
                let (b, c) = &bindings[i];
                set.insert(b.clone(), c.clone());
            }
            eliminate_constant_groups(&mut set, BAKE_TOLERANCE);
            let mut props: Vec<_> = set
                .ids()
                .into_iter()
                .map(|id| set.entry(id).unwrap().binding.to_string())
                .collect();
            props.sort();
            props
        };

        assert_eq!(retained(&[0, 1, 2, 3]), retained(&[3, 2, 1, 0]));
        assert_eq!(retained(&[0, 1, 2, 3]), retained(&[1, 3, 0, 2]));
    }
}
