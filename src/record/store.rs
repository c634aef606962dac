//! Sample Store: append-only per-tick recording buffers.
//!
//! Holds one ordered pose series per tracked node, one directly-sampled
//! curve per dynamic property binding, and one entry per discovered audio
//! source. Created fresh at recording start; ownership of its contents
//! moves to the bake pipeline at finalize.

use std::collections::{HashMap, HashSet};

use crate::curve::{Binding, Curve, PoseSample};
use crate::scene::NodeId;
use crate::util::Chrono;

/// Capture metadata for one discovered audio source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioEntry {
    /// Node carrying the audio source.
    pub source: NodeId,
    /// Elapsed recording time when the source was first seen.
    pub start_time: Chrono,
}

/// Append-only buffers of raw recorded values.
#[derive(Debug, Default)]
pub struct SampleStore {
    // Series kept in discovery order; maps are lookups into the vecs.
    pose_series: Vec<(NodeId, Vec<PoseSample>)>,
    pose_index: HashMap<NodeId, usize>,
    property_curves: Vec<(Binding, Curve)>,
    property_index: HashMap<Binding, usize>,
    audio_entries: Vec<AudioEntry>,
    audio_seen: HashSet<NodeId>,
}

impl SampleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a node, with a fresh empty series if newly seen.
    ///
    /// Returns true if the node was not tracked before.
    pub fn track_node(&mut self, id: NodeId) -> bool {
        if self.pose_index.contains_key(&id) {
            return false;
        }
        self.pose_index.insert(id, self.pose_series.len());
        self.pose_series.push((id, Vec::new()));
        true
    }

    /// Append one pose sample to a tracked node's series.
    pub fn append_pose(&mut self, id: NodeId, sample: PoseSample) {
        let idx = self.pose_index[&id];
        let series = &mut self.pose_series[idx].1;
        debug_assert!(
            series.last().is_none_or(|s| s.time <= sample.time),
            "pose sample times must be non-decreasing"
        );
        series.push(sample);
    }

    /// Pose series in discovery order.
    pub fn pose_series(&self) -> impl Iterator<Item = (NodeId, &[PoseSample])> {
        self.pose_series.iter().map(|(id, s)| (*id, s.as_slice()))
    }

    /// Number of tracked nodes.
    pub fn tracked_nodes(&self) -> usize {
        self.pose_series.len()
    }

    /// Start tracking a property binding, with a fresh empty curve if newly
    /// seen. Returns true if the binding was not tracked before.
    pub fn track_property(&mut self, binding: Binding) -> bool {
        if self.property_index.contains_key(&binding) {
            return false;
        }
        self.property_index.insert(binding.clone(), self.property_curves.len());
        self.property_curves.push((binding, Curve::new()));
        true
    }

    /// Tracked property bindings in discovery order.
    pub fn property_bindings(&self) -> Vec<Binding> {
        self.property_curves.iter().map(|(b, _)| b.clone()).collect()
    }

    /// Append one keyframe to a tracked property's curve.
    pub fn append_property(&mut self, binding: &Binding, time: Chrono, value: f32) {
        let idx = self.property_index[binding];
        self.property_curves[idx].1.push(time, value);
    }

    /// Directly-sampled property curve for a binding, if tracked.
    pub fn property_curve(&self, binding: &Binding) -> Option<&Curve> {
        self.property_index.get(binding).map(|&i| &self.property_curves[i].1)
    }

    /// Take all property curves, in discovery order.
    pub fn take_property_curves(&mut self) -> Vec<(Binding, Curve)> {
        self.property_index.clear();
        std::mem::take(&mut self.property_curves)
    }

    /// Record an audio source if not already seen. At most one entry is
    /// created per source. Returns true if an entry was created.
    pub fn note_audio(&mut self, source: NodeId, start_time: Chrono) -> bool {
        if !self.audio_seen.insert(source) {
            return false;
        }
        self.audio_entries.push(AudioEntry { source, start_time });
        true
    }

    /// Audio entries in discovery order.
    pub fn audio_entries(&self) -> &[AudioEntry] {
        &self.audio_entries
    }
}
