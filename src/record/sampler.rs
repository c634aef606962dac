//! Frame Sampler: one capture step per scheduling tick.
//!
//! Each tick notifies pre-sample observers, refreshes the live set of
//! trackable nodes and sources, and appends one sample to every active
//! series. No curve synthesis happens here; per-tick cost is proportional
//! to the number of tracked items, independent of recording length.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::curve::{Binding, PoseSample};
use crate::scene::{NodeId, SceneGraph};
use crate::util::{Chrono, Result};

use super::store::SampleStore;

/// Pre-sample notification listener.
///
/// Invoked synchronously, in registration order, before any scene state is
/// read, so external systems can stage state for the sample. A failing
/// observer aborts the whole tick.
pub type PreSampleObserver = Box<dyn FnMut(&mut SceneGraph) -> Result<()>>;

/// Supplier of custom scalar channels.
///
/// Per tick, the sampler asks each source which bindings it wants sampled,
/// then queries the current value per binding. Returning `None` marks that
/// tick's sample as absent for the binding (a gap, not an error).
pub trait PropertySource {
    /// Bindings this source wants sampled this tick.
    fn bindings(&self, scene: &SceneGraph) -> Vec<Binding>;

    /// Current scalar value for a binding, or `None` on read failure.
    fn sample(&self, scene: &SceneGraph, binding: &Binding) -> Option<f32>;
}

/// Drives one capture step per tick while recording.
pub struct FrameSampler {
    root: NodeId,
    observers: Vec<PreSampleObserver>,
    sources: Vec<Box<dyn PropertySource>>,
    // Which source first supplied each binding; later value queries go there.
    owners: HashMap<Binding, usize>,
}

impl FrameSampler {
    /// Create a sampler capturing the subtree under `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            observers: Vec::new(),
            sources: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Register a pre-sample observer. Observers run in registration order.
    pub fn add_observer(&mut self, observer: PreSampleObserver) {
        self.observers.push(observer);
    }

    /// Register a property source.
    pub fn add_source(&mut self, source: Box<dyn PropertySource>) {
        self.sources.push(source);
    }

    /// Drop all live capture adapters (observers and property sources).
    /// Called when finalization begins.
    pub fn clear_adapters(&mut self) {
        self.observers.clear();
        self.sources.clear();
        self.owners.clear();
    }

    /// Perform one capture step at `elapsed` seconds since recording start.
    ///
    /// An observer failure aborts the tick before any data is read; the
    /// store is left untouched and a later tick may succeed.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        store: &mut SampleStore,
        elapsed: Chrono,
    ) -> Result<()> {
        // 1. Pre-sample broadcast, before any state is read.
        for observer in &mut self.observers {
            observer(scene)?;
        }

        // 2. Refresh the live set; newly seen nodes get fresh empty series.
        let live = scene.descendants(self.root);
        for &id in &live {
            if store.track_node(id) {
                debug!(node = %scene.node(id).name(), "tracking new node");
            }
        }

        // 3. Audio sources get one entry each, stamped at first sight.
        for &id in &live {
            if scene.node(id).audio_source && store.note_audio(id, elapsed) {
                debug!(node = %scene.node(id).name(), time = elapsed, "audio source discovered");
            }
        }

        // 4. Newly supplied property bindings get fresh empty curves.
        for (i, source) in self.sources.iter().enumerate() {
            for binding in source.bindings(scene) {
                self.owners.entry(binding.clone()).or_insert(i);
                store.track_property(binding);
            }
        }

        // 5. Sample every tracked property binding; a failed read is a gap.
        for binding in store.property_bindings() {
            let Some(&owner) = self.owners.get(&binding) else {
                continue;
            };
            match self.sources[owner].sample(scene, &binding) {
                Some(value) => store.append_property(&binding, elapsed, value),
                None => warn!(%binding, time = elapsed, "property read failed, sample skipped"),
            }
        }

        // 6. One pose sample per tracked live node, changed or not.
        for &id in &live {
            let node = scene.node(id);
            store.append_pose(
                id,
                PoseSample {
                    time: elapsed,
                    enabled: node.enabled,
                    position: node.pose.position,
                    rotation: node.pose.rotation,
                    scale: node.pose.scale,
                },
            );
        }

        Ok(())
    }
}
