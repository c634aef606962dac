//! Session Controller: the Idle → Recording → Finalizing state machine.
//!
//! A [`RecordSession`] owns the recording-session state: the frame sampler
//! with its capture adapters, the sample store, the proxy registry, the
//! reducer, and the optional artifact sink. `begin`, `tick` and `finish`
//! are the only entry points; all run to completion within one scheduling
//! frame. The finalize pipeline is an explicit ordered list of stages, each
//! reporting through a caller-supplied [`ProgressSink`] before continuing
//! synchronously to the next.
//!
//! A session bakes at most once; after a successful `finish` it is retired
//! and a new session is needed to record again.

use tracing::{debug, error, info, warn};

use crate::bake::{post_process, synthesize, CurveSet, ProxyRegistry};
use crate::curve::{CurveReducer, LinearReducer};
use crate::record::{AudioEntry, FrameSampler, PreSampleObserver, PropertySource, SampleStore};
use crate::scene::{self, MaterialRef, NodeId, SceneGraph};
use crate::util::{Chrono, Result};

/// Behavior type name attached to the root node when baking completes.
pub const BAKED_MARKER: &str = "BakedRecording";

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Finalizing,
}

/// Hierarchical, synchronous progress reporting for the finalize pipeline.
pub trait ProgressSink {
    /// A staged operation with `steps` steps is starting.
    fn begin(&mut self, steps: usize, prefix: &str, label: &str);

    /// The next step is starting.
    fn step(&mut self, label: &str);
}

/// Progress sink that reports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _steps: usize, _prefix: &str, _label: &str) {}
    fn step(&mut self, _label: &str) {}
}

/// Progress sink that logs each stage through tracing.
#[derive(Clone, Debug, Default)]
pub struct LogProgress {
    prefix: String,
}

impl ProgressSink for LogProgress {
    fn begin(&mut self, steps: usize, prefix: &str, label: &str) {
        self.prefix = prefix.to_string();
        info!(steps, prefix, "{label}");
    }

    fn step(&mut self, label: &str) {
        info!("{}: {label}", self.prefix);
    }
}

/// External persistence of the finalized hierarchy.
///
/// Called once, after playback aggregates are attached and the root carries
/// the [`BAKED_MARKER`]. Format and location are the implementer's concern.
pub trait ArtifactSink {
    fn persist(&mut self, scene: &SceneGraph, root: NodeId) -> Result<()>;
}

// Working state threaded through the finalize stages.
struct BakeState {
    store: SampleStore,
    set: CurveSet,
}

type Stage = fn(&mut RecordSession, &mut SceneGraph, &mut BakeState) -> Result<()>;

/// Ordered finalize pipeline. No stage may begin before the previous
/// stage's mutations are fully visible; there is no cancellation once the
/// pipeline starts.
const STAGES: [(&str, Stage); 6] = [
    ("detach capture adapters", stage_detach),
    ("reconcile materials", stage_materials),
    ("synthesize curves", stage_synthesize),
    ("post-process curves", stage_post),
    ("mark root", stage_mark),
    ("persist artifact", stage_persist),
];

fn stage_detach(s: &mut RecordSession, _scene: &mut SceneGraph, _bake: &mut BakeState) -> Result<()> {
    s.sampler.clear_adapters();
    Ok(())
}

fn stage_materials(s: &mut RecordSession, scene: &mut SceneGraph, _bake: &mut BakeState) -> Result<()> {
    scene::reconcile(scene, s.root, &s.main_assets);
    Ok(())
}

fn stage_synthesize(s: &mut RecordSession, scene: &mut SceneGraph, bake: &mut BakeState) -> Result<()> {
    for (node, series) in bake.store.pose_series() {
        let path = scene.path_from(s.root, node);
        synthesize(&path, series, &mut bake.set);
    }
    // Directly-sampled property curves join the unified mapping; duplicate
    // bindings keep the existing curve.
    for (binding, curve) in bake.store.take_property_curves() {
        bake.set.insert(binding, curve);
    }
    Ok(())
}

fn stage_post(s: &mut RecordSession, scene: &mut SceneGraph, bake: &mut BakeState) -> Result<()> {
    let set = std::mem::take(&mut bake.set);
    post_process(set, scene, s.root, &s.proxies, s.reducer.as_ref())
}

fn stage_mark(s: &mut RecordSession, scene: &mut SceneGraph, _bake: &mut BakeState) -> Result<()> {
    scene.ensure_behavior(s.root, BAKED_MARKER);
    Ok(())
}

fn stage_persist(s: &mut RecordSession, scene: &mut SceneGraph, _bake: &mut BakeState) -> Result<()> {
    match s.artifact.as_mut() {
        Some(sink) => sink.persist(scene, s.root),
        None => Ok(()),
    }
}

/// Finite-state driver of one recording session.
pub struct RecordSession {
    state: SessionState,
    baked: bool,
    root: NodeId,
    start_time: Chrono,
    sampler: FrameSampler,
    store: SampleStore,
    proxies: ProxyRegistry,
    reducer: Box<dyn CurveReducer>,
    artifact: Option<Box<dyn ArtifactSink>>,
    main_assets: Vec<MaterialRef>,
}

impl RecordSession {
    /// Create an idle session recording the subtree under `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            state: SessionState::Idle,
            baked: false,
            root,
            start_time: 0.0,
            sampler: FrameSampler::new(root),
            store: SampleStore::new(),
            proxies: ProxyRegistry::new(),
            reducer: Box::new(LinearReducer),
            artifact: None,
            main_assets: Vec::new(),
        }
    }

    /// Substitute the curve-reduction implementation.
    pub fn with_reducer(mut self, reducer: Box<dyn CurveReducer>) -> Self {
        self.reducer = reducer;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether this session has produced its artifact.
    pub fn is_baked(&self) -> bool {
        self.baked
    }

    /// Recorded root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Proxy-type registry consulted during post-processing.
    pub fn proxies_mut(&mut self) -> &mut ProxyRegistry {
        &mut self.proxies
    }

    /// Install the persistence seam for the finalized hierarchy.
    pub fn set_artifact_sink(&mut self, sink: Box<dyn ArtifactSink>) {
        self.artifact = Some(sink);
    }

    /// Candidate main material assets for reconciliation, in a stable
    /// enumeration order (first match wins).
    pub fn set_main_assets(&mut self, assets: Vec<MaterialRef>) {
        self.main_assets = assets;
    }

    /// Register a pre-sample observer (invoked in registration order).
    pub fn add_observer(&mut self, observer: PreSampleObserver) {
        self.sampler.add_observer(observer);
    }

    /// Register a property source supplying custom scalar channels.
    pub fn add_property_source(&mut self, source: Box<dyn PropertySource>) {
        self.sampler.add_source(source);
    }

    /// Audio entries discovered so far.
    pub fn audio_entries(&self) -> &[AudioEntry] {
        self.store.audio_entries()
    }

    /// Enter Recording at time `now`.
    ///
    /// No-op while already Recording and on a retired (baked) session. On
    /// entry, runs the one-time sibling-name disambiguation pass (later
    /// path computation depends on name uniqueness) and allocates fresh
    /// session state.
    pub fn begin(&mut self, scene: &mut SceneGraph, now: Chrono) {
        if self.state == SessionState::Recording {
            debug!("begin ignored: already recording");
            return;
        }
        if self.baked {
            warn!("begin ignored: session already baked, create a new session");
            return;
        }
        scene.disambiguate_siblings(self.root);
        self.store = SampleStore::new();
        self.start_time = now;
        self.state = SessionState::Recording;
        info!(start = now, "recording started");
    }

    /// Perform one capture step at time `now`. No-op unless Recording.
    ///
    /// A failing pre-sample observer aborts this tick only; the session
    /// stays Recording and later ticks may succeed.
    pub fn tick(&mut self, scene: &mut SceneGraph, now: Chrono) -> Result<()> {
        if self.state != SessionState::Recording {
            return Ok(());
        }
        let elapsed = now - self.start_time;
        self.sampler.tick(scene, &mut self.store, elapsed)
    }

    /// Finalize the recording. No-op while Idle.
    ///
    /// Runs the staged bake pipeline to completion. On success the session
    /// returns to Idle retired (baked); a new session is needed to record
    /// again. On error the session returns to Idle un-baked and the scene
    /// may hold partially-applied finalize mutations (known limitation:
    /// there is no mid-finalize cancellation or rollback).
    pub fn finish(&mut self, scene: &mut SceneGraph, progress: &mut dyn ProgressSink) -> Result<()> {
        if self.state != SessionState::Recording {
            debug!("finish ignored: session is not recording");
            return Ok(());
        }
        self.state = SessionState::Finalizing;

        let mut bake = BakeState {
            store: std::mem::take(&mut self.store),
            set: CurveSet::new(),
        };

        progress.begin(STAGES.len(), "bake", "finalize recording");
        let result = STAGES.iter().try_for_each(|(label, stage)| {
            progress.step(label);
            stage(self, scene, &mut bake)
        });

        self.state = SessionState::Idle;
        match result {
            Ok(()) => {
                self.baked = true;
                info!("recording baked");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "finalize failed, artifact incomplete");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingProgress {
        begins: usize,
        steps: Vec<String>,
    }

    impl ProgressSink for CountingProgress {
        fn begin(&mut self, steps: usize, _prefix: &str, _label: &str) {
            self.begins += 1;
            assert_eq!(steps, STAGES.len());
        }

        fn step(&mut self, label: &str) {
            self.steps.push(label.to_string());
        }
    }

    fn animated_scene() -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new("Root");
        let arm = scene.add_child(scene.root(), "Arm");
        (scene, arm)
    }

    #[test]
    fn test_begin_is_reentrant() {
        let (mut scene, _) = animated_scene();
        let mut session = RecordSession::new(scene.root());

        session.begin(&mut scene, 0.0);
        assert_eq!(session.state(), SessionState::Recording);
        session.tick(&mut scene, 0.1).unwrap();

        // Second begin must not reset the clock or the store.
        session.begin(&mut scene, 5.0);
        session.tick(&mut scene, 0.2).unwrap();
        assert_eq!(session.state(), SessionState::Recording);
    }

    #[test]
    fn test_finish_on_idle_is_a_noop() {
        let (mut scene, _) = animated_scene();
        let mut session = RecordSession::new(scene.root());
        let mut progress = CountingProgress::default();

        session.finish(&mut scene, &mut progress).unwrap();
        assert_eq!(progress.begins, 0, "no pipeline ran");
        assert!(!session.is_baked());
        assert!(!scene.node(scene.root()).has_behavior(BAKED_MARKER));
    }

    #[test]
    fn test_finish_twice_produces_one_artifact() {
        let (mut scene, arm) = animated_scene();
        let mut session = RecordSession::new(scene.root());

        session.begin(&mut scene, 0.0);
        session.tick(&mut scene, 0.0).unwrap();
        scene.node_mut(arm).pose.position.x = 1.0;
        session.tick(&mut scene, 0.1).unwrap();

        let mut progress = CountingProgress::default();
        session.finish(&mut scene, &mut progress).unwrap();
        assert!(session.is_baked());
        assert_eq!(progress.begins, 1);
        assert_eq!(progress.steps.len(), STAGES.len());

        // Second call while Idle: no error, no additional pipeline run.
        session.finish(&mut scene, &mut progress).unwrap();
        assert_eq!(progress.begins, 1);
    }

    #[test]
    fn test_begin_after_bake_is_ignored() {
        let (mut scene, _) = animated_scene();
        let mut session = RecordSession::new(scene.root());

        session.begin(&mut scene, 0.0);
        session.tick(&mut scene, 0.0).unwrap();
        session.finish(&mut scene, &mut NullProgress).unwrap();

        session.begin(&mut scene, 1.0);
        assert_eq!(session.state(), SessionState::Idle, "retired session stays idle");
    }

    #[test]
    fn test_begin_disambiguates_siblings() {
        let mut scene = SceneGraph::new("Root");
        let a = scene.add_child(scene.root(), "Bone");
        let b = scene.add_child(scene.root(), "Bone");
        let mut session = RecordSession::new(scene.root());

        session.begin(&mut scene, 0.0);
        assert_ne!(scene.node(a).name(), scene.node(b).name());
    }

    #[test]
    fn test_tick_while_idle_is_a_noop() {
        let (mut scene, _) = animated_scene();
        let mut session = RecordSession::new(scene.root());

        session.tick(&mut scene, 0.0).unwrap();
        session.begin(&mut scene, 1.0);
        session.tick(&mut scene, 1.0).unwrap();
        session.finish(&mut scene, &mut NullProgress).unwrap();
        session.tick(&mut scene, 2.0).unwrap();
    }

    #[test]
    fn test_constant_recording_attaches_no_aggregates() {
        let (mut scene, arm) = animated_scene();
        let mut session = RecordSession::new(scene.root());

        session.begin(&mut scene, 0.0);
        for i in 0..5 {
            session.tick(&mut scene, i as f64 * 0.1).unwrap();
        }
        session.finish(&mut scene, &mut NullProgress).unwrap();

        assert!(scene.node(arm).aggregate.is_none());
        assert!(scene.node(scene.root()).has_behavior(BAKED_MARKER));
    }
}
