//! # motionbake
//!
//! Frame-sampled capture of a scene-node tree (poses, enable flags, custom
//! scalar properties, audio source metadata), baked into a compact set of
//! keyframe curves for playback.
//!
//! Recording is single-threaded and tick-driven: while a session is
//! Recording, every scheduling frame appends one sample to every active
//! series. Curve synthesis is deferred entirely to finalization, which runs
//! a staged pipeline: material reconciliation, per-node curve synthesis
//! with group-wise constant elimination, lossless reduction, proxy-target
//! remapping, and aggregation onto the target nodes.
//!
//! ## Modules
//!
//! - [`util`] - Errors, time and math aliases
//! - [`scene`] - Scene-node arena, paths, materials
//! - [`curve`] - Bindings, keyframes, the pose channel codec, reduction
//! - [`record`] - Sample store and per-tick frame sampler
//! - [`bake`] - Curve synthesis and post-processing
//! - [`session`] - The Idle → Recording → Finalizing state machine
//!
//! ## Example
//!
//! ```
//! use motionbake::prelude::*;
//!
//! let mut scene = SceneGraph::new("Root");
//! let arm = scene.add_child(scene.root(), "Arm");
//!
//! let mut session = RecordSession::new(scene.root());
//! session.begin(&mut scene, 0.0);
//! for i in 0..10 {
//!     scene.node_mut(arm).pose.position.x = i as f32 * 0.1;
//!     session.tick(&mut scene, i as f64 / 30.0).unwrap();
//! }
//! session.finish(&mut scene, &mut NullProgress).unwrap();
//!
//! let baked = scene.node(arm).aggregate.as_ref().unwrap();
//! assert!(!baked.curves.is_empty());
//! ```

pub mod bake;
pub mod curve;
pub mod record;
pub mod scene;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use curve::{Binding, Curve, Keyframe, PoseSample, TargetKind};
pub use scene::{NodeId, SceneGraph};
pub use session::{RecordSession, SessionState};
pub use util::{Chrono, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bake::{BoundCurve, PlaybackAggregate, ProxyRegistry};
    pub use crate::curve::{Binding, Curve, CurveReducer, Keyframe, LinearReducer, PoseSample, TargetKind};
    pub use crate::record::{PropertySource, SampleStore};
    pub use crate::scene::{Material, MaterialRef, NodeId, Renderer, SceneGraph};
    pub use crate::session::{
        ArtifactSink, LogProgress, NullProgress, ProgressSink, RecordSession, SessionState,
        BAKED_MARKER,
    };
    pub use crate::util::{Chrono, Error, Result};
}
