//! Baking: curve synthesis and post-processing.
//!
//! On finalize, the [`synth`] pass converts each node's pose sample series
//! into channel curves inside a [`CurveSet`], and the [`post`] pass reduces
//! the unified set and attaches the result to target nodes as
//! [`PlaybackAggregate`]s.

pub mod post;
pub mod set;
pub mod synth;

pub use post::{
    eliminate_constant_groups, post_process, BoundCurve, PlaybackAggregate, ProxyRegistry,
    BAKE_TOLERANCE,
};
pub use set::{CurveEntry, CurveSet};
pub use synth::synthesize;
