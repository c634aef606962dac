//! Scene-node tree and material assets.
//!
//! The host scene graph is modeled as plain data: an arena of nodes with
//! names, transforms, enable flags, behaviors, renderers and audio markers.
//! The recorder reads from it every tick; the finalizer writes playback
//! aggregates and reconciled material references back into it.

pub mod graph;
pub mod material;

pub use graph::{NodeId, Pose, SceneGraph, SceneNode};
pub use material::{reconcile, Material, MaterialRef, Renderer};
