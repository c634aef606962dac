//! Materials and the shared-asset reconciler.
//!
//! During capture, renderers often end up holding per-instance copies of
//! their materials. Persisting those copies would embed many duplicate
//! hidden materials in the artifact, so before baking, each instance slot is
//! reconciled back to the matching canonical ("main") asset.

use std::sync::Arc;

use tracing::debug;

use super::graph::{NodeId, SceneGraph};

/// A material asset: name plus shader reference.
#[derive(Debug, PartialEq, Eq)]
pub struct Material {
    /// Asset name. Instance copies typically carry a decorated variant of
    /// their source asset's name (e.g. "Skin (Instance)").
    pub name: String,
    /// Shader reference, compared by equality during reconciliation.
    pub shader: String,
    /// True for canonical on-disk assets, false for transient copies.
    pub main_asset: bool,
}

/// Shared material handle. Reconciled slots point at the same allocation as
/// the candidate asset.
pub type MaterialRef = Arc<Material>;

impl Material {
    /// Create a canonical main asset.
    pub fn main(name: impl Into<String>, shader: impl Into<String>) -> MaterialRef {
        Arc::new(Self {
            name: name.into(),
            shader: shader.into(),
            main_asset: true,
        })
    }

    /// Create a transient per-instance copy.
    pub fn instance(name: impl Into<String>, shader: impl Into<String>) -> MaterialRef {
        Arc::new(Self {
            name: name.into(),
            shader: shader.into(),
            main_asset: false,
        })
    }
}

/// Renderer component: an ordered list of material slots.
#[derive(Debug, Default)]
pub struct Renderer {
    pub materials: Vec<MaterialRef>,
}

impl Renderer {
    /// Create a renderer with the given material slots.
    pub fn new(materials: Vec<MaterialRef>) -> Self {
        Self { materials }
    }
}

/// Replace per-instance duplicate materials with the matching shared asset.
///
/// For every renderer under `root`, each slot holding a non-main material is
/// matched against `candidates` in order: the first candidate whose name is
/// a substring of the instance's name and whose shader equals the instance's
/// shader wins. Slots with no match are left untouched. Deterministic given
/// the candidate order.
pub fn reconcile(scene: &mut SceneGraph, root: NodeId, candidates: &[MaterialRef]) {
    for id in scene.descendants(root) {
        let Some(renderer) = scene.node_mut(id).renderer.as_mut() else {
            continue;
        };
        for slot in &mut renderer.materials {
            if slot.main_asset {
                continue;
            }
            let matched = candidates
                .iter()
                .find(|c| slot.name.contains(&c.name) && slot.shader == c.shader);
            if let Some(candidate) = matched {
                debug!(instance = %slot.name, asset = %candidate.name, "reconciled material slot");
                *slot = candidate.clone();
            }
        }
    }
}
