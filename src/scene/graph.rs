//! In-memory scene-node arena.
//!
//! The recorder samples this tree and the finalizer writes playback
//! aggregates back into it. Nodes live in an arena and are addressed by
//! [`NodeId`]; paths are slash-separated name chains relative to a chosen
//! root ("" for the root itself).

use std::collections::HashSet;

use crate::bake::PlaybackAggregate;
use crate::util::{Quat, Vec3};

use super::material::Renderer;

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Local transform of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Pose {
    /// Identity pose: no translation or rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One node of the scene tree.
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    stable_id: u64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Active flag, recorded as the activity channel.
    pub enabled: bool,
    /// Local transform, recorded as the pose channels.
    pub pose: Pose,
    behaviors: Vec<String>,
    /// Renderer with material slots, if the node renders anything.
    pub renderer: Option<Renderer>,
    /// Whether the node carries an audio source.
    pub audio_source: bool,
    /// Finalized curves destined for this node, attached at bake time.
    pub aggregate: Option<PlaybackAggregate>,
}

impl SceneNode {
    fn new(name: &str, stable_id: u64, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            stable_id,
            parent,
            children: Vec::new(),
            enabled: true,
            pose: Pose::IDENTITY,
            behaviors: Vec::new(),
            renderer: None,
            audio_source: false,
            aggregate: None,
        }
    }

    /// Node name (unique among siblings after disambiguation).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable per-node identifier, assigned at creation.
    pub fn stable_id(&self) -> u64 {
        self.stable_id
    }

    /// Parent node, None for the tree root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Behavior type names attached to this node.
    pub fn behaviors(&self) -> &[String] {
        &self.behaviors
    }

    /// Check if a behavior of the given type is attached.
    pub fn has_behavior(&self, type_name: &str) -> bool {
        self.behaviors.iter().any(|b| b == type_name)
    }
}

/// Arena of scene nodes forming a tree.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
    next_stable_id: u64,
}

impl SceneGraph {
    /// Create a graph with a single root node.
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![SceneNode::new(root_name, 1, None)],
            root: NodeId(0),
            next_stable_id: 2,
        }
    }

    /// Tree root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a child node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let stable_id = self.next_stable_id;
        self.next_stable_id += 1;
        self.nodes.push(SceneNode::new(name, stable_id, Some(parent)));
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0 as usize]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Children of a node, in attach order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0 as usize].children
    }

    /// Attach a behavior of the given type if not already present.
    ///
    /// Returns true if the behavior was created. Idempotent: a node owns at
    /// most one instance per type.
    pub fn ensure_behavior(&mut self, id: NodeId, type_name: &str) -> bool {
        let node = &mut self.nodes[id.0 as usize];
        if node.has_behavior(type_name) {
            false
        } else {
            node.behaviors.push(type_name.to_string());
            true
        }
    }

    /// Preorder traversal of the subtree rooted at `id`, including `id`.
    ///
    /// Order is deterministic: parents before children, siblings in attach
    /// order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            for &c in self.children(n).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Path of `id` relative to `root`: "" for the root itself, otherwise
    /// slash-separated names, e.g. "Arm/Hand".
    pub fn path_from(&self, root: NodeId, id: NodeId) -> String {
        if id == root {
            return String::new();
        }
        let mut segments = Vec::new();
        let mut cur = id;
        while cur != root {
            let node = self.node(cur);
            segments.push(node.name.as_str());
            match node.parent {
                Some(p) => cur = p,
                None => break, // id is not under root; path from tree top
            }
        }
        segments.reverse();
        segments.join("/")
    }

    /// Resolve a relative path back to a node under `root`.
    pub fn resolve_from(&self, root: NodeId, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(root);
        }
        let mut cur = root;
        for segment in path.split('/') {
            cur = *self
                .children(cur)
                .iter()
                .find(|&&c| self.node(c).name == segment)?;
        }
        Some(cur)
    }

    /// One-time sibling-name disambiguation pass over the subtree at `root`.
    ///
    /// Any child whose name collides with an already-seen sibling under the
    /// same parent gets a numeric suffix derived from its stable id. After
    /// this pass all sibling names are unique, so paths are unambiguous.
    /// Deterministic given the same names and stable ids.
    pub fn disambiguate_siblings(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let children = self.nodes[parent.0 as usize].children.clone();
            let mut seen: HashSet<String> = HashSet::new();
            for &child in &children {
                let node = &self.nodes[child.0 as usize];
                if !seen.insert(node.name.clone()) {
                    let sid = node.stable_id;
                    let mut unique = format!("{}_{}", node.name, sid);
                    while !seen.insert(unique.clone()) {
                        unique = format!("{}_{}", unique, sid);
                    }
                    tracing::debug!(
                        old = %self.nodes[child.0 as usize].name,
                        new = %unique,
                        "renamed colliding sibling"
                    );
                    self.nodes[child.0 as usize].name = unique;
                }
                stack.push(child);
            }
        }
    }
}
