//! Channel identity: bindings, target kinds, and channel-group keys.
//!
//! A [`Binding`] uniquely identifies one animation channel by node path,
//! target kind, and property name. Channels whose property names differ only
//! in a trailing component character (e.g. `localPosition.x` / `.y` / `.z`)
//! belong to the same [`GroupKey`] and share one constancy decision.

use std::fmt;

/// What a curve animates on its target node.
///
/// Replaces type-based dispatch with an explicit tagged variant: either the
/// node itself (its enabled flag) or a named behavior attached to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// The node itself (e.g. the activity channel).
    Node,
    /// A behavior attached to the node, identified by its stable type name.
    Behavior(String),
}

impl TargetKind {
    /// Create a behavior target from a type name.
    pub fn behavior(type_name: impl Into<String>) -> Self {
        Self::Behavior(type_name.into())
    }

    /// Stable type name of the target.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Node => "Node",
            Self::Behavior(name) => name,
        }
    }

    /// Check if this targets a behavior.
    pub fn is_behavior(&self) -> bool {
        matches!(self, Self::Behavior(_))
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Unique identifier of one animation channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Node path relative to the recorded root ("" for the root itself).
    pub path: String,
    /// What the curve animates on the target node.
    pub target: TargetKind,
    /// Property name, e.g. `localPosition.x`.
    pub property: String,
}

impl Binding {
    /// Create a binding that targets the node itself.
    pub fn node(path: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: TargetKind::Node,
            property: property.into(),
        }
    }

    /// Create a binding that targets a behavior on the node.
    pub fn behavior(
        path: impl Into<String>,
        type_name: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            target: TargetKind::behavior(type_name),
            property: property.into(),
        }
    }

    /// Property name with its trailing component character removed.
    ///
    /// `localPosition.x` and `localPosition.y` share the stem
    /// `localPosition.`, putting them in the same channel group.
    pub fn stem(&self) -> &str {
        match self.property.char_indices().last() {
            Some((idx, _)) => &self.property[..idx],
            None => "",
        }
    }

    /// Key of the channel group this binding belongs to.
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            path: self.path.clone(),
            target: self.target.clone(),
            stem: self.stem().to_string(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.path, self.target, self.property)
    }
}

/// Identity of a channel group: path + target kind + property stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub path: String,
    pub target: TargetKind,
    pub stem: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_drops_trailing_component() {
        let b = Binding::behavior("Rig/Arm", "Transform", "localPosition.x");
        assert_eq!(b.stem(), "localPosition.");

        let b = Binding::node("Rig", "active");
        assert_eq!(b.stem(), "activ");
    }

    #[test]
    fn test_group_key_shared_across_components() {
        let x = Binding::behavior("Rig", "Transform", "localRotation.x");
        let w = Binding::behavior("Rig", "Transform", "localRotation.w");
        assert_eq!(x.group_key(), w.group_key());

        let other_path = Binding::behavior("Rig/Arm", "Transform", "localRotation.x");
        assert_ne!(x.group_key(), other_path.group_key());

        let other_target = Binding::node("Rig", "localRotation.x");
        assert_ne!(x.group_key(), other_target.group_key());
    }

    #[test]
    fn test_display() {
        let b = Binding::behavior("Rig/Arm", "Blend", "weight1");
        assert_eq!(b.to_string(), "Rig/Arm:Blend/weight1");
        assert_eq!(TargetKind::Node.type_name(), "Node");
    }
}
