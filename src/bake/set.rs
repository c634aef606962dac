//! Working curve set for the bake pipeline.
//!
//! An arena of binding→curve entries indexed by a small integer id, with a
//! side index from channel-group key to member ids. Group-constancy scans
//! are O(group size) instead of a full-mapping scan, and group decisions are
//! independent of processing order.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::error;

use crate::curve::{Binding, Curve, GroupKey};

/// One entry of the working set.
#[derive(Clone, Debug)]
pub struct CurveEntry {
    pub binding: Binding,
    pub curve: Curve,
}

/// Arena of binding→curve entries with a group-key side index.
///
/// At most one curve exists per binding at any time; inserting a duplicate
/// is an integrity error that keeps the existing curve and drops the new
/// one.
#[derive(Debug, Default)]
pub struct CurveSet {
    entries: Vec<Option<CurveEntry>>,
    by_binding: HashMap<Binding, usize>,
    groups: HashMap<GroupKey, SmallVec<[usize; 4]>>,
}

impl CurveSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a curve under a binding.
    ///
    /// Returns false and keeps the existing curve if the binding is already
    /// present; duplicate synthesis signals a naming/identity bug upstream.
    pub fn insert(&mut self, binding: Binding, curve: Curve) -> bool {
        if self.by_binding.contains_key(&binding) {
            error!(%binding, "duplicate curve binding, keeping existing curve");
            return false;
        }
        let id = self.entries.len();
        self.by_binding.insert(binding.clone(), id);
        self.groups.entry(binding.group_key()).or_default().push(id);
        self.entries.push(Some(CurveEntry { binding, curve }));
        true
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.by_binding.len()
    }

    /// Check if the set has no live entries.
    pub fn is_empty(&self) -> bool {
        self.by_binding.is_empty()
    }

    /// Check if a binding is present.
    pub fn contains(&self, binding: &Binding) -> bool {
        self.by_binding.contains_key(binding)
    }

    /// Curve for a binding, if present.
    pub fn get(&self, binding: &Binding) -> Option<&Curve> {
        self.by_binding
            .get(binding)
            .and_then(|&id| self.entries[id].as_ref())
            .map(|e| &e.curve)
    }

    /// Live entry ids in insertion order.
    pub fn ids(&self) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&id| self.entries[id].is_some())
            .collect()
    }

    /// Live entry by id.
    pub fn entry(&self, id: usize) -> Option<&CurveEntry> {
        self.entries.get(id).and_then(|e| e.as_ref())
    }

    /// Live member ids of the channel group `key` belongs to.
    pub fn group_members(&self, key: &GroupKey) -> SmallVec<[usize; 4]> {
        match self.groups.get(key) {
            Some(ids) => ids
                .iter()
                .copied()
                .filter(|&id| self.entries[id].is_some())
                .collect(),
            None => SmallVec::new(),
        }
    }

    /// Replace the curve of a live entry, keeping its binding.
    pub fn replace_curve(&mut self, id: usize, curve: Curve) {
        if let Some(entry) = self.entries[id].as_mut() {
            entry.curve = curve;
        }
    }

    /// Remove a live entry, returning it.
    pub fn remove(&mut self, id: usize) -> Option<CurveEntry> {
        let entry = self.entries.get_mut(id)?.take()?;
        self.by_binding.remove(&entry.binding);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_key(value: f32) -> Curve {
        let mut c = Curve::new();
        c.push(0.0, value);
        c
    }

    #[test]
    fn test_duplicate_binding_keeps_existing() {
        let mut set = CurveSet::new();
        let b = Binding::behavior("A", "Transform", "localPosition.x");

        assert!(set.insert(b.clone(), one_key(1.0)));
        assert!(!set.insert(b.clone(), one_key(2.0)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&b).unwrap().keys()[0].value, 1.0);
    }

    #[test]
    fn test_group_members_track_removal() {
        let mut set = CurveSet::new();
        let x = Binding::behavior("A", "Transform", "localPosition.x");
        let y = Binding::behavior("A", "Transform", "localPosition.y");
        set.insert(x.clone(), one_key(1.0));
        set.insert(y.clone(), one_key(2.0));

        let key = x.group_key();
        assert_eq!(set.group_members(&key).len(), 2);

        let x_id = *set.ids().first().unwrap();
        let removed = set.remove(x_id).unwrap();
        assert_eq!(removed.binding, x);
        assert_eq!(set.group_members(&key).len(), 1);
        assert!(!set.contains(&x));
        assert!(set.contains(&y));
    }

    #[test]
    fn test_ids_in_insertion_order() {
        let mut set = CurveSet::new();
        for prop in ["a1", "b1", "c1"] {
            set.insert(Binding::node("N", prop), one_key(0.0));
        }
        let props: Vec<_> = set
            .ids()
            .into_iter()
            .map(|id| set.entry(id).unwrap().binding.property.clone())
            .collect();
        assert_eq!(props, vec!["a1", "b1", "c1"]);
    }
}
