//! Anchor registry.
//!
//! Anchors are registered the moment they are declared, so the id a parser
//! hands out for the n-th anchor always names the n-th entry here, whatever
//! kind of node the anchor ends up on.

use crate::event::ContainerKind;

/// What an anchor has been attached to so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorTarget {
    /// Declared, node not seen yet.
    Pending,
    /// Scalar text captured from the anchored node.
    Scalar(String),
    /// Anchored node is a container; its value is not captured.
    Composite(ContainerKind),
}

/// A declared anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub target: AnchorTarget,
}

impl Anchor {
    /// Captured scalar value, if any.
    pub fn value(&self) -> Option<&str> {
        match &self.target {
            AnchorTarget::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

/// Id-keyed table of declared anchors. Ids are 1-based and dense.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    entries: Vec<Anchor>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending anchor and return its id.
    pub fn declare(&mut self, name: &str) -> usize {
        self.entries.push(Anchor {
            name: name.to_string(),
            target: AnchorTarget::Pending,
        });
        self.entries.len()
    }

    /// Attach the anchored node to a declared anchor.
    ///
    /// Returns `false` if `id` is unknown.
    pub fn complete(&mut self, id: usize, target: AnchorTarget) -> bool {
        match self.get_mut(id) {
            Some(anchor) => {
                anchor.target = target;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: usize) -> Option<&Anchor> {
        id.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    fn get_mut(&mut self, id: usize) -> Option<&mut Anchor> {
        id.checked_sub(1).and_then(|i| self.entries.get_mut(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Anchors with their ids, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Anchor)> {
        self.entries.iter().enumerate().map(|(i, a)| (i + 1, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_declaration_order() {
        let mut reg = AnchorRegistry::new();
        assert_eq!(reg.declare("a"), 1);
        assert_eq!(reg.declare("b"), 2);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(1).unwrap().name, "a");
        assert_eq!(reg.get(2).unwrap().name, "b");
        assert!(reg.get(0).is_none());
        assert!(reg.get(3).is_none());
    }

    #[test]
    fn test_complete_scalar() {
        let mut reg = AnchorRegistry::new();
        let id = reg.declare("x");
        assert_eq!(reg.get(id).unwrap().value(), None);
        assert!(reg.complete(id, AnchorTarget::Scalar("hello".to_string())));
        assert_eq!(reg.get(id).unwrap().value(), Some("hello"));
        assert!(!reg.complete(7, AnchorTarget::Scalar("nope".to_string())));
    }

    #[test]
    fn test_composite_keeps_its_slot() {
        let mut reg = AnchorRegistry::new();
        let map = reg.declare("m");
        reg.complete(map, AnchorTarget::Composite(ContainerKind::Map));
        let s = reg.declare("s");
        reg.complete(s, AnchorTarget::Scalar("text".to_string()));

        assert_eq!(reg.get(1).unwrap().value(), None);
        assert_eq!(reg.get(2).unwrap().value(), Some("text"));
        let ids: Vec<usize> = reg.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_clear() {
        let mut reg = AnchorRegistry::new();
        reg.declare("a");
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.declare("b"), 1);
    }
}
