//! Structural state tracker.
//!
//! Keeps one context frame per open container, so closing a child always
//! brings back the parent's key/value expectation exactly as it was.

use crate::event::ContainerKind;

/// Role of the next node, derived from the innermost open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Top-level node of the document.
    Root,
    /// Key of a map entry.
    Key,
    /// Value of a map entry.
    Value,
    /// Element of a sequence.
    Element,
}

/// Key line a sequence still owes before its first child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLabel {
    pub tag: String,
    pub key: String,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: ContainerKind,
    expect_key: bool,
    /// Key of this map awaiting its value.
    key: String,
    label: Option<SequenceLabel>,
}

#[derive(Debug, Default)]
pub struct StructuralState {
    frames: Vec<Frame>,
    in_document: bool,
    pending_anchor: Option<usize>,
}

impl StructuralState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything and open a new document.
    pub fn begin_document(&mut self) {
        *self = Self {
            in_document: true,
            ..Self::default()
        };
    }

    pub fn end_document(&mut self) {
        self.in_document = false;
    }

    pub fn in_document(&self) -> bool {
        self.in_document
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the next scalar in the innermost container is read as a key.
    ///
    /// Inside a sequence this is `false` only while the sequence still owes
    /// the line naming the key that owns it.
    pub fn expect_key(&self) -> bool {
        self.frames.last().map_or(true, |f| f.expect_key)
    }

    pub fn in_sequence(&self) -> bool {
        self.innermost() == Some(ContainerKind::Sequence)
    }

    pub fn innermost(&self) -> Option<ContainerKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub fn position(&self) -> Position {
        match self.frames.last() {
            None => Position::Root,
            Some(f) if f.kind == ContainerKind::Sequence => Position::Element,
            Some(f) if f.expect_key => Position::Key,
            Some(_) => Position::Value,
        }
    }

    /// Key of the innermost map awaiting its value.
    pub fn pending_key(&self) -> &str {
        self.frames.last().map_or("", |f| f.key.as_str())
    }

    /// Capture a map key; the innermost map now waits for its value.
    pub fn set_key(&mut self, key: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.key = key.into();
            frame.expect_key = false;
        }
    }

    /// The node in value (or element) position has been delivered.
    pub fn value_done(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.expect_key = true;
        }
    }

    pub fn push(&mut self, kind: ContainerKind, label: Option<SequenceLabel>) {
        self.frames.push(Frame {
            kind,
            expect_key: label.is_none(),
            key: String::new(),
            label,
        });
    }

    /// Close the innermost container if it has the given kind.
    ///
    /// Returns `false` (and leaves the stack untouched) on a mismatch.
    pub fn pop(&mut self, kind: ContainerKind) -> bool {
        match self.frames.last() {
            Some(f) if f.kind == kind => {
                self.frames.pop();
                true
            }
            _ => false,
        }
    }

    /// Take the key line the innermost sequence still owes, if any.
    pub fn take_label(&mut self) -> Option<SequenceLabel> {
        let frame = self.frames.last_mut()?;
        let label = frame.label.take()?;
        frame.expect_key = true;
        Some(label)
    }

    pub fn set_anchor(&mut self, id: usize) {
        self.pending_anchor = Some(id);
    }

    pub fn pending_anchor(&self) -> Option<usize> {
        self.pending_anchor
    }

    pub fn take_anchor(&mut self) -> Option<usize> {
        self.pending_anchor.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let mut state = StructuralState::new();
        state.begin_document();
        assert_eq!(state.position(), Position::Root);

        state.push(ContainerKind::Map, None);
        assert_eq!(state.position(), Position::Key);
        state.set_key("a");
        assert_eq!(state.position(), Position::Value);
        assert!(!state.expect_key());
        state.value_done();
        assert_eq!(state.position(), Position::Key);

        state.push(ContainerKind::Sequence, None);
        assert_eq!(state.position(), Position::Element);
        assert!(state.in_sequence());
        assert_eq!(state.depth(), 2);
    }

    #[test]
    fn test_pop_restores_parent() {
        let mut state = StructuralState::new();
        state.begin_document();
        state.push(ContainerKind::Map, None);
        state.set_key("outer");
        // sequence is the value of `outer`
        state.value_done();
        state.push(ContainerKind::Sequence, None);
        state.push(ContainerKind::Map, None);
        state.set_key("inner");

        assert!(state.pop(ContainerKind::Map));
        assert!(state.in_sequence());
        assert!(state.pop(ContainerKind::Sequence));
        assert_eq!(state.position(), Position::Key);
        assert!(state.expect_key());
    }

    #[test]
    fn test_pop_restores_parent_key() {
        let mut state = StructuralState::new();
        state.begin_document();
        state.push(ContainerKind::Map, None);
        state.set_key("{...}");
        state.push(ContainerKind::Map, None);
        state.set_key("x");
        assert_eq!(state.pending_key(), "x");
        state.value_done();
        assert!(state.pop(ContainerKind::Map));
        assert_eq!(state.pending_key(), "{...}");
        assert_eq!(state.position(), Position::Value);
    }

    #[test]
    fn test_pop_mismatch() {
        let mut state = StructuralState::new();
        state.begin_document();
        state.push(ContainerKind::Sequence, None);
        assert!(!state.pop(ContainerKind::Map));
        assert_eq!(state.depth(), 1);
        assert!(state.pop(ContainerKind::Sequence));
        assert!(!state.pop(ContainerKind::Sequence));
    }

    #[test]
    fn test_label() {
        let mut state = StructuralState::new();
        state.begin_document();
        state.push(ContainerKind::Map, None);
        state.set_key("tags");
        state.value_done();
        state.push(
            ContainerKind::Sequence,
            Some(SequenceLabel {
                tag: "?".to_string(),
                key: "tags".to_string(),
            }),
        );
        assert!(!state.expect_key());
        let label = state.take_label().unwrap();
        assert_eq!(label.key, "tags");
        assert!(state.expect_key());
        assert!(state.take_label().is_none());
    }

    #[test]
    fn test_begin_document_resets() {
        let mut state = StructuralState::new();
        state.begin_document();
        state.push(ContainerKind::Map, None);
        state.set_key("k");
        state.set_anchor(1);
        state.begin_document();
        assert_eq!(state.depth(), 0);
        assert_eq!(state.pending_key(), "");
        assert_eq!(state.pending_anchor(), None);
        assert!(state.in_document());
    }
}
