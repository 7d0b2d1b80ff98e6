//! Trace configuration.

/// Spaces per nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 3;

/// What to do when an anchor is attached to a sequence or map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositeAnchors {
    /// Record a warning and keep tracing. A later alias to the anchor fails.
    #[default]
    Warn,
    /// Fail as soon as the container starts.
    Deny,
}

/// Options controlling trace rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOptions {
    pub indent_width: usize,
    pub composite_anchors: CompositeAnchors,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            composite_anchors: CompositeAnchors::default(),
        }
    }
}

impl TraceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_composite_anchors(mut self, policy: CompositeAnchors) -> Self {
        self.composite_anchors = policy;
        self
    }

    /// Indentation prefix for `depth` levels.
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width * depth)
    }
}
