//! Error types for event tracing.

use thiserror::Error;

use crate::event::{ContainerKind, Mark};

/// Result type for tracing operations.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Trace context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new trace context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, mark: Mark) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", mark.line + 1, mark.col + 1, name),
            None => format!(" at {}:{}", mark.line + 1, mark.col + 1),
        }
    }
}

/// Error type for event tracing.
#[derive(Error, Debug)]
pub enum TraceError {
    /// A notification arrived out of order.
    #[error("Malformed event stream: {0}{1}")]
    MalformedEventStream(String, String),

    /// Alias to an anchor id that was never declared.
    #[error("Alias *{id} does not refer to a declared anchor ({registered} registered){location}")]
    OutOfRangeAlias {
        id: usize,
        registered: usize,
        location: String,
    },

    /// Anchor attached to a sequence or map.
    #[error("Anchor &{name} is attached to a {kind}; only scalar anchors can be traced{location}")]
    UnsupportedAnchorTarget {
        name: String,
        kind: ContainerKind,
        location: String,
    },

    /// The YAML parser rejected the input.
    #[error("YAML syntax error: {0}{1}")]
    Syntax(String, String),

    /// Writing the trace failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Create a malformed-stream error located at `mark`.
    pub fn malformed(ctx: &ParseContext, message: impl Into<String>, mark: Mark) -> Self {
        TraceError::MalformedEventStream(message.into(), ctx.loc_suffix(mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_suffix_without_filename() {
        let ctx = ParseContext::new(None);
        assert_eq!(ctx.loc_suffix(Mark::new(0, 2, 4)), " at 3:5");
    }

    #[test]
    fn test_loc_suffix_with_filename() {
        let ctx = ParseContext::new(Some("doc.yaml"));
        assert_eq!(ctx.loc_suffix(Mark::new(0, 0, 0)), " at 1:1 of <doc.yaml>");
    }

    #[test]
    fn test_messages() {
        let ctx = ParseContext::new(None);
        let err = TraceError::malformed(&ctx, "sequence end without a sequence", Mark::new(0, 1, 0));
        assert_eq!(
            err.to_string(),
            "Malformed event stream: sequence end without a sequence at 2:1"
        );

        let err = TraceError::OutOfRangeAlias {
            id: 5,
            registered: 2,
            location: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Alias *5 does not refer to a declared anchor (2 registered)"
        );

        let err = TraceError::UnsupportedAnchorTarget {
            name: "base".to_string(),
            kind: ContainerKind::Map,
            location: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Anchor &base is attached to a map; only scalar anchors can be traced"
        );
    }
}
