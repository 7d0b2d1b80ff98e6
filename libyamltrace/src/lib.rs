//! Streaming YAML event tracer.
//!
//! Prints an indented, annotated trace of a YAML document while its events
//! arrive from a push parser, without ever building the document tree. Only
//! as much context is kept as the trace needs: the open containers, whether
//! the next node is a map key or value, the key waiting for its value, and the
//! anchors declared so far so that aliases can be resolved.
//!
//! # Pipeline
//!
//! 1. **Parser**: `saphyr-parser` turns source text into YAML events.
//!
//! 2. **Driver**: maps each event onto an [`EventHandler`] notification,
//!    recovering anchor names and rendering tags.
//!
//! 3. **Handler**: [`TraceHandler`] updates its structural state and anchor
//!    registry and writes trace lines to any [`std::io::Write`] sink.

mod anchor;
mod driver;
mod error;
mod event;
mod handler;
mod options;
mod state;

use std::io::Write;

pub use anchor::{Anchor, AnchorRegistry, AnchorTarget};
pub use driver::{drive, NON_PLAIN_TAG, NON_SPECIFIC_TAG};
pub use error::{ParseContext, Result, TraceError};
pub use event::{ContainerKind, EventHandler, Mark};
pub use handler::TraceHandler;
pub use options::{CompositeAnchors, TraceOptions, DEFAULT_INDENT_WIDTH};
pub use state::{Position, StructuralState};

/// Outcome of a successful trace.
#[derive(Debug, Default)]
pub struct TraceReport {
    /// Documents traced.
    pub documents: usize,
    /// Non-fatal conditions, such as anchors on containers.
    pub warnings: Vec<TraceError>,
}

/// Trace every document of a YAML stream into `out`.
///
/// # Example
///
/// ```
/// use libyamltrace::{trace, TraceOptions};
///
/// let mut out = Vec::new();
/// trace("a: 1\n", &TraceOptions::default(), &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "?\n   ? a : 1\n\n");
/// ```
pub fn trace<W: Write>(input: &str, options: &TraceOptions, out: W) -> Result<TraceReport> {
    trace_with_filename(input, None, options, out)
}

/// Trace a YAML stream with a filename for error messages.
///
/// On error, lines already written to `out` stay there.
pub fn trace_with_filename<W: Write>(
    input: &str,
    filename: Option<&str>,
    options: &TraceOptions,
    out: W,
) -> Result<TraceReport> {
    let ctx = ParseContext::new(filename);
    let mut handler = TraceHandler::with_context(out, options.clone(), ctx.clone());
    drive(input, &ctx, &mut handler)?;
    let documents = handler.documents();
    let (_, warnings) = handler.into_parts();
    Ok(TraceReport {
        documents,
        warnings,
    })
}

/// Trace a YAML stream with default options and return the text.
pub fn trace_to_string(input: &str) -> Result<String> {
    let mut out = Vec::new();
    trace(input, &TraceOptions::default(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
