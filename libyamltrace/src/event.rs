//! Notification interface between a streaming parser and a trace sink.
//!
//! A push parser calls one method per structural notification, in document
//! order. Every method returns `Result` so the sink can stop the parse as soon
//! as the stream stops making sense; the parser is expected not to deliver
//! further notifications for the document once an error has been returned.

use std::fmt;

use crate::error::Result;

/// Source position of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mark {
    /// Character offset from the start of the input.
    pub index: usize,
    /// Zero-based line.
    pub line: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Mark {
    pub fn new(index: usize, line: usize, col: usize) -> Self {
        Self { index, line, col }
    }
}

/// Kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Sequence,
    Map,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Sequence => f.write_str("sequence"),
            ContainerKind::Map => f.write_str("map"),
        }
    }
}

/// Capability set a push parser drives.
pub trait EventHandler {
    fn on_document_start(&mut self, mark: Mark) -> Result<()>;

    fn on_document_end(&mut self) -> Result<()>;

    fn on_null(&mut self, mark: Mark) -> Result<()>;

    /// Reference to the `id`-th anchor declared in the current document
    /// (1-based).
    fn on_alias(&mut self, mark: Mark, id: usize) -> Result<()>;

    /// Anchor declared on the node delivered by the next notification.
    fn on_anchor(&mut self, mark: Mark, name: &str) -> Result<()>;

    fn on_scalar(&mut self, mark: Mark, tag: &str, value: &str) -> Result<()>;

    fn on_sequence_start(&mut self, mark: Mark, tag: &str) -> Result<()>;

    fn on_sequence_end(&mut self) -> Result<()>;

    fn on_map_start(&mut self, mark: Mark, tag: &str) -> Result<()>;

    fn on_map_end(&mut self) -> Result<()>;
}
