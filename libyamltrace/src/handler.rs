//! The trace-writing event handler.
//!
//! Every line is indented by the number of open containers at the moment it
//! is written. Map keys are held back and printed together with their value:
//!
//! ```text
//! ?
//!    ? name : demo
//!    ? tags :
//!       ? x
//!       ? y
//! ```
//!
//! A sequence that is the value of a map entry prints the entry's key one
//! level up, just before its first child.

use std::borrow::Cow;
use std::io::Write;

use log::{debug, trace, warn};

use crate::anchor::{AnchorRegistry, AnchorTarget};
use crate::error::{ParseContext, Result, TraceError};
use crate::event::{ContainerKind, EventHandler, Mark};
use crate::options::{CompositeAnchors, TraceOptions};
use crate::state::{Position, SequenceLabel, StructuralState};

/// Event handler that writes an indented trace to `W`.
pub struct TraceHandler<W: Write> {
    out: W,
    options: TraceOptions,
    ctx: ParseContext,
    state: StructuralState,
    anchors: AnchorRegistry,
    warnings: Vec<TraceError>,
    documents: usize,
    last_mark: Mark,
}

impl<W: Write> TraceHandler<W> {
    pub fn new(out: W, options: TraceOptions) -> Self {
        Self::with_context(out, options, ParseContext::default())
    }

    /// Create a handler whose error messages name the traced file.
    pub fn with_context(out: W, options: TraceOptions, ctx: ParseContext) -> Self {
        Self {
            out,
            options,
            ctx,
            state: StructuralState::new(),
            anchors: AnchorRegistry::new(),
            warnings: Vec::new(),
            documents: 0,
            last_mark: Mark::default(),
        }
    }

    pub fn state(&self) -> &StructuralState {
        &self.state
    }

    /// Anchors declared in the current (or last) document.
    pub fn anchors(&self) -> &AnchorRegistry {
        &self.anchors
    }

    /// Non-fatal conditions met so far.
    pub fn warnings(&self) -> &[TraceError] {
        &self.warnings
    }

    /// Number of documents started.
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the handler, returning the sink and the collected warnings.
    pub fn into_parts(self) -> (W, Vec<TraceError>) {
        (self.out, self.warnings)
    }

    fn line(&mut self, depth: usize, text: &str) -> Result<()> {
        writeln!(self.out, "{}{}", self.options.indent(depth), text)?;
        Ok(())
    }

    fn malformed(&self, message: impl Into<String>, mark: Mark) -> TraceError {
        TraceError::malformed(&self.ctx, message, mark)
    }

    fn check_document(&self, mark: Mark, what: &str) -> Result<()> {
        if self.state.in_document() {
            Ok(())
        } else {
            Err(self.malformed(format!("{} outside of a document", what), mark))
        }
    }

    /// End notifications must not leave an anchor without its node.
    fn check_no_pending_anchor(&self, what: &str) -> Result<()> {
        match self.state.pending_anchor() {
            Some(id) => {
                let name = self.anchor_name(id);
                Err(self.malformed(
                    format!("{} while anchor &{} has no node", what, name),
                    self.last_mark,
                ))
            }
            None => Ok(()),
        }
    }

    fn anchor_name(&self, id: usize) -> String {
        self.anchors
            .get(id)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }

    /// Print the key line the innermost sequence still owes.
    fn flush_label(&mut self) -> Result<()> {
        if let Some(SequenceLabel { tag, key }) = self.state.take_label() {
            let depth = self.state.depth().saturating_sub(1);
            self.line(depth, &format!("{} {} :", tag, key))?;
        }
        Ok(())
    }

    fn begin_node(&mut self, mark: Mark, what: &str) -> Result<Position> {
        self.last_mark = mark;
        self.check_document(mark, what)?;
        self.flush_label()?;
        Ok(self.state.position())
    }

    fn capture_anchor(&mut self, value: &str) {
        if let Some(id) = self.state.take_anchor() {
            trace!("anchor &{} = {:?}", self.anchor_name(id), value);
            self.anchors
                .complete(id, AnchorTarget::Scalar(value.to_string()));
        }
    }

    fn anchor_container(&mut self, mark: Mark, kind: ContainerKind) -> Result<()> {
        let Some(id) = self.state.take_anchor() else {
            return Ok(());
        };
        self.anchors.complete(id, AnchorTarget::Composite(kind));
        let err = TraceError::UnsupportedAnchorTarget {
            name: self.anchor_name(id),
            kind,
            location: self.ctx.loc_suffix(mark),
        };
        match self.options.composite_anchors {
            CompositeAnchors::Warn => {
                warn!("{}", err);
                self.warnings.push(err);
                Ok(())
            }
            CompositeAnchors::Deny => Err(err),
        }
    }

    fn resolve(&self, mark: Mark, id: usize) -> Result<String> {
        let Some(anchor) = self.anchors.get(id) else {
            return Err(TraceError::OutOfRangeAlias {
                id,
                registered: self.anchors.len(),
                location: self.ctx.loc_suffix(mark),
            });
        };
        match &anchor.target {
            AnchorTarget::Scalar(value) => Ok(value.clone()),
            AnchorTarget::Composite(kind) => Err(TraceError::UnsupportedAnchorTarget {
                name: anchor.name.clone(),
                kind: *kind,
                location: self.ctx.loc_suffix(mark),
            }),
            AnchorTarget::Pending => Err(self.malformed(
                format!("alias to anchor &{} before its node", anchor.name),
                mark,
            )),
        }
    }

    /// Write a leaf node already rendered as `text`.
    ///
    /// `tag` prefixes the line when non-empty. Keys are only stored.
    fn leaf(&mut self, position: Position, tag: &str, text: &str) -> Result<()> {
        let text = single_line(text);
        let depth = self.state.depth();
        let prefix = if tag.is_empty() {
            String::new()
        } else {
            format!("{} ", tag)
        };
        match position {
            Position::Key => {
                self.state.set_key(text.into_owned());
                return Ok(());
            }
            Position::Value => {
                let line = format!("{}{} : {}", prefix, self.state.pending_key(), text);
                self.line(depth, &line)?;
            }
            Position::Element | Position::Root => {
                self.line(depth, &format!("{}{}", prefix, text))?;
            }
        }
        self.state.value_done();
        Ok(())
    }
}

/// Escape line breaks so a multi-line scalar stays on one trace line.
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\n', '\r']) {
        Cow::Owned(text.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(text)
    }
}

impl<W: Write> EventHandler for TraceHandler<W> {
    fn on_document_start(&mut self, mark: Mark) -> Result<()> {
        self.last_mark = mark;
        if self.state.in_document() {
            return Err(self.malformed("document start inside an open document", mark));
        }
        self.state.begin_document();
        self.anchors.clear();
        self.documents += 1;
        debug!("document {} started at line {}", self.documents, mark.line + 1);
        Ok(())
    }

    fn on_document_end(&mut self) -> Result<()> {
        self.check_document(self.last_mark, "document end")?;
        self.check_no_pending_anchor("document end")?;
        let depth = self.state.depth();
        if depth > 0 {
            return Err(self.malformed(
                format!("document ended with {} open container(s)", depth),
                self.last_mark,
            ));
        }
        writeln!(self.out)?;
        self.out.flush()?;
        self.state.end_document();
        if log::log_enabled!(log::Level::Debug) {
            let names: Vec<String> = self
                .anchors
                .iter()
                .map(|(id, a)| format!("{}=&{}", id, a.name))
                .collect();
            debug!(
                "document {} ended, anchors: [{}]",
                self.documents,
                names.join(", ")
            );
        }
        Ok(())
    }

    fn on_null(&mut self, mark: Mark) -> Result<()> {
        trace!("null");
        let position = self.begin_node(mark, "null")?;
        self.capture_anchor("null");
        self.leaf(position, "", "null")
    }

    fn on_alias(&mut self, mark: Mark, id: usize) -> Result<()> {
        trace!("alias *{}", id);
        self.last_mark = mark;
        self.check_document(mark, "alias")?;
        if let Some(pending) = self.state.pending_anchor() {
            return Err(self.malformed(
                format!("alias cannot carry anchor &{}", self.anchor_name(pending)),
                mark,
            ));
        }
        let value = self.resolve(mark, id)?;
        let position = self.begin_node(mark, "alias")?;
        self.leaf(position, "", &format!("*{}", value))
    }

    fn on_anchor(&mut self, mark: Mark, name: &str) -> Result<()> {
        trace!("anchor &{}", name);
        self.last_mark = mark;
        self.check_document(mark, "anchor")?;
        if name.is_empty() {
            return Err(self.malformed("anchor with an empty name", mark));
        }
        if let Some(pending) = self.state.pending_anchor() {
            return Err(self.malformed(
                format!(
                    "anchor &{} declared while &{} has no node",
                    name,
                    self.anchor_name(pending)
                ),
                mark,
            ));
        }
        let id = self.anchors.declare(name);
        self.state.set_anchor(id);
        Ok(())
    }

    fn on_scalar(&mut self, mark: Mark, tag: &str, value: &str) -> Result<()> {
        trace!("scalar {} {:?}", tag, value);
        let position = self.begin_node(mark, "scalar")?;
        self.capture_anchor(value);
        self.leaf(position, tag, value)
    }

    fn on_sequence_start(&mut self, mark: Mark, tag: &str) -> Result<()> {
        trace!("sequence start {}", tag);
        let position = self.begin_node(mark, "sequence start")?;
        self.anchor_container(mark, ContainerKind::Sequence)?;
        let label = match position {
            Position::Value => {
                let key = self.state.pending_key().to_string();
                self.state.value_done();
                Some(SequenceLabel {
                    tag: tag.to_string(),
                    key,
                })
            }
            Position::Key => {
                self.state.set_key("[...]");
                None
            }
            Position::Element | Position::Root => None,
        };
        self.state.push(ContainerKind::Sequence, label);
        Ok(())
    }

    fn on_sequence_end(&mut self) -> Result<()> {
        trace!("sequence end");
        self.check_document(self.last_mark, "sequence end")?;
        self.check_no_pending_anchor("sequence end")?;
        if !self.state.in_sequence() {
            return Err(self.malformed("sequence end without an open sequence", self.last_mark));
        }
        // an empty sequence still names its key
        self.flush_label()?;
        self.state.pop(ContainerKind::Sequence);
        Ok(())
    }

    fn on_map_start(&mut self, mark: Mark, tag: &str) -> Result<()> {
        trace!("map start {}", tag);
        let position = self.begin_node(mark, "map start")?;
        self.anchor_container(mark, ContainerKind::Map)?;
        let depth = self.state.depth();
        match position {
            Position::Value => {
                let line = format!("{} {} :", tag, self.state.pending_key());
                self.line(depth, &line)?;
                self.state.value_done();
            }
            Position::Key => {
                self.line(depth, tag)?;
                self.state.set_key("{...}");
            }
            Position::Element | Position::Root => self.line(depth, tag)?,
        }
        self.state.push(ContainerKind::Map, None);
        Ok(())
    }

    fn on_map_end(&mut self) -> Result<()> {
        trace!("map end");
        self.check_document(self.last_mark, "map end")?;
        self.check_no_pending_anchor("map end")?;
        if self.state.innermost() != Some(ContainerKind::Map) {
            return Err(self.malformed("map end without an open map", self.last_mark));
        }
        if !self.state.expect_key() {
            return Err(self.malformed(
                format!("key `{}` has no value", self.state.pending_key()),
                self.last_mark,
            ));
        }
        self.state.pop(ContainerKind::Map);
        Ok(())
    }
}
