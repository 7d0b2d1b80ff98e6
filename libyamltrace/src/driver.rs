//! YAML front end: feeds `saphyr-parser` events to an [`EventHandler`].
//!
//! saphyr reports anchors as numeric ids on the anchored node, so the anchor
//! name is recovered from the source text just before the node. Ids are
//! renumbered per document in declaration order, which is what the handler's
//! registry expects.

use std::collections::HashMap;

use log::debug;
use saphyr_parser::{Event, Marker, Parser, ScalarStyle, Span};

use crate::error::{ParseContext, Result, TraceError};
use crate::event::{EventHandler, Mark};

/// Tag shown for untagged plain scalars and collections.
pub const NON_SPECIFIC_TAG: &str = "?";

/// Tag shown for untagged quoted and block scalars.
pub const NON_PLAIN_TAG: &str = "!";

/// How far back from a node to look for its `&anchor`.
const ANCHOR_LOOKBEHIND: usize = 200;

/// Parse `source` and deliver every event to `handler`.
///
/// Stops at the first parser or handler error.
pub fn drive<H: EventHandler>(source: &str, ctx: &ParseContext, handler: &mut H) -> Result<()> {
    let mut adapter = Adapter::new(source);
    for result in Parser::new_from_str(source) {
        let (event, span) = result.map_err(|e| {
            TraceError::Syntax(e.info().to_string(), ctx.loc_suffix(to_mark(e.marker())))
        })?;
        adapter.dispatch(event, &span, handler)?;
    }
    debug!("event stream exhausted");
    Ok(())
}

fn to_mark(marker: &Marker) -> Mark {
    // saphyr lines are 1-based
    Mark::new(marker.index(), marker.line().saturating_sub(1), marker.col())
}

/// Plain, untagged scalars that denote null.
fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

fn explicit_tag(handle: &str, suffix: &str) -> String {
    format!("{}{}", handle, suffix)
}

struct Adapter<'a> {
    source: &'a str,
    /// Char index -> byte index, with one trailing entry for end of input.
    char_to_byte: Vec<usize>,
    /// Parser anchor id -> declaration order in the current document.
    anchor_ids: HashMap<usize, usize>,
}

impl<'a> Adapter<'a> {
    fn new(source: &'a str) -> Self {
        let mut char_to_byte: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(source.len());
        Self {
            source,
            char_to_byte,
            anchor_ids: HashMap::new(),
        }
    }

    fn to_byte(&self, char_idx: usize) -> usize {
        self.char_to_byte
            .get(char_idx)
            .copied()
            .unwrap_or(self.source.len())
    }

    fn dispatch<H: EventHandler>(
        &mut self,
        event: Event<'_>,
        span: &Span,
        handler: &mut H,
    ) -> Result<()> {
        let mark = to_mark(&span.start);
        match event {
            Event::DocumentStart(_) => {
                self.anchor_ids.clear();
                handler.on_document_start(mark)
            }
            Event::DocumentEnd => handler.on_document_end(),
            Event::Alias(id) => {
                // unknown ids become 0, which never names an anchor
                let order = self.anchor_ids.get(&id).copied().unwrap_or(0);
                handler.on_alias(mark, order)
            }
            Event::Scalar(value, style, anchor_id, tag) => {
                self.declare_anchor(anchor_id, span.start.index(), mark, handler)?;
                let plain = matches!(style, ScalarStyle::Plain);
                match tag {
                    Some(tag) => {
                        let tag = explicit_tag(&tag.handle, &tag.suffix);
                        handler.on_scalar(mark, &tag, &value)
                    }
                    None if plain && is_null(&value) => handler.on_null(mark),
                    None if plain => handler.on_scalar(mark, NON_SPECIFIC_TAG, &value),
                    None => handler.on_scalar(mark, NON_PLAIN_TAG, &value),
                }
            }
            Event::SequenceStart(anchor_id, tag) => {
                self.declare_anchor(anchor_id, span.start.index(), mark, handler)?;
                let tag = tag.map_or_else(
                    || NON_SPECIFIC_TAG.to_string(),
                    |t| explicit_tag(&t.handle, &t.suffix),
                );
                handler.on_sequence_start(mark, &tag)
            }
            Event::SequenceEnd => handler.on_sequence_end(),
            Event::MappingStart(anchor_id, tag) => {
                self.declare_anchor(anchor_id, span.start.index(), mark, handler)?;
                let tag = tag.map_or_else(
                    || NON_SPECIFIC_TAG.to_string(),
                    |t| explicit_tag(&t.handle, &t.suffix),
                );
                handler.on_map_start(mark, &tag)
            }
            Event::MappingEnd => handler.on_map_end(),
            // stream boundaries carry nothing to trace
            _ => Ok(()),
        }
    }

    fn declare_anchor<H: EventHandler>(
        &mut self,
        anchor_id: usize,
        node_start: usize,
        mark: Mark,
        handler: &mut H,
    ) -> Result<()> {
        if anchor_id == 0 {
            return Ok(());
        }
        let order = self.anchor_ids.len() + 1;
        let name = self
            .anchor_name(node_start)
            .unwrap_or_else(|| fallback_anchor_name(order));
        handler.on_anchor(mark, &name)?;
        self.anchor_ids.insert(anchor_id, order);
        Ok(())
    }

    /// Find the `&name` that precedes the node starting at char `node_start`.
    fn anchor_name(&self, node_start: usize) -> Option<String> {
        let start = self.to_byte(node_start);
        if let Some(rest) = self.source[start..].strip_prefix('&') {
            return take_name(rest);
        }

        let mut search_start = start.saturating_sub(ANCHOR_LOOKBEHIND);
        while !self.source.is_char_boundary(search_start) {
            search_start -= 1;
        }
        let region = &self.source[search_start..start];
        let amp = region.rfind('&')?;
        take_name(&region[amp + 1..])
    }
}

/// Name for an anchor whose `&name` could not be found in the source.
fn fallback_anchor_name(order: usize) -> String {
    format!("anchor{}", order)
}

fn take_name(text: &str) -> Option<String> {
    let name: String = text.chars().take_while(|c| is_anchor_char(*c)).collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records notifications as short strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn on_document_start(&mut self, _mark: Mark) -> Result<()> {
            self.events.push("doc".to_string());
            Ok(())
        }

        fn on_document_end(&mut self) -> Result<()> {
            self.events.push("/doc".to_string());
            Ok(())
        }

        fn on_null(&mut self, _mark: Mark) -> Result<()> {
            self.events.push("null".to_string());
            Ok(())
        }

        fn on_alias(&mut self, _mark: Mark, id: usize) -> Result<()> {
            self.events.push(format!("*{}", id));
            Ok(())
        }

        fn on_anchor(&mut self, _mark: Mark, name: &str) -> Result<()> {
            self.events.push(format!("&{}", name));
            Ok(())
        }

        fn on_scalar(&mut self, _mark: Mark, tag: &str, value: &str) -> Result<()> {
            self.events.push(format!("{} {}", tag, value));
            Ok(())
        }

        fn on_sequence_start(&mut self, _mark: Mark, tag: &str) -> Result<()> {
            self.events.push(format!("[{}", tag));
            Ok(())
        }

        fn on_sequence_end(&mut self) -> Result<()> {
            self.events.push("]".to_string());
            Ok(())
        }

        fn on_map_start(&mut self, _mark: Mark, tag: &str) -> Result<()> {
            self.events.push(format!("{{{}", tag));
            Ok(())
        }

        fn on_map_end(&mut self) -> Result<()> {
            self.events.push("}".to_string());
            Ok(())
        }
    }

    fn record(source: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        drive(source, &ParseContext::new(None), &mut recorder).unwrap();
        recorder.events
    }

    #[test]
    fn test_map_and_sequence() {
        assert_eq!(
            record("a: 1\nb: [x, y]\n"),
            vec!["doc", "{?", "? a", "? 1", "? b", "[?", "? x", "? y", "]", "}", "/doc"]
        );
    }

    #[test]
    fn test_anchor_names_and_alias_order() {
        assert_eq!(
            record("anchor1: &X hello\nref: *X\n"),
            vec!["doc", "{?", "? anchor1", "&X", "? hello", "? ref", "*1", "}", "/doc"]
        );
    }

    #[test]
    fn test_alias_ids_restart_per_document() {
        let events = record("a: &x 1\n---\nb: &y 2\nc: *y\n");
        assert!(events.contains(&"&y".to_string()));
        assert_eq!(events.iter().filter(|e| *e == "*1").count(), 1);
    }

    #[test]
    fn test_nulls_and_quoting() {
        assert_eq!(
            record("a:\nb: ~\nc: 'null'\nd: \"text\"\n"),
            vec![
                "doc", "{?", "? a", "null", "? b", "null", "? c", "! null", "? d", "! text", "}",
                "/doc"
            ]
        );
    }

    #[test]
    fn test_local_tag() {
        let events = record("v: !custom value\n");
        assert!(events.contains(&"!custom value".to_string()));
    }

    #[test]
    fn test_syntax_error() {
        let mut recorder = Recorder::default();
        let err = drive("a: [1, 2", &ParseContext::new(None), &mut recorder).unwrap_err();
        assert!(matches!(err, TraceError::Syntax(..)));
    }

    #[test]
    fn test_fallback_name_uses_document_order() {
        // ids keep counting across documents, names restart with the document
        let mut recorder = Recorder::default();
        let mut adapter = Adapter::new("no anchors here");
        adapter.declare_anchor(7, 3, Mark::default(), &mut recorder).unwrap();
        adapter.declare_anchor(9, 6, Mark::default(), &mut recorder).unwrap();
        assert_eq!(recorder.events, vec!["&anchor1", "&anchor2"]);
        assert_eq!(adapter.anchor_ids.get(&9), Some(&2));
        assert_eq!(fallback_anchor_name(3), "anchor3");
    }

    #[test]
    fn test_take_name() {
        assert_eq!(take_name("base\n  x: 1"), Some("base".to_string()));
        assert_eq!(take_name("a1, b"), Some("a1".to_string()));
        assert_eq!(take_name(" x"), None);
    }
}
