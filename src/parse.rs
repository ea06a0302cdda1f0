//! Structural scan of a line range into work units.
//!
//! A single forward pass tracks the open markup regions on a stack of
//! [`Frame`]s and emits [`WorkUnit`]s in document order: one per paragraph
//! (or per line in line-oriented regions) and one per markup boundary.
//! Margins are resolved here so the flow pass only does arithmetic.

use std::ops::Range;

use crate::{
    buffer::TextBuffer,
    config::{MarkupKind, ReflowConfig},
    error::ReflowError,
    markup::{self, Marker, Mode},
    tokenize::{leading_spaces, logical_width},
};

/// What a [`WorkUnit`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Paragraph,
    MarkupStart,
    MarkupEnd,
}

/// One parsed segment of the range.
///
/// Line numbers are 0-based buffer indices and `last_line` is inclusive.
/// Indents are absolute columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub kind: UnitKind,
    /// Region the unit belongs to (for markers, the region they open or
    /// close); `None` at the top level.
    pub code: Option<MarkupKind>,
    pub first_line: usize,
    pub last_line: usize,
    pub first_indent: usize,
    pub left_indent: usize,
    pub right_indent: usize,
    /// Least leading whitespace seen so far in the region, ignoring poetry
    /// and list lines that already start inside the left margin. On a
    /// `MarkupEnd` this is the final value for the whole region.
    pub min_indent_seen: usize,
    pub preceding_blanks: usize,
}

/// Parsing state of one open region.
#[derive(Debug, Clone)]
struct Frame {
    scanning: bool,
    code: Option<MarkupKind>,
    first_indent: usize,
    left_indent: usize,
    right_indent: usize,
    min_indent_seen: Option<usize>,
    blank_count: usize,
    open_line: usize,
}

impl Frame {
    fn top(start: usize) -> Self {
        Self {
            scanning: true,
            code: None,
            first_indent: 0,
            left_indent: 0,
            right_indent: 0,
            min_indent_seen: None,
            blank_count: 0,
            open_line: start,
        }
    }

    fn mode(&self) -> Mode { Mode::of(self.code) }

    fn allows_nesting(&self) -> bool { self.code.is_none_or(MarkupKind::allows_nesting) }

    fn closed_by(&self, code: &str) -> bool { self.code.is_some_and(|kind| markup::closes(code, kind)) }

    fn see_indent(&mut self, indent: usize) {
        self.min_indent_seen = Some(self.min_indent_seen.map_or(indent, |m| m.min(indent)));
    }

    fn unit(&self, kind: UnitKind, lines: Range<usize>) -> WorkUnit {
        WorkUnit {
            kind,
            code: self.code,
            first_line: lines.start,
            last_line: lines.end - 1,
            first_indent: self.first_indent,
            left_indent: self.left_indent,
            right_indent: self.right_indent,
            min_indent_seen: self.min_indent_seen.unwrap_or(0),
            preceding_blanks: self.blank_count,
        }
    }
}

/// A paragraph being collected.
#[derive(Debug, Clone, Copy)]
struct Open {
    first_line: usize,
    min_indent: usize,
}

struct Parser<'c> {
    config: &'c ReflowConfig,
    frame: Frame,
    stack: Vec<Frame>,
    paragraph: Option<Open>,
    units: Vec<WorkUnit>,
}

impl<'c> Parser<'c> {
    fn new(config: &'c ReflowConfig, start: usize) -> Self {
        Self {
            config,
            frame: Frame::top(start),
            stack: Vec::new(),
            paragraph: None,
            units: Vec::new(),
        }
    }

    fn line(&mut self, idx: usize, line: &str) -> Result<(), ReflowError> {
        let blank = line.trim().is_empty();
        if !self.frame.scanning {
            if blank {
                self.close_paragraph(idx);
                self.frame.blank_count = 1;
                return Ok(());
            }
            match markup::classify(line) {
                Some(Marker::Close(code)) if self.frame.closed_by(code) => {
                    self.close_paragraph(idx);
                    return self.close_markup(idx, line);
                }
                Some(Marker::Close(_)) if self.frame.allows_nesting() => {
                    return Err(ReflowError::Unmatched {
                        line: idx + 1,
                        marker: line.trim().to_string(),
                    });
                }
                Some(Marker::Open { kind, margins, .. }) if self.frame.allows_nesting() => {
                    self.close_paragraph(idx);
                    self.open_markup(idx, kind, margins);
                    return Ok(());
                }
                _ => {
                    let indent = leading_spaces(line);
                    if let Some(open) = self.paragraph.as_mut() {
                        open.min_indent = open.min_indent.min(indent);
                    }
                    self.frame.see_indent(indent);
                    return Ok(());
                }
            }
        }

        if blank {
            self.frame.blank_count += 1;
            return Ok(());
        }
        match markup::classify(line) {
            Some(Marker::Close(code)) if self.frame.closed_by(code) => {
                return self.close_markup(idx, line);
            }
            Some(Marker::Close(_)) if self.frame.allows_nesting() => {
                return Err(ReflowError::Unmatched {
                    line: idx + 1,
                    marker: line.trim().to_string(),
                });
            }
            Some(Marker::Open { kind, margins, .. }) if self.frame.allows_nesting() => {
                self.open_markup(idx, kind, margins);
                return Ok(());
            }
            _ => {}
        }
        self.text_line(idx, line);
        Ok(())
    }

    fn text_line(&mut self, idx: usize, line: &str) {
        let indent = leading_spaces(line);
        match self.frame.mode() {
            Mode::Paragraph => {
                self.frame.scanning = false;
                self.frame.see_indent(indent);
                self.paragraph = Some(Open {
                    first_line: idx,
                    min_indent: indent,
                });
            }
            // Table bodies are handed to the table parser as a whole.
            Mode::Table => self.frame.blank_count = 0,
            mode => {
                // Wrapped lines already inside the margin keep their column,
                // so only the others set the region's baseline.
                if mode != Mode::Wrapped || indent < self.frame.left_indent {
                    self.frame.see_indent(indent);
                }
                let mut unit = self.frame.unit(UnitKind::Paragraph, idx..idx + 1);
                match mode {
                    Mode::Wrapped => {}
                    Mode::Fixed => {
                        unit.first_indent = self.frame.left_indent + indent;
                        unit.left_indent = unit.first_indent;
                    }
                    Mode::Centered => {
                        let avail = self
                            .config
                            .line_width
                            .saturating_sub(self.frame.left_indent + self.frame.right_indent);
                        let width = logical_width(line.trim(), &self.config.tags);
                        unit.first_indent = self.frame.left_indent + avail.saturating_sub(width) / 2;
                        unit.left_indent = unit.first_indent;
                    }
                    _ => {
                        unit.first_indent = indent;
                        unit.left_indent = indent;
                    }
                }
                self.units.push(unit);
                self.frame.blank_count = 0;
            }
        }
    }

    /// Emit the paragraph being collected, which ends before line `end`.
    fn close_paragraph(&mut self, end: usize) {
        let Some(open) = self.paragraph.take() else {
            return;
        };
        let mut unit = self.frame.unit(UnitKind::Paragraph, open.first_line..end);
        unit.min_indent_seen = open.min_indent;
        self.units.push(unit);
        self.frame.scanning = true;
        self.frame.blank_count = 0;
    }

    fn open_markup(&mut self, idx: usize, kind: MarkupKind, margins: Option<&str>) {
        let mut defaults = self.config.margins(kind);
        if let Some(over) = margins {
            defaults = defaults.overridden_by(over);
        }
        let left_indent = self.frame.left_indent + defaults.left;
        let first_indent = left_indent.saturating_add_signed(defaults.first);
        let frame = Frame {
            scanning: true,
            code: Some(kind),
            first_indent,
            left_indent,
            right_indent: self.frame.right_indent + defaults.right,
            min_indent_seen: None,
            blank_count: 0,
            open_line: idx,
        };
        let mut start = frame.unit(UnitKind::MarkupStart, idx..idx + 1);
        start.preceding_blanks = self.frame.blank_count;
        tracing::debug!(line = idx + 1, %kind, left_indent, first_indent, "open markup");
        self.units.push(start);
        self.frame.blank_count = 0;
        self.stack.push(std::mem::replace(&mut self.frame, frame));
    }

    fn close_markup(&mut self, idx: usize, line: &str) -> Result<(), ReflowError> {
        let Some(parent) = self.stack.pop() else {
            return Err(ReflowError::Unmatched {
                line: idx + 1,
                marker: line.trim().to_string(),
            });
        };
        let end = self.frame.unit(UnitKind::MarkupEnd, idx..idx + 1);
        tracing::debug!(line = idx + 1, min_indent = end.min_indent_seen, "close markup");
        self.units.push(end);
        self.frame = parent;
        self.frame.blank_count = 0;
        Ok(())
    }

    fn finish(mut self, end: usize) -> Result<Vec<WorkUnit>, ReflowError> {
        self.close_paragraph(end);
        if let Some(kind) = self.frame.code {
            return Err(ReflowError::Unclosed {
                line: self.frame.open_line + 1,
                marker: kind.to_string(),
            });
        }
        Ok(self.units)
    }
}

/// Scan `range` of `buffer` into work units.
///
/// # Errors
///
/// Fails when the range lies outside the buffer, when a closer has no open
/// region, or when a region is still open at the end of the range. No
/// units are returned on failure.
pub fn parse<B: TextBuffer + ?Sized>(
    buffer: &B,
    range: Range<usize>,
    config: &ReflowConfig,
) -> Result<Vec<WorkUnit>, ReflowError> {
    if range.start > range.end || range.end > buffer.line_count() {
        return Err(ReflowError::OutOfRange {
            start: range.start,
            end: range.end,
            len: buffer.line_count(),
        });
    }
    let mut parser = Parser::new(config, range.start);
    for idx in range.clone() {
        parser.line(idx, buffer.line(idx).unwrap_or_default())?;
    }
    parser.finish(range.end)
}
