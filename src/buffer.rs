//! The host side of a reflow: a line-oriented buffer and a progress hook.
//!
//! Reflow reads lines by index and replaces contiguous spans of lines. All
//! replacements of one invocation happen between [`TextBuffer::begin_edit`]
//! and [`TextBuffer::end_edit`] so a host can present them as a single
//! undoable step. Indices are snapshots: the flow pass edits from the bottom
//! of the range upward so earlier indices never shift under it.

use std::ops::Range;

/// A line-oriented text buffer that reflow can read and edit.
pub trait TextBuffer {
    fn line_count(&self) -> usize;

    /// Text of line `index` without its terminator, or `None` past the end.
    fn line(&self, index: usize) -> Option<&str>;

    /// Replace the lines in `range` with `lines` as one atomic edit.
    fn replace_lines(&mut self, range: Range<usize>, lines: Vec<String>);

    /// Open the outer transaction grouping every replacement of a call.
    fn begin_edit(&mut self) {}

    /// Close the transaction opened by [`TextBuffer::begin_edit`].
    fn end_edit(&mut self) {}
}

/// An in-memory [`TextBuffer`] with whole-transaction undo.
///
/// # Examples
///
/// ```
/// use ppreflow::{TextBuffer, VecBuffer};
///
/// let mut buf = VecBuffer::from_text("a\nb\n");
/// buf.begin_edit();
/// buf.replace_lines(0..1, vec!["x".into(), "y".into()]);
/// buf.end_edit();
/// assert_eq!(buf.text(), "x\ny\nb\n");
/// assert!(buf.undo());
/// assert_eq!(buf.text(), "a\nb\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecBuffer {
    lines: Vec<String>,
    pending: Option<Vec<String>>,
    undo: Vec<Vec<String>>,
}

impl VecBuffer {
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self { Self::new(text.lines().map(str::to_string).collect()) }

    #[must_use]
    pub fn lines(&self) -> &[String] { &self.lines }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> { self.lines }

    /// The buffer as newline-terminated text.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    /// Number of completed transactions that can be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize { self.undo.len() }

    /// Revert the most recent transaction. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(lines) => {
                self.lines = lines;
                true
            }
            None => false,
        }
    }
}

impl TextBuffer for VecBuffer {
    fn line_count(&self) -> usize { self.lines.len() }

    fn line(&self, index: usize) -> Option<&str> { self.lines.get(index).map(String::as_str) }

    fn replace_lines(&mut self, range: Range<usize>, lines: Vec<String>) {
        if self.pending.is_none() {
            // An edit outside a transaction is its own undo step.
            self.undo.push(self.lines.clone());
        }
        self.lines.splice(range, lines);
    }

    fn begin_edit(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.lines.clone());
        }
    }

    fn end_edit(&mut self) {
        if let Some(before) = self.pending.take()
            && before != self.lines
        {
            self.undo.push(before);
        }
    }
}

/// Receives progress notifications from a long-running reflow.
///
/// Notifications are informational; a reflow cannot be cancelled once it has
/// started editing.
pub trait Progress {
    fn report(&mut self, done: usize, total: usize);
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn report(&mut self, done: usize, total: usize) { self(done, total); }
}

/// A [`Progress`] sink that discards notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _done: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_is_one_undo_step() {
        let mut buf = VecBuffer::from_text("a\nb\nc");
        buf.begin_edit();
        buf.replace_lines(2..3, vec!["C".into()]);
        buf.replace_lines(0..1, vec!["A".into(), "A2".into()]);
        buf.end_edit();
        assert_eq!(buf.lines(), ["A", "A2", "b", "C"]);
        assert_eq!(buf.undo_depth(), 1);
        assert!(buf.undo());
        assert_eq!(buf.lines(), ["a", "b", "c"]);
        assert!(!buf.undo());
    }

    #[test]
    fn unchanged_transaction_leaves_no_undo_step() {
        let mut buf = VecBuffer::from_text("a");
        buf.begin_edit();
        buf.replace_lines(0..1, vec!["a".into()]);
        buf.end_edit();
        assert_eq!(buf.undo_depth(), 0);
    }

    #[test]
    fn closure_is_a_progress_sink() {
        let mut seen = Vec::new();
        let mut sink = |done: usize, total: usize| seen.push((done, total));
        sink.report(1, 2);
        assert_eq!(seen, vec![(1, 2)]);
    }

    #[test]
    fn empty_buffer_has_empty_text() {
        assert_eq!(VecBuffer::default().text(), "");
    }
}
