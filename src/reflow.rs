//! Entry points that reflow a line range of a host buffer.
//!
//! Both functions parse the whole range before touching the buffer, so
//! malformed markup fails without any mutation.

use std::ops::Range;

use crate::{
    buffer::{Progress, TextBuffer},
    config::{MarkupKind, ReflowConfig},
    error::ReflowError,
    flow::{FlowReport, Scope, flow},
    parse::{UnitKind, parse},
};

/// Reflow every paragraph, markup region and table in `range`.
///
/// All edits form a single transaction of the buffer.
///
/// # Errors
///
/// Returns an error without editing the buffer when the range is out of
/// bounds or the markup in it is not properly nested. A table that cannot be
/// formatted aborts the pass; edits already made stay in the transaction.
///
/// # Examples
///
/// ```
/// use ppreflow::{NoProgress, ReflowConfig, VecBuffer, reflow};
///
/// let mut buf = VecBuffer::from_text("one\ntwo\nthree");
/// let config = ReflowConfig::default();
/// reflow(&mut buf, 0..3, &config, &mut NoProgress).unwrap();
/// assert_eq!(buf.text(), "one two three\n");
/// ```
pub fn reflow<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    range: Range<usize>,
    config: &ReflowConfig,
    progress: &mut dyn Progress,
) -> Result<FlowReport, ReflowError> {
    let units = parse(&*buffer, range.clone(), config)?;
    tracing::debug!(start = range.start + 1, end = range.end, units = units.len(), "reflow");
    flow(buffer, &units, config, Scope::All, progress)
}

/// Reformat only the tables in `range`, leaving prose as it is.
///
/// # Errors
///
/// As [`reflow`], and [`ReflowError::NoTable`] when the range holds no
/// table markup.
pub fn reflow_table<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    range: Range<usize>,
    config: &ReflowConfig,
    progress: &mut dyn Progress,
) -> Result<FlowReport, ReflowError> {
    let units = parse(&*buffer, range.clone(), config)?;
    let has_table = units
        .iter()
        .any(|u| u.kind == UnitKind::MarkupStart && u.code.is_some_and(MarkupKind::is_table));
    if !has_table {
        return Err(ReflowError::NoTable {
            start: range.start + 1,
            end: range.end,
        });
    }
    flow(buffer, &units, config, Scope::TablesOnly, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{NoProgress, VecBuffer};

    #[test]
    fn malformed_markup_leaves_buffer_alone() {
        let text = "a long paragraph that would be rewrapped\n/P\nverse";
        let mut buf = VecBuffer::from_text(text);
        let config = ReflowConfig::default().with_line_width(10);
        let err = reflow(&mut buf, 0..3, &config, &mut NoProgress).expect_err("unclosed");
        assert!(matches!(err, ReflowError::Unclosed { line: 2, .. }));
        assert_eq!(buf.lines(), VecBuffer::from_text(text).lines());
        assert_eq!(buf.undo_depth(), 0);
    }

    #[test]
    fn only_the_range_is_touched() {
        let mut buf = VecBuffer::from_text("x y\nz\n\nkeep\nthese apart");
        reflow(&mut buf, 0..2, &ReflowConfig::default(), &mut NoProgress).expect("reflow");
        assert_eq!(buf.lines(), ["x y z", "", "keep", "these apart"]);
    }

    #[test]
    fn table_reflow_needs_a_table() {
        let mut buf = VecBuffer::from_text("just prose");
        let err = reflow_table(&mut buf, 0..1, &ReflowConfig::default(), &mut NoProgress).expect_err("no table");
        assert_eq!(err, ReflowError::NoTable { start: 1, end: 1 });
    }

    #[test]
    fn table_reflow_skips_prose() {
        let mut buf = VecBuffer::from_text("a\nb\n\n/T\nx  y\nT/");
        let config = ReflowConfig::default().with_line_width(10);
        reflow_table(&mut buf, 0..6, &config, &mut NoProgress).expect("tables");
        assert_eq!(buf.lines(), ["a", "b", "", "/T", "x     y", "T/"]);
        assert_eq!(buf.undo_depth(), 1);
    }
}
