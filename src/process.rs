//! Whole-document processing on owned lines.

use crate::{
    buffer::{NoProgress, TextBuffer, VecBuffer},
    config::ReflowConfig,
    error::ReflowError,
    flow::FlowReport,
    reflow::{reflow, reflow_table},
};

/// Reflow a whole document, optionally touching tables only.
///
/// A document without tables passes through unchanged in tables-only mode.
///
/// # Errors
///
/// Returns the first [`ReflowError`] met; the input is not modified.
pub fn process_stream_opts(
    lines: &[String],
    config: &ReflowConfig,
    tables_only: bool,
) -> Result<(Vec<String>, FlowReport), ReflowError> {
    let mut buf = VecBuffer::new(lines.to_vec());
    let range = 0..buf.line_count();
    let report = if tables_only {
        match reflow_table(&mut buf, range, config, &mut NoProgress) {
            Err(ReflowError::NoTable { .. }) => FlowReport::default(),
            other => other?,
        }
    } else {
        reflow(&mut buf, range, config, &mut NoProgress)?
    };
    Ok((buf.into_lines(), report))
}

/// Reflow a whole document.
///
/// # Errors
///
/// See [`process_stream_opts`].
pub fn process_stream(lines: &[String], config: &ReflowConfig) -> Result<Vec<String>, ReflowError> {
    process_stream_opts(lines, config, false).map(|(lines, _)| lines)
}

/// Reformat the tables of a document and nothing else.
///
/// # Errors
///
/// See [`process_stream_opts`].
pub fn process_stream_tables_only(
    lines: &[String],
    config: &ReflowConfig,
) -> Result<Vec<String>, ReflowError> {
    process_stream_opts(lines, config, true).map(|(lines, _)| lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> { lines.iter().map(ToString::to_string).collect() }

    #[test]
    fn processes_prose_and_tables() {
        let input = owned(&["some", "words", "", "/T", "a  b", "T/"]);
        let config = ReflowConfig::default().with_line_width(10);
        let out = process_stream(&input, &config).expect("process");
        assert_eq!(out, vec!["some words", "", "/T", "a     b", "T/"]);
    }

    #[test]
    fn tables_only_without_tables_is_identity() {
        let input = owned(&["left", "as is"]);
        let out = process_stream_tables_only(&input, &ReflowConfig::default()).expect("process");
        assert_eq!(out, input);
    }

    #[test]
    fn warnings_are_reported() {
        let input = owned(&["/T", "wide  cells", "T/"]);
        let config = ReflowConfig::default().with_line_width(4);
        let (_, report) = process_stream_opts(&input, &config, false).expect("process");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn empty_input_is_fine() {
        let out = process_stream(&[], &ReflowConfig::default()).expect("process");
        assert!(out.is_empty());
    }
}
