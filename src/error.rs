//! Error and warning types reported to the host.
//!
//! Errors abort an operation; warnings are collected alongside the result and
//! never stop the rewrite. Line numbers are 1-based so they can be shown to a
//! user as-is.

/// Fatal problems detected while reflowing a range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflowError {
    #[error("line {line}: `{marker}` is never closed")]
    Unclosed { line: usize, marker: String },

    #[error("line {line}: `{marker}` does not close any open markup")]
    Unmatched { line: usize, marker: String },

    #[error("lines {start}..{end} are outside the buffer of {len} lines")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("no table markup between lines {start} and {end}")]
    NoTable { start: usize, end: usize },

    #[error("table error: {0}")]
    Table(#[from] TableError),
}

/// Fatal problems with a single table region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("line {line}: table has no data rows")]
    Empty { line: usize },
}

/// Non-fatal conditions raised while formatting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("line {line}: table needs {actual} columns but {requested} were requested")]
    Overflow {
        line: usize,
        requested: usize,
        actual: usize,
    },

    #[error("line {line}: unsupported table option `{option}`")]
    UnsupportedOption { line: usize, option: String },

    #[error("line {line}: row has more cells than the table's {columns} columns")]
    ExtraCells { line: usize, columns: usize },
}
