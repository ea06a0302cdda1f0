//! Library for reflowing marked-up plain text.
//!
//! Prose is filled to a line width, and regions opened by markup lines such
//! as `/#` (block quote), `/P` (poetry) or `/T` (table) are laid out by
//! their own rules. Work happens in two passes: [`parse`] scans a line range
//! into [`WorkUnit`]s, then [`flow`] rewrites the buffer from the last unit
//! to the first inside a single edit transaction.

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;
pub mod error;
pub mod flow;
pub mod io;
mod markup;
pub mod parse;
pub mod process;
pub mod reflow;
pub mod table;
pub mod tokenize;

pub use buffer::{NoProgress, Progress, TextBuffer, VecBuffer};
pub use config::{DEFAULT_LINE_WIDTH, Margins, MarkupKind, ReflowConfig, TagWidth, TagWidths};
pub use error::{ReflowError, TableError, Warning};
pub use flow::{FlowReport, PROGRESS_STRIDE, Scope, flow};
pub use io::{RewriteError, rewrite};
pub use parse::{UnitKind, WorkUnit, parse};
pub use process::{process_stream, process_stream_opts, process_stream_tables_only};
pub use reflow::{reflow, reflow_table};
pub use tokenize::{Token, Tokens, logical_width};
