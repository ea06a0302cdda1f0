//! File helpers for rewriting documents in place.

use std::{fs, path::Path};

use crate::{config::ReflowConfig, error::ReflowError, process::process_stream_opts};

/// Failure to rewrite a file.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Reflow(#[from] ReflowError),
}

/// Rewrite a file in place with reflowed text.
///
/// The file is left as it was when reflowing fails.
///
/// # Errors
/// Returns an error if reading or writing the file fails, or if its markup
/// is malformed.
pub fn rewrite(path: &Path, config: &ReflowConfig, tables_only: bool) -> Result<(), RewriteError> {
    let text = fs::read_to_string(path)?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let (fixed, report) = process_stream_opts(&lines, config, tables_only)?;
    tracing::info!(path = %path.display(), replaced = report.replaced, "rewrote file");
    if fixed == lines {
        return Ok(());
    }
    fs::write(path, fixed.join("\n") + "\n")?;
    Ok(())
}
