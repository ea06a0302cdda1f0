//! Plain-text table reformatting.
//!
//! A table region is the opener line (`/T` or `/TM` with its options), the
//! body and the `T/` closer. [`parse::parse_table`] turns the region into
//! properties and a cell grid; [`format::format_table`] balances the column
//! widths against the target width and renders the body again.

pub mod format;
pub mod options;
pub mod parse;

pub use format::{Placement, RenderedTable, format_table};
pub use options::{Align, ColumnProps, TableProps};
pub use parse::{ParsedTable, TableCells, parse_table};

use crate::{config::TagWidths, error::TableError};

/// Parse and render a whole table region, returning the new body lines.
///
/// Warnings from both stages are merged into the result.
///
/// # Errors
///
/// Returns [`TableError::Empty`] when the region has no rows.
///
/// # Examples
///
/// ```
/// use ppreflow::{TagWidths, table::{Placement, reformat}};
///
/// let region: Vec<String> = ["/T", "a  bb", "ccc  d", "T/"].map(String::from).into();
/// let placement = Placement { indent: 0, default_width: 10, line: 1 };
/// let table = reformat(&region, placement, &TagWidths::default()).unwrap();
/// assert_eq!(table.lines, vec!["a     bb", "ccc   d"]);
/// ```
pub fn reformat(
    region: &[String],
    placement: Placement,
    tags: &TagWidths,
) -> Result<RenderedTable, TableError> {
    let parsed = parse_table(region, placement.line, tags)?;
    let mut rendered = format_table(&parsed.props, &parsed.cells, placement, tags);
    let mut warnings = parsed.warnings;
    warnings.append(&mut rendered.warnings);
    rendered.warnings = warnings;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Warning;

    fn region(lines: &[&str]) -> Vec<String> { lines.iter().map(ToString::to_string).collect() }

    #[test]
    fn rendering_is_idempotent() {
        let tags = TagWidths::default();
        let placement = Placement {
            indent: 2,
            default_width: 40,
            line: 1,
        };
        let first = reformat(
            &region(&[
                "/TM Col(S:'|')",
                "a  b b b b b b b b b b b b b b b b b b b b",
                "",
                "c  d",
                "T/",
            ]),
            placement,
            &tags,
        )
        .expect("first pass");
        let mut again = vec!["/TM Col(S:'|')".to_string()];
        again.extend(first.lines.iter().cloned());
        again.push("T/".to_string());
        let second = reformat(&again, placement, &tags).expect("second pass");
        assert_eq!(first.lines, second.lines);
        assert!(first.lines.iter().filter(|l| !l.is_empty()).all(|l| l.starts_with("  ")));
    }

    #[test]
    fn warnings_from_both_stages_are_kept() {
        let placement = Placement {
            indent: 0,
            default_width: 5,
            line: 3,
        };
        let table = reformat(
            &region(&["/T Col(A:Q)", "wide  cells", "T/"]),
            placement,
            &TagWidths::default(),
        )
        .expect("table");
        assert!(matches!(
            table.warnings.as_slice(),
            [Warning::UnsupportedOption { line: 3, .. }, Warning::Overflow { line: 3, .. }]
        ));
    }
}
