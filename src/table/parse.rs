//! Splitting a table region into a grid of cells.
//!
//! Cells are separated by runs of two or more spaces, or by a configured
//! side character with optional surrounding spaces. Border stiles at the
//! start or end of a line produce empty splits which are dropped. Rule lines
//! made of top and bottom border characters are skipped, and in multi-line
//! tables they end the current row as a blank line does.

use regex::Regex;

use super::options::TableProps;
use crate::{
    config::TagWidths,
    error::{TableError, Warning},
    tokenize::{Tokens, leading_spaces, logical_width},
};

/// Row-major cell grid with per-column width bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCells {
    rows: Vec<Vec<String>>,
    min_width: Vec<usize>,
    sug_width: Vec<usize>,
}

impl TableCells {
    #[must_use]
    pub fn columns(&self) -> usize { self.min_width.len() }

    #[must_use]
    pub fn rows(&self) -> usize { self.rows.len() }

    /// Text of a cell; cells never stored read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        match self.rows.get(row).and_then(|r| r.get(column)) {
            Some(text) => text,
            None => {
                tracing::debug!(row, column, "no such cell, reading as empty");
                ""
            }
        }
    }

    /// Width of the widest token in `column`.
    #[must_use]
    pub fn min_width(&self, column: usize) -> usize { self.min_width.get(column).copied().unwrap_or(0) }

    /// Width of the widest cell in `column`, never below [`Self::min_width`].
    #[must_use]
    pub fn sug_width(&self, column: usize) -> usize { self.sug_width.get(column).copied().unwrap_or(0) }

    fn measure(&mut self, tags: &TagWidths) {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        self.min_width = vec![0; columns];
        self.sug_width = vec![0; columns];
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let widest = Tokens::new(cell, tags).map(|t| t.width).max().unwrap_or(0);
                self.min_width[idx] = self.min_width[idx].max(widest);
                self.sug_width[idx] = self.sug_width[idx]
                    .max(logical_width(cell, tags))
                    .max(self.min_width[idx]);
            }
        }
    }
}

/// A cell and its column offset within the line.
type Part = (usize, String);

/// Line-splitting rules of one table.
struct Splitter {
    delimiter: Regex,
    sides: Vec<char>,
    /// Stile drawn before the first column.
    left: Option<char>,
    rules: Vec<char>,
    indent: usize,
}

impl Splitter {
    fn new(props: &TableProps, indent: usize) -> Self {
        let sides = props.side_chars();
        let pattern = if sides.is_empty() {
            r"\s{2,}".to_string()
        } else {
            let class: String = sides.iter().map(|c| regex::escape(&c.to_string())).collect();
            format!(r"\s*[{class}]\s*|\s{{2,}}")
        };
        let delimiter = Regex::new(&pattern).expect("escaped side characters form a valid class");
        Self {
            delimiter,
            sides,
            left: props.side,
            rules: props.rule_chars(),
            indent,
        }
    }

    fn is_rule(&self, line: &str) -> bool {
        let trimmed = line.trim();
        !self.rules.is_empty()
            && trimmed.chars().any(|c| self.rules.contains(&c))
            && trimmed
                .chars()
                .all(|c| c == ' ' || self.rules.contains(&c) || self.sides.contains(&c))
    }

    fn is_side(&self, c: char) -> bool { self.sides.contains(&c) }

    fn split(&self, line: &str) -> Vec<Part> {
        let skip = leading_spaces(line).min(self.indent);
        let body = line.char_indices().nth(skip).map_or("", |(at, _)| &line[at..]).trim_end();
        let mut parts = Vec::new();
        let mut last = 0;
        for m in self.delimiter.find_iter(body) {
            parts.push(part(body, last, m.start()));
            last = m.end();
        }
        parts.push(part(body, last, body.len()));

        let trimmed = body.trim_start();
        if self.left.is_some_and(|c| trimmed.starts_with(c)) && parts.first().is_some_and(|p| p.1.is_empty()) {
            parts.remove(0);
        }
        if body.ends_with(|c: char| self.is_side(c)) && parts.last().is_some_and(|p| p.1.is_empty()) {
            parts.pop();
        }
        parts
    }
}

fn part(body: &str, start: usize, end: usize) -> Part {
    let raw = &body[start..end];
    let text = raw.trim();
    let offset = body[..start].chars().count() + leading_spaces(raw);
    (offset, text.to_string())
}

/// Result of parsing a table region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub props: TableProps,
    pub cells: TableCells,
    pub warnings: Vec<Warning>,
}

/// Builds rows from split lines.
struct Grid {
    columns: usize,
    anchors: Vec<usize>,
    positional: bool,
    multi_line: bool,
    rows: Vec<Vec<String>>,
    current: Option<Vec<String>>,
    warnings: Vec<Warning>,
}

impl Grid {
    fn place(&mut self, parts: Vec<Part>, line: usize) -> Vec<String> {
        if self.columns == 0 {
            self.columns = parts.len();
            self.anchors = parts.iter().map(|p| p.0).collect();
            return parts.into_iter().map(|p| p.1).collect();
        }
        let mut parts = parts;
        if !self.multi_line && parts.len() == 1 && self.columns > 1 {
            let (offset, text) = &parts[0];
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.len() == self.columns {
                let offset = *offset;
                parts = words.into_iter().map(|w| (offset, w.to_string())).collect();
            }
        }
        let mut cells = vec![String::new(); self.columns.min(parts.len().max(1))];
        if parts.len() > self.columns {
            let warning = Warning::ExtraCells {
                line,
                columns: self.columns,
            };
            tracing::warn!(%warning);
            self.warnings.push(warning);
            let extra: Vec<String> = parts.drain(self.columns - 1..).map(|p| p.1).collect();
            parts.push((0, extra.join(" ")));
        }
        let slots = self.slots(&parts);
        cells.resize(slots.last().map_or(0, |&s| s + 1).max(cells.len()), String::new());
        for (slot, (_, text)) in slots.into_iter().zip(parts) {
            cells[slot] = text;
        }
        cells
    }

    /// Column index of each part: by position when the line has fewer parts
    /// than columns and they line up under the first row, else in order.
    fn slots(&self, parts: &[Part]) -> Vec<usize> {
        let sequential = (0..parts.len()).collect();
        if !self.positional || parts.len() >= self.columns {
            return sequential;
        }
        let slots: Vec<usize> = parts
            .iter()
            .map(|(offset, _)| self.anchors.iter().rposition(|&a| a <= *offset).unwrap_or(0))
            .collect();
        if slots.windows(2).all(|w| w[0] < w[1]) {
            slots
        } else {
            sequential
        }
    }

    fn push_line(&mut self, cells: Vec<String>) {
        if !self.multi_line {
            self.rows.push(cells);
            return;
        }
        let row = self.current.get_or_insert_with(Vec::new);
        for (idx, text) in cells.into_iter().enumerate() {
            if idx >= row.len() {
                row.push(text);
            } else if !text.is_empty() {
                if !row[idx].is_empty() {
                    row[idx].push(' ');
                }
                row[idx].push_str(&text);
            }
        }
    }

    fn end_row(&mut self) {
        if let Some(row) = self.current.take() {
            self.rows.push(row);
        }
    }
}

/// Parse a table region: the opener line, the body and, optionally, the
/// closer.
///
/// `first_line` is the 1-based line number of the opener, used in
/// diagnostics.
///
/// # Errors
///
/// Returns [`TableError::Empty`] when the region holds no data rows.
pub fn parse_table(
    region: &[String],
    first_line: usize,
    tags: &TagWidths,
) -> Result<ParsedTable, TableError> {
    let mut warnings = Vec::new();
    let (props, body) = match region.split_first() {
        Some((opener, rest)) => (opener_props(opener, first_line, &mut warnings), rest),
        None => return Err(TableError::Empty { line: first_line }),
    };
    let body = match body.split_last() {
        Some((last, rest)) if is_closer(last) => rest,
        _ => body,
    };

    let indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_spaces(l))
        .min()
        .unwrap_or(0);
    let splitter = Splitter::new(&props, indent);
    let mut grid = Grid {
        columns: 0,
        anchors: Vec::new(),
        positional: splitter.sides.is_empty(),
        multi_line: props.multi_line,
        rows: Vec::new(),
        current: None,
        warnings,
    };

    for (offset, line) in body.iter().enumerate() {
        let number = first_line + 1 + offset;
        if line.trim().is_empty() || splitter.is_rule(line) {
            grid.end_row();
            continue;
        }
        let parts = splitter.split(line);
        // A bare stile carries no cells and acts as a rule.
        if parts.is_empty() {
            grid.end_row();
            continue;
        }
        let cells = grid.place(parts, number);
        grid.push_line(cells);
    }
    grid.end_row();

    if grid.rows.is_empty() {
        return Err(TableError::Empty { line: first_line });
    }
    let mut cells = TableCells {
        rows: grid.rows,
        ..TableCells::default()
    };
    cells.measure(tags);
    Ok(ParsedTable {
        props,
        cells,
        warnings: grid.warnings,
    })
}

fn opener_props(opener: &str, line: usize, warnings: &mut Vec<Warning>) -> TableProps {
    match crate::markup::classify(opener) {
        Some(crate::markup::Marker::Open { kind, options, .. }) if kind.is_table() => {
            TableProps::parse(options, kind == crate::config::MarkupKind::MultiTable, line, warnings)
        }
        _ => TableProps::default(),
    }
}

fn is_closer(line: &str) -> bool {
    matches!(crate::markup::classify(line), Some(crate::markup::Marker::Close(code)) if code.eq_ignore_ascii_case("t"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(text: &str) -> Vec<String> { text.lines().map(str::to_string).collect() }

    fn grid(text: &str) -> ParsedTable {
        parse_table(&region(text), 1, &TagWidths::default()).expect("table parses")
    }

    fn row(cells: &TableCells, r: usize) -> Vec<&str> { (0..cells.columns()).map(|c| cells.cell(r, c)).collect() }

    #[test]
    fn splits_on_double_spaces() {
        let table = grid("/T\nName  Role\nAda Lovelace  analyst\nT/");
        assert_eq!(table.cells.columns(), 2);
        assert_eq!(row(&table.cells, 1), vec!["Ada Lovelace", "analyst"]);
        assert_eq!(table.cells.min_width(0), 8);
        assert_eq!(table.cells.sug_width(0), 12);
    }

    #[test]
    fn single_space_row_falls_back_to_words() {
        let table = grid("/t Col(S:'|')\na  bb  ccc\n e f g\nt/");
        assert_eq!(table.cells.columns(), 3);
        assert_eq!(row(&table.cells, 1), vec!["e", "f", "g"]);
        assert_eq!(
            (0..3).map(|c| table.cells.sug_width(c)).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn border_stiles_are_discarded() {
        let table = grid("/T Table(Side:'|') Col(Side:'|')\n| a | b |\n|   | c |\nT/");
        assert_eq!(row(&table.cells, 0), vec!["a", "b"]);
        assert_eq!(row(&table.cells, 1), vec!["", "c"]);
    }

    #[test]
    fn bare_stile_line_is_not_a_row() {
        let table = grid("/T Table(S:'|') Col(S:'|')\n|\n| a | b |\nT/");
        assert_eq!(table.cells.columns(), 2);
        assert_eq!(table.cells.rows(), 1);
        assert_eq!(row(&table.cells, 0), vec!["a", "b"]);
    }

    #[test]
    fn column_stile_keeps_empty_first_cell() {
        let table = grid("/T Col(S:'|')\na | b |\n  | c |\nT/");
        assert_eq!(row(&table.cells, 1), vec!["", "c"]);
    }

    #[test]
    fn multi_line_rows_join_until_blank() {
        let table = grid("/TM\nfirst  one\n       more\n\nsecond  two\nT/");
        assert_eq!(table.cells.rows(), 2);
        assert_eq!(row(&table.cells, 0), vec!["first", "one more"]);
        assert_eq!(table.cells.min_width(1), 4);
        assert_eq!(table.cells.sug_width(1), 8);
    }

    #[test]
    fn multi_line_rows_end_at_bottom_rule() {
        let table = grid("/TM Col(B:'-')\na  b\nc  d\n-----\ne  f\nT/");
        assert_eq!(table.cells.rows(), 2);
        assert_eq!(row(&table.cells, 0), vec!["a c", "b d"]);
    }

    #[test]
    fn short_rows_leave_trailing_cells_empty() {
        let table = grid("/T\na  b  c\nd\nT/");
        assert_eq!(row(&table.cells, 1), vec!["d", "", ""]);
    }

    #[test]
    fn extra_cells_join_the_last_column() {
        let table = grid("/T\na  b\nc  d  e\nT/");
        assert_eq!(row(&table.cells, 1), vec!["c", "d e"]);
        assert!(matches!(
            table.warnings.as_slice(),
            [Warning::ExtraCells { line: 3, columns: 2 }]
        ));
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let table = grid("/T\na  b\nT/");
        assert_eq!(table.cells.cell(7, 9), "");
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = parse_table(&region("/T\n\nT/"), 4, &TagWidths::default()).expect_err("empty");
        assert_eq!(err, TableError::Empty { line: 4 });
    }
}
