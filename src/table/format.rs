//! Column-width balancing and table rendering.
//!
//! Columns without an explicit width share what the target width leaves
//! after delimiters and fixed columns. Over budget, multi-line tables shrink
//! the column with the highest suggested-to-minimum ratio one unit at a time;
//! single-line tables cannot fold cells and simply overflow. Under budget,
//! the narrowest column grows one unit at a time. Ties go to the leftmost
//! column.

use textwrap::wrap_algorithms::wrap_first_fit;

use super::{
    options::{Align, ColumnProps, TableProps},
    parse::TableCells,
};
use crate::{
    config::TagWidths,
    error::Warning,
    tokenize::{Token, Tokens, as_f64, logical_width},
};

/// Rendered table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub lines: Vec<String>,
    /// Column widths after balancing.
    pub widths: Vec<usize>,
    /// Total width of a row, delimiters included, indent excluded.
    pub width: usize,
    pub warnings: Vec<Warning>,
}

/// Delimiter widths around and between columns.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Delimiters {
    left: usize,
    after: Vec<usize>,
}

impl Delimiters {
    fn new(props: &TableProps, columns: &[ColumnProps]) -> Self {
        let last = columns.len().saturating_sub(1);
        let after = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| match (idx == last, col.side.is_some()) {
                (false, true) => 3,
                (false, false) | (true, true) => 2,
                (true, false) => 0,
            })
            .collect();
        Self {
            left: if props.side.is_some() { 2 } else { 0 },
            after,
        }
    }

    fn total(&self) -> usize { self.left + self.after.iter().sum::<usize>() }
}

/// Where a table sits and how wide it should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Columns of indentation before every row.
    pub indent: usize,
    /// Width to fill when the table sets no explicit width.
    pub default_width: usize,
    /// 1-based line of the opener, for warnings.
    pub line: usize,
}

/// Balance and render `cells`.
#[must_use]
pub fn format_table(
    props: &TableProps,
    cells: &TableCells,
    placement: Placement,
    tags: &TagWidths,
) -> RenderedTable {
    let columns: Vec<ColumnProps> = (0..cells.columns()).map(|i| props.column(i)).collect();
    let delimiters = Delimiters::new(props, &columns);
    let target = props.width.unwrap_or(placement.default_width);
    let mut warnings = Vec::new();

    let widths = balance(props, cells, &columns, target.saturating_sub(delimiters.total()));
    let width = widths.iter().sum::<usize>() + delimiters.total();
    let free = columns.iter().any(|c| c.width.is_none());
    if width > target || (!free && width != target) {
        let warning = Warning::Overflow {
            line: placement.line,
            requested: target,
            actual: width,
        };
        if width > target {
            tracing::warn!(%warning);
            warnings.push(warning);
        } else {
            tracing::debug!(%warning, "fixed column widths decide the table width");
        }
    }

    let renderer = Renderer {
        props,
        columns: &columns,
        delimiters: &delimiters,
        widths: &widths,
        indent: " ".repeat(placement.indent),
        tags,
    };
    let mut lines = Vec::new();
    if let Some(top) = props.top {
        lines.push(format!("{}{}", renderer.indent, top.to_string().repeat(width)));
    }
    let rule = columns.iter().any(|c| c.bottom.is_some());
    for row in 0..cells.rows() {
        lines.extend(renderer.row(cells, row));
        if rule {
            lines.push(renderer.rule());
        } else if props.multi_line && row + 1 < cells.rows() {
            lines.push(String::new());
        }
    }
    tracing::debug!(rows = cells.rows(), ?widths, width, "formatted table");
    RenderedTable {
        lines,
        widths,
        width,
        warnings,
    }
}

/// Resolve column widths so the free columns fill `budget` exactly when
/// they can.
fn balance(props: &TableProps, cells: &TableCells, columns: &[ColumnProps], budget: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = (0..columns.len())
        .map(|i| columns[i].width.unwrap_or_else(|| cells.sug_width(i)))
        .collect();
    let free: Vec<usize> = (0..columns.len()).filter(|&i| columns[i].width.is_none()).collect();
    if free.is_empty() {
        return widths;
    }
    let fixed: usize = (0..columns.len())
        .filter(|&i| columns[i].width.is_some())
        .map(|i| widths[i])
        .sum();
    let budget = budget.saturating_sub(fixed);
    let used = |widths: &[usize]| free.iter().map(|&i| widths[i]).sum::<usize>();

    if used(&widths) > budget {
        if !props.multi_line {
            return widths;
        }
        let mins: Vec<usize> = (0..columns.len()).map(|i| cells.min_width(i).max(1)).collect();
        let sugs: Vec<usize> = (0..columns.len()).map(|i| cells.sug_width(i)).collect();
        if free.iter().map(|&i| mins[i]).sum::<usize>() > budget {
            for &i in &free {
                widths[i] = mins[i];
            }
            return widths;
        }
        while used(&widths) > budget {
            let Some(victim) = highest_ratio(&free, &widths, &mins, &sugs) else {
                break;
            };
            widths[victim] -= 1;
        }
    } else {
        while used(&widths) < budget {
            let Some(&narrowest) = free.iter().min_by_key(|&&i| widths[i]) else {
                break;
            };
            widths[narrowest] += 1;
        }
    }
    widths
}

/// The column above its minimum with the highest suggested-to-minimum
/// ratio. Ties go to the leftmost column, which `max_by_key` would not give.
fn highest_ratio(free: &[usize], widths: &[usize], mins: &[usize], sugs: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &i in free.iter().filter(|&&i| widths[i] > mins[i]) {
        let better = best.is_none_or(|b| sugs[i] * mins[b] > sugs[b] * mins[i]);
        if better {
            best = Some(i);
        }
    }
    best
}

struct Renderer<'a> {
    props: &'a TableProps,
    columns: &'a [ColumnProps],
    delimiters: &'a Delimiters,
    widths: &'a [usize],
    indent: String,
    tags: &'a TagWidths,
}

impl Renderer<'_> {
    fn row(&self, cells: &TableCells, row: usize) -> Vec<String> {
        let folded: Vec<Vec<String>> = (0..self.columns.len())
            .map(|col| {
                let text = cells.cell(row, col);
                if self.props.multi_line {
                    fold(text, self.widths[col], self.tags)
                } else {
                    vec![text.to_string()]
                }
            })
            .collect();
        let height = folded.iter().map(Vec::len).max().unwrap_or(1);
        (0..height).map(|k| self.line(&folded, k)).collect()
    }

    fn line(&self, folded: &[Vec<String>], k: usize) -> String {
        let mut out = self.indent.clone();
        if let Some(side) = self.props.side {
            out.push(side);
            out.push(' ');
        }
        let last = self.columns.len().saturating_sub(1);
        for (col, props) in self.columns.iter().enumerate() {
            let piece = folded[col].get(k).map_or("", String::as_str);
            out.push_str(&align(piece, self.widths[col], props.align.unwrap_or_default(), self.tags));
            match (col == last, props.side) {
                (false, Some(side)) => {
                    out.push(' ');
                    out.push(side);
                    out.push(' ');
                }
                (false, None) => out.push_str("  "),
                (true, Some(side)) => {
                    out.push(' ');
                    out.push(side);
                }
                (true, None) => {}
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// A line of bottom characters under every column that has one.
    fn rule(&self) -> String {
        let fill = |col: usize| self.columns.get(col).and_then(|c| c.bottom).unwrap_or(' ');
        let mut out = self.indent.clone();
        if let Some(side) = self.props.side {
            out.push(side);
            out.push(fill(0));
        }
        for (col, props) in self.columns.iter().enumerate() {
            let b = fill(col);
            out.extend(std::iter::repeat_n(b, self.widths[col]));
            let after = self.delimiters.after[col];
            match props.side {
                Some(side) if after >= 2 => {
                    out.push(b);
                    out.push(side);
                    if after == 3 {
                        out.push(b);
                    }
                }
                _ => out.extend(std::iter::repeat_n(b, after)),
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Fold `text` into lines no wider than `width`, breaking between tokens.
fn fold(text: &str, width: usize, tags: &TagWidths) -> Vec<String> {
    let tokens: Vec<Token<'_>> = Tokens::new(text, tags).collect();
    if tokens.is_empty() {
        return vec![String::new()];
    }
    wrap_first_fit(&tokens, &[as_f64(width)])
        .into_iter()
        .map(|line| line.iter().map(|t| t.text).collect::<Vec<_>>().join(" "))
        .collect()
}

fn align(piece: &str, width: usize, align: Align, tags: &TagWidths) -> String {
    let pad = width.saturating_sub(logical_width(piece, tags));
    let (before, after) = match align {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };
    format!("{}{piece}{}", " ".repeat(before), " ".repeat(after))
}
