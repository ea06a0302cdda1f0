//! Rewriting the buffer from parsed work units.
//!
//! Units are applied last to first so every line index recorded by the
//! parser stays valid while earlier text is untouched. A stack mirrors the
//! nesting: a `MarkupEnd` pushes its region, the matching `MarkupStart` pops
//! it, so each unit sees the final minimum indent of the region it lies in.

use textwrap::wrap_algorithms::wrap_first_fit;

use crate::{
    buffer::{Progress, TextBuffer},
    config::{MarkupKind, ReflowConfig},
    error::{ReflowError, Warning},
    markup::Mode,
    parse::{UnitKind, WorkUnit},
    table::{self, Placement},
    tokenize::{Token, Tokens, as_f64, leading_spaces},
};

/// Units processed between two progress reports.
pub const PROGRESS_STRIDE: usize = 64;

/// Which units a flow pass rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    /// Only table regions are reformatted.
    TablesOnly,
}

/// Outcome of a flow pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowReport {
    /// Units visited.
    pub units: usize,
    /// Units whose lines were replaced.
    pub replaced: usize,
    pub warnings: Vec<Warning>,
}

/// A region whose end has been seen but whose start has not.
#[derive(Debug, Clone, Copy)]
struct Block {
    kind: Option<MarkupKind>,
    min_indent: usize,
    end_line: usize,
}

struct LineFlower<'c> {
    config: &'c ReflowConfig,
    scope: Scope,
    stack: Vec<Block>,
    report: FlowReport,
}

impl<'c> LineFlower<'c> {
    fn new(config: &'c ReflowConfig, scope: Scope) -> Self {
        Self {
            config,
            scope,
            stack: Vec::new(),
            report: FlowReport::default(),
        }
    }

    fn run<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        units: &[WorkUnit],
        progress: &mut dyn Progress,
    ) -> Result<(), ReflowError> {
        let total = units.len();
        for (done, unit) in units.iter().rev().enumerate() {
            self.unit(buffer, unit)?;
            self.report.units += 1;
            if (done + 1) % PROGRESS_STRIDE == 0 && done + 1 < total {
                tracing::trace!(done = done + 1, total, "flow progress");
                progress.report(done + 1, total);
            }
        }
        tracing::trace!(done = total, total, "flow complete");
        progress.report(total, total);
        Ok(())
    }

    fn unit<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B, unit: &WorkUnit) -> Result<(), ReflowError> {
        tracing::debug!(
            kind = ?unit.kind,
            first_line = unit.first_line + 1,
            last_line = unit.last_line + 1,
            preceding_blanks = unit.preceding_blanks,
            "flow unit"
        );
        match unit.kind {
            UnitKind::MarkupEnd => {
                self.stack.push(Block {
                    kind: unit.code,
                    min_indent: unit.min_indent_seen,
                    end_line: unit.first_line,
                });
                Ok(())
            }
            UnitKind::MarkupStart => {
                let skipped = self.skipped();
                let Some(block) = self.stack.pop() else {
                    return Err(ReflowError::Unmatched {
                        line: unit.first_line + 1,
                        marker: unit.code.map(|k| k.to_string()).unwrap_or_default(),
                    });
                };
                if block.kind.is_some_and(MarkupKind::is_table) && !skipped {
                    self.table(buffer, unit, block)?;
                }
                Ok(())
            }
            UnitKind::Paragraph => {
                if self.scope == Scope::All && !self.skipped() {
                    self.paragraph(buffer, unit);
                }
                Ok(())
            }
        }
    }

    /// Whether any enclosing region is of a kind the caller asked to skip.
    fn skipped(&self) -> bool {
        self.stack
            .iter()
            .any(|b| b.kind.is_some_and(|k| self.config.skips(k)))
    }

    fn min_indent(&self) -> usize { self.stack.last().map_or(0, |b| b.min_indent) }

    fn paragraph<B: TextBuffer + ?Sized>(&mut self, buffer: &mut B, unit: &WorkUnit) {
        let old: Vec<&str> = (unit.first_line..=unit.last_line)
            .map(|idx| buffer.line(idx).unwrap_or_default())
            .collect();
        let min = self.min_indent();
        let new = match Mode::of(unit.code) {
            Mode::Paragraph => self.rewrap(&old, unit.first_indent, unit.left_indent, unit.right_indent),
            Mode::Wrapped => {
                let (first, left) = hang(leading_spaces(old[0]), unit, min);
                self.rewrap(&old, first, left, unit.right_indent)
            }
            Mode::Fixed => reindent(&old, unit.first_indent.saturating_sub(min)),
            Mode::Centered => reindent(&old, unit.first_indent),
            Mode::Literal | Mode::Table => return,
        };
        if new.iter().map(String::as_str).ne(old.iter().copied()) {
            buffer.replace_lines(unit.first_line..unit.last_line + 1, new);
            self.report.replaced += 1;
        }
    }

    /// Fill the tokens of `lines` greedily: the first output line starts at
    /// `first`, later ones at `left`.
    fn rewrap(&self, lines: &[&str], first: usize, left: usize, right_indent: usize) -> Vec<String> {
        let joined = lines.join(" ");
        let tokens: Vec<Token<'_>> = Tokens::new(&joined, &self.config.tags).collect();
        let right_margin = self.config.line_width.saturating_sub(right_indent);
        let widths = [
            as_f64(right_margin.saturating_sub(first)),
            as_f64(right_margin.saturating_sub(left)),
        ];
        wrap_first_fit(&tokens, &widths)
            .into_iter()
            .enumerate()
            .map(|(idx, line)| {
                let indent = if idx == 0 { first } else { left };
                let words: Vec<&str> = line.iter().map(|t| t.text).collect();
                format!("{}{}", " ".repeat(indent), words.join(" "))
            })
            .collect()
    }

    fn table<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        unit: &WorkUnit,
        block: Block,
    ) -> Result<(), ReflowError> {
        if block.end_line <= unit.first_line {
            return Err(ReflowError::Unmatched {
                line: block.end_line + 1,
                marker: "T/".to_string(),
            });
        }
        let region: Vec<String> = (unit.first_line..=block.end_line)
            .map(|idx| buffer.line(idx).unwrap_or_default().to_string())
            .collect();
        let placement = Placement {
            indent: unit.left_indent,
            default_width: self
                .config
                .line_width
                .saturating_sub(unit.left_indent + unit.right_indent),
            line: unit.first_line + 1,
        };
        let rendered = table::reformat(&region, placement, &self.config.tags)?;
        self.report.warnings.extend(rendered.warnings);
        let body = &region[1..region.len() - 1];
        if rendered.lines.as_slice() != body {
            buffer.replace_lines(unit.first_line + 1..block.end_line, rendered.lines);
            self.report.replaced += 1;
        }
        Ok(())
    }
}

/// Indents of a poetry or list line that starts at column `ws`.
///
/// A line already inside the left margin keeps its column. Otherwise the
/// least indented lines of the region (at `baseline`) take the first-line
/// indent and deeper ones sit that much past the left margin.
fn hang(ws: usize, unit: &WorkUnit, baseline: usize) -> (usize, usize) {
    if ws >= unit.left_indent {
        return (ws, unit.left_indent);
    }
    match ws.saturating_sub(baseline) {
        0 => (unit.first_indent, unit.left_indent),
        rel => (unit.left_indent + rel, unit.left_indent + rel),
    }
}

fn reindent(lines: &[&str], indent: usize) -> Vec<String> {
    lines
        .iter()
        .map(|line| format!("{}{}", " ".repeat(indent), line.trim()))
        .collect()
}

/// Apply `units`, as produced by [`crate::parse::parse`] for this buffer, in
/// one edit transaction.
///
/// The transaction is closed even when an error stops the pass partway.
///
/// # Errors
///
/// Fails when a table region cannot be formatted or the units are not
/// properly nested.
pub fn flow<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    units: &[WorkUnit],
    config: &ReflowConfig,
    scope: Scope,
    progress: &mut dyn Progress,
) -> Result<FlowReport, ReflowError> {
    let mut flower = LineFlower::new(config, scope);
    buffer.begin_edit();
    let result = flower.run(buffer, units, progress);
    buffer.end_edit();
    result.map(|()| flower.report)
}
