//! Recognition of line-initial block markup.
//!
//! An opener is a slash followed by a code (`/#`, `/P`, `/TM`, ...) at the
//! very start of a line, optionally followed by a `[left.first,right]`
//! margin override and, for tables, an option group. A closer is the code
//! followed by a slash alone on its line. Codes are case-insensitive.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MarkupKind;

static OPENER_RE: LazyLock<Regex> = lazy_regex!(
    r"^/(?i:(tm|t|#|p|c|\*|x|u))(\[[^\]]*\])?(?:\s+(.*?))?\s*$",
    "markup opener regex should compile",
);

static CLOSER_RE: LazyLock<Regex> = lazy_regex!(
    r"^(?i:(t|#|p|c|\*|x|u))/\s*$",
    "markup closer regex should compile",
);

/// How the lines inside a region are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Lines gather into paragraphs separated by blank lines and are rewrapped.
    Paragraph,
    /// Each line is its own paragraph; relative indentation is kept.
    Wrapped,
    /// Each line is centered between the margins.
    Centered,
    /// Each line keeps its relative indentation under the left margin.
    Fixed,
    /// Lines are not touched.
    Literal,
    /// Lines form a table.
    Table,
}

impl Mode {
    /// Mode of a region; `None` is the top level of the range.
    pub(crate) fn of(kind: Option<MarkupKind>) -> Self {
        match kind {
            None | Some(MarkupKind::BlockQuote) => Self::Paragraph,
            Some(MarkupKind::Poetry | MarkupKind::List) => Self::Wrapped,
            Some(MarkupKind::Centered) => Self::Centered,
            Some(MarkupKind::LiteralIndent) => Self::Fixed,
            Some(MarkupKind::Literal) => Self::Literal,
            Some(MarkupKind::Table | MarkupKind::MultiTable) => Self::Table,
        }
    }
}

/// A markup line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker<'a> {
    Open {
        kind: MarkupKind,
        margins: Option<&'a str>,
        options: &'a str,
    },
    /// Carries the code before the slash, so `T/` closes both table kinds.
    Close(&'a str),
}

/// Classify `line` as an opener, a closer or neither.
pub(crate) fn classify(line: &str) -> Option<Marker<'_>> {
    if let Some(caps) = CLOSER_RE.captures(line) {
        return caps.get(1).map(|code| Marker::Close(code.as_str()));
    }
    let caps = OPENER_RE.captures(line)?;
    let kind = MarkupKind::from_code(caps.get(1)?.as_str())?;
    let margins = caps.get(2).map(|m| m.as_str());
    let options = caps.get(3).map_or("", |m| m.as_str());
    if !kind.is_table() && !options.is_empty() {
        // Text after a non-table opener makes the line ordinary prose.
        return None;
    }
    Some(Marker::Open {
        kind,
        margins,
        options,
    })
}

/// Whether a closer code ends a region of `kind`.
pub(crate) fn closes(code: &str, kind: MarkupKind) -> bool { code.eq_ignore_ascii_case(kind.end_code()) }
