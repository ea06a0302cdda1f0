//! Host-owned reflow settings.
//!
//! A [`ReflowConfig`] carries everything that survives between invocations:
//! the target line width, the default margins of each markup kind, the
//! logical width of inline tags and the kinds the host wants left alone.

use std::{collections::HashMap, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

/// Default target line width.
pub const DEFAULT_LINE_WIDTH: usize = 75;

static MARGINS_RE: LazyLock<Regex> = lazy_regex!(
    r"^\[?\s*(\d+)?\s*(?:\.\s*(-?\d+))?\s*(?:,\s*(\d+))?\s*\]?$",
    "margin override regex should compile",
);

/// Kinds of block markup recognised at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MarkupKind {
    /// `/#` ... `#/`
    BlockQuote,
    /// `/P` ... `P/`
    Poetry,
    /// `/C` ... `C/`
    Centered,
    /// `/*` ... `*/`
    LiteralIndent,
    /// `/X` ... `X/`
    Literal,
    /// `/U` ... `U/`
    List,
    /// `/T` ... `T/`
    Table,
    /// `/TM` ... `T/`
    MultiTable,
}

impl MarkupKind {
    /// Map the code that follows the opening slash to a kind.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "#" => Some(Self::BlockQuote),
            "P" => Some(Self::Poetry),
            "C" => Some(Self::Centered),
            "*" => Some(Self::LiteralIndent),
            "X" => Some(Self::Literal),
            "U" => Some(Self::List),
            "T" => Some(Self::Table),
            "TM" => Some(Self::MultiTable),
            _ => None,
        }
    }

    /// The code written after the opening slash.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::BlockQuote => "#",
            Self::Poetry => "P",
            Self::Centered => "C",
            Self::LiteralIndent => "*",
            Self::Literal => "X",
            Self::List => "U",
            Self::Table => "T",
            Self::MultiTable => "TM",
        }
    }

    /// The code written before the closing slash.
    ///
    /// Both table kinds close with `T/`.
    #[must_use]
    pub fn end_code(self) -> &'static str {
        match self {
            Self::MultiTable => "T",
            other => other.code(),
        }
    }

    #[must_use]
    pub fn is_table(self) -> bool {
        matches!(self, Self::Table | Self::MultiTable)
    }

    /// Whether openers of other kinds are recognised inside this kind.
    #[must_use]
    pub fn allows_nesting(self) -> bool {
        self == Self::BlockQuote
    }
}

impl fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.code())
    }
}

/// Indentation of a markup region, relative to its enclosing region.
///
/// `left` and `right` add to the enclosing margins. `first` is an offset
/// from `left` applied to the first line of each paragraph and may be
/// negative to produce a hanging indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: usize,
    pub first: isize,
    pub right: usize,
}

impl Margins {
    #[must_use]
    pub const fn new(left: usize, first: isize, right: usize) -> Self {
        Self { left, first, right }
    }

    /// Apply an inline override on top of `self`. Parts missing from the
    /// override keep their current value.
    #[must_use]
    pub fn overridden_by(self, text: &str) -> Self {
        let Some(caps) = MARGINS_RE.captures(text.trim()) else {
            tracing::debug!(text, "ignoring malformed margin override");
            return self;
        };
        let left = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let first = caps.get(2).and_then(|m| m.as_str().parse().ok());
        let right = caps.get(3).and_then(|m| m.as_str().parse().ok());
        Self {
            left: left.unwrap_or(self.left),
            first: first.unwrap_or(self.first),
            right: right.unwrap_or(self.right),
        }
    }
}

/// Error returned when a margin string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid margins `{0}`, expected `[left.first,right]`")]
pub struct MarginsParseError(String);

impl FromStr for Margins {
    type Err = MarginsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !MARGINS_RE.is_match(s.trim()) {
            return Err(MarginsParseError(s.to_string()));
        }
        Ok(Self::default().overridden_by(s))
    }
}

/// How an inline tag contributes to a token's logical width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TagWidth {
    /// The tag is invisible in the final text.
    Zero,
    /// The tag becomes a single character, such as `_` for italics.
    One,
    /// The tag counts as its own characters.
    #[default]
    Literal,
}

/// Logical widths of recognised inline tags, keyed by lower-case tag name.
///
/// Opening and closing tags share a width. Tags not in the table are
/// [`TagWidth::Literal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWidths {
    widths: HashMap<String, TagWidth>,
}

impl TagWidths {
    /// A table with no recognised tags.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            widths: HashMap::new(),
        }
    }

    /// Give every default tag the same width.
    #[must_use]
    pub fn uniform(width: TagWidth) -> Self {
        let mut widths = Self::empty();
        for name in ["i", "b", "sc", "u", "g", "f"] {
            widths.set(name, width);
        }
        widths
    }

    pub fn set(&mut self, name: &str, width: TagWidth) {
        self.widths.insert(name.to_ascii_lowercase(), width);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> TagWidth {
        self.widths
            .get(&name.to_ascii_lowercase())
            .copied()
            .unwrap_or_default()
    }
}

impl Default for TagWidths {
    /// Italic, bold, underline and gesperrt markup turn into one marker
    /// character in plain text; small caps and font changes vanish.
    fn default() -> Self {
        let mut widths = Self::uniform(TagWidth::One);
        widths.set("sc", TagWidth::Zero);
        widths.set("f", TagWidth::Zero);
        widths
    }
}

/// Settings for a reflow invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowConfig {
    pub line_width: usize,
    pub tags: TagWidths,
    pub skip: Vec<MarkupKind>,
    margins: HashMap<MarkupKind, Margins>,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        let margins = HashMap::from([
            (MarkupKind::BlockQuote, Margins::new(4, 0, 4)),
            (MarkupKind::Poetry, Margins::new(12, -10, 0)),
            (MarkupKind::List, Margins::new(4, -2, 0)),
            (MarkupKind::Centered, Margins::new(0, 0, 0)),
            (MarkupKind::LiteralIndent, Margins::new(2, 0, 0)),
        ]);
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            tags: TagWidths::default(),
            skip: Vec::new(),
            margins,
        }
    }
}

impl ReflowConfig {
    #[must_use]
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, kind: MarkupKind, margins: Margins) -> Self {
        self.margins.insert(kind, margins);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: TagWidths) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_skip(mut self, kind: MarkupKind) -> Self {
        if !self.skip.contains(&kind) {
            self.skip.push(kind);
        }
        self
    }

    /// Default margins for `kind`; kinds without margins use zero.
    #[must_use]
    pub fn margins(&self, kind: MarkupKind) -> Margins {
        self.margins.get(&kind).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn skips(&self, kind: MarkupKind) -> bool {
        self.skip.contains(&kind)
    }
}
