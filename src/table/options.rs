//! The option mini-language of table openers.
//!
//! Options come in groups of `Key(Opt:val ...)`. The key is `Table`,
//! `Column` or a column number `1`..`9`; keys and option names may be
//! abbreviated to any case-insensitive prefix, so `Col(S:'|')` sets the
//! side character of every column.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Warning;

/// Number of columns that can carry their own overrides.
pub const MAX_COLUMN_OVERRIDES: usize = 9;

static GROUP_RE: LazyLock<Regex> = lazy_regex!(
    r"([A-Za-z]+|[1-9])\s*\(([^)]*)\)",
    "table option group regex should compile",
);

static OPTION_RE: LazyLock<Regex> = lazy_regex!(
    r#"([A-Za-z]+)\s*:\s*('[^']*'|"[^"]*"|[^\s'"]+)"#,
    "table option regex should compile",
);

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Settings for one column, or the defaults shared by all columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnProps {
    pub align: Option<Align>,
    pub width: Option<usize>,
    pub bottom: Option<char>,
    pub side: Option<char>,
}

impl ColumnProps {
    /// Fill unset fields from `defaults`.
    #[must_use]
    fn or(self, defaults: Self) -> Self {
        Self {
            align: self.align.or(defaults.align),
            width: self.width.or(defaults.width),
            bottom: self.bottom.or(defaults.bottom),
            side: self.side.or(defaults.side),
        }
    }
}

/// Table-wide settings parsed from the opener line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableProps {
    /// Rows may span several lines (`/TM`).
    pub multi_line: bool,
    pub width: Option<usize>,
    pub top: Option<char>,
    /// Character drawn at the left edge of every row.
    pub side: Option<char>,
    pub defaults: ColumnProps,
    pub columns: [ColumnProps; MAX_COLUMN_OVERRIDES],
}

impl TableProps {
    /// Parse the option text of an opener at 1-based `line`.
    ///
    /// Malformed options are ignored; recognised options with unsupported
    /// values add a warning.
    #[must_use]
    pub fn parse(options: &str, multi_line: bool, line: usize, warnings: &mut Vec<Warning>) -> Self {
        let mut props = Self {
            multi_line,
            ..Self::default()
        };
        for group in GROUP_RE.captures_iter(options) {
            let (Some(key), Some(body)) = (group.get(1), group.get(2)) else {
                continue;
            };
            let key = key.as_str();
            if let Ok(n) = key.parse::<usize>() {
                let column = &mut props.columns[n - 1];
                parse_column(body.as_str(), column, line, warnings);
            } else if is_prefix(key, "table") {
                props.parse_table_group(body.as_str(), line, warnings);
            } else if is_prefix(key, "column") {
                parse_column(body.as_str(), &mut props.defaults, line, warnings);
            } else {
                tracing::debug!(key, "ignoring unknown table option group");
            }
        }
        props
    }

    fn parse_table_group(&mut self, body: &str, line: usize, warnings: &mut Vec<Warning>) {
        for (name, value) in options(body) {
            if is_prefix(name, "width") {
                self.width = parse_width(value).or(self.width);
            } else if is_prefix(name, "top") {
                self.top = parse_char(name, value, line, warnings).or(self.top);
            } else if is_prefix(name, "side") {
                self.side = parse_char(name, value, line, warnings).or(self.side);
            }
        }
    }

    /// Settings of column `index` (0-based): its overrides on top of the
    /// column defaults.
    #[must_use]
    pub fn column(&self, index: usize) -> ColumnProps {
        self.columns
            .get(index)
            .copied()
            .unwrap_or_default()
            .or(self.defaults)
    }

    /// Every side character in use, for splitting rows.
    pub(crate) fn side_chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = std::iter::once(self.side)
            .chain(std::iter::once(self.defaults.side))
            .chain(self.columns.iter().map(|c| c.side))
            .flatten()
            .collect();
        chars.sort_unstable();
        chars.dedup();
        chars
    }

    /// Every top and bottom border character in use.
    pub(crate) fn rule_chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = std::iter::once(self.top)
            .chain(std::iter::once(self.defaults.bottom))
            .chain(self.columns.iter().map(|c| c.bottom))
            .flatten()
            .collect();
        chars.sort_unstable();
        chars.dedup();
        chars
    }
}

fn options(body: &str) -> impl Iterator<Item = (&str, &str)> {
    OPTION_RE.captures_iter(body).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str();
        Some((name, value))
    })
}

fn parse_column(body: &str, column: &mut ColumnProps, line: usize, warnings: &mut Vec<Warning>) {
    for (name, value) in options(body) {
        if is_prefix(name, "align") {
            column.align = parse_align(name, value, line, warnings).or(column.align);
        } else if is_prefix(name, "width") {
            column.width = parse_width(value).or(column.width);
        } else if is_prefix(name, "bottom") {
            column.bottom = parse_char(name, value, line, warnings).or(column.bottom);
        } else if is_prefix(name, "side") {
            column.side = parse_char(name, value, line, warnings).or(column.side);
        }
    }
}

fn is_prefix(word: &str, full: &str) -> bool {
    !word.is_empty() && word.len() <= full.len() && full[..word.len()].eq_ignore_ascii_case(word)
}

fn unquote(value: &str) -> &str {
    let stripped = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
    stripped.unwrap_or(value)
}

fn parse_width(value: &str) -> Option<usize> { unquote(value).parse().ok().filter(|&w| w > 0) }

fn parse_align(name: &str, value: &str, line: usize, warnings: &mut Vec<Warning>) -> Option<Align> {
    match unquote(value).chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('L') => Some(Align::Left),
        Some('C') => Some(Align::Center),
        Some('R') => Some(Align::Right),
        _ => {
            warn_unsupported(name, value, line, warnings);
            None
        }
    }
}

fn parse_char(name: &str, value: &str, line: usize, warnings: &mut Vec<Warning>) -> Option<char> {
    let mut chars = unquote(value).chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() && !c.is_alphanumeric() => Some(c),
        _ => {
            warn_unsupported(name, value, line, warnings);
            None
        }
    }
}

fn warn_unsupported(name: &str, value: &str, line: usize, warnings: &mut Vec<Warning>) {
    let warning = Warning::UnsupportedOption {
        line,
        option: format!("{name}:{value}"),
    };
    tracing::warn!(%warning);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn props(options: &str) -> (TableProps, Vec<Warning>) {
        let mut warnings = Vec::new();
        let props = TableProps::parse(options, false, 1, &mut warnings);
        (props, warnings)
    }

    #[test]
    fn parses_full_option_set() {
        let (props, warnings) = props(
            "Table(Width:60 Top:'-' Side:'|') Column(Align:C Bottom:'=' Side:'|') 3(Align:R Width:8)",
        );
        assert!(warnings.is_empty());
        assert_eq!(props.width, Some(60));
        assert_eq!(props.top, Some('-'));
        assert_eq!(props.side, Some('|'));
        assert_eq!(props.column(0).align, Some(Align::Center));
        assert_eq!(props.column(2).align, Some(Align::Right));
        assert_eq!(props.column(2).width, Some(8));
        assert_eq!(props.column(2).bottom, Some('='));
    }

    #[rstest]
    #[case("Col(S:'|')")]
    #[case("c(side:|)")]
    #[case("COLUMN(SIDE:\"|\")")]
    fn keys_match_by_prefix(#[case] options: &str) {
        let (props, _) = props(options);
        assert_eq!(props.defaults.side, Some('|'));
    }

    #[test]
    fn malformed_options_are_ignored() {
        let (props, warnings) = props("Table(Width:wide) Column(Colour:red) Nonsense(A:L)");
        assert_eq!(props, TableProps::default());
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case("Column(Align:J)")]
    #[case("Column(Side:'||')")]
    #[case("Table(Top:' ')")]
    fn unsupported_values_warn(#[case] options: &str) {
        let (_, warnings) = props(options);
        assert!(matches!(warnings.as_slice(), [Warning::UnsupportedOption { line: 1, .. }]));
    }

    #[test]
    fn collects_border_characters() {
        let (props, _) = props("T(T:'~' S:'!') C(B:'-') 2(S:'|' B:'-')");
        assert_eq!(props.side_chars(), vec!['!', '|']);
        assert_eq!(props.rule_chars(), vec!['-', '~']);
    }
}
