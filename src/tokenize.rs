//! Lazy tokenization with tag-aware logical widths.
//!
//! Tokens are whitespace-delimited runs of text. Inline tags such as `<i>` or
//! `</sc>` may appear anywhere inside a token; their contribution to the
//! token's width comes from the configured [`TagWidths`] rather than from
//! their character count. Other text is measured with `unicode-width`.

use std::{iter::FusedIterator, sync::LazyLock};

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::config::{TagWidth, TagWidths};

static TAG_RE: LazyLock<Regex> = lazy_regex!(
    r"</?([A-Za-z][A-Za-z0-9]*)>",
    "inline tag regex should compile",
);

/// A whitespace-delimited run of text and the width it occupies on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub width: usize,
}

/// Iterator over the [`Token`]s of a text span.
///
/// Each call to [`Tokens::new`] yields a fresh sequence; a consumed sequence
/// cannot be rewound.
///
/// # Examples
///
/// ```
/// use ppreflow::{TagWidths, Tokens};
///
/// let tags = TagWidths::default();
/// let widths: Vec<_> = Tokens::new("an <i>odd</i> day", &tags)
///     .map(|t| (t.text, t.width))
///     .collect();
/// assert_eq!(widths, vec![("an", 2), ("<i>odd</i>", 5), ("day", 3)]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
    tags: &'a TagWidths,
}

impl<'a> Tokens<'a> {
    #[must_use]
    pub fn new(text: &'a str, tags: &'a TagWidths) -> Self { Self { rest: text, tags } }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = trimmed;
            return None;
        }
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (text, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(Token {
            text,
            width: logical_width(text, self.tags),
        })
    }
}

impl FusedIterator for Tokens<'_> {}

/// Logical width of `text`, with recognised tags measured per `tags`.
///
/// Whitespace inside `text` counts like any other character, so this also
/// measures whole lines.
#[must_use]
pub fn logical_width(text: &str, tags: &TagWidths) -> usize {
    let mut width = 0;
    let mut last = 0;
    for caps in TAG_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        width += UnicodeWidthStr::width(&text[last..whole.start()]);
        width += match tags.get(name.as_str()) {
            TagWidth::Zero => 0,
            TagWidth::One => 1,
            TagWidth::Literal => whole.as_str().len(),
        };
        last = whole.end();
    }
    width + UnicodeWidthStr::width(&text[last..])
}

impl textwrap::core::Fragment for Token<'_> {
    fn width(&self) -> f64 { as_f64(self.width) }

    /// Tokens are rejoined with a single space.
    fn whitespace_width(&self) -> f64 { 1.0 }

    fn penalty_width(&self) -> f64 { 0.0 }
}

#[expect(clippy::cast_precision_loss, reason = "line widths are far below 2^52")]
pub(crate) fn as_f64(width: usize) -> f64 { width as f64 }

/// Count of leading whitespace characters.
#[must_use]
pub(crate) fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(TagWidth::Zero, 3)]
    #[case(TagWidth::One, 5)]
    #[case(TagWidth::Literal, 10)]
    fn tag_policy_drives_width(#[case] policy: TagWidth, #[case] expected: usize) {
        let tags = TagWidths::uniform(policy);
        assert_eq!(logical_width("<i>odd</i>", &tags), expected);
    }

    #[test]
    fn token_of_only_a_tag() {
        let tags = TagWidths::uniform(TagWidth::Zero);
        let tokens: Vec<_> = Tokens::new("word </i> more", &tags).collect();
        assert_eq!(tokens[1], Token { text: "</i>", width: 0 });
    }

    #[test]
    fn unknown_tags_are_literal() {
        let tags = TagWidths::uniform(TagWidth::Zero);
        assert_eq!(logical_width("<span>x", &tags), 7);
    }

    #[test]
    fn splits_across_lines_and_tabs() {
        let tags = TagWidths::default();
        let texts: Vec<_> = Tokens::new("  one\ttwo\n  three  ", &tags)
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn sequence_is_fused() {
        let tags = TagWidths::default();
        let mut tokens = Tokens::new("a", &tags);
        assert!(tokens.next().is_some());
        assert!(tokens.next().is_none());
        assert!(tokens.next().is_none());
    }

    #[test]
    fn wide_characters_count_double() {
        let tags = TagWidths::default();
        assert_eq!(logical_width("日本", &tags), 4);
    }
}
