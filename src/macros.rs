//! Helper macros used across the crate.

/// Lazily compile a [`Regex`] for a markup pattern, panicking with `$msg` if
/// the pattern is invalid.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use regex::Regex;
/// static CLOSER: LazyLock<Regex> = ppreflow::lazy_regex!(r"^(?i)p/\s*$", "closer");
/// assert!(CLOSER.is_match("P/"));
/// ```
#[macro_export]
macro_rules! lazy_regex {
    ($pattern:expr, $msg:expr $(,)?) => {
        LazyLock::new(|| Regex::new($pattern).expect($msg))
    };
}
