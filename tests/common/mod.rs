//! Utility helpers shared across integration tests.

use ppreflow::{NoProgress, ReflowConfig, VecBuffer, reflow};
use unicode_width::UnicodeWidthStr;

/// Build a `Vec<String>` from a list of string slices.
///
/// This macro is primarily used in tests to reduce boilerplate when
/// constructing example documents line by line.
macro_rules! lines_vec {
    ($($line:expr),* $(,)?) => {
        vec![$($line.to_string()),*]
    };
}

/// Reflow every line of `lines` and return the result.
#[allow(dead_code, reason = "not every test crate reflows buffers directly")]
pub fn reflow_all(lines: &[String], config: &ReflowConfig) -> Vec<String> {
    let mut buf = VecBuffer::new(lines.to_vec());
    let range = 0..lines.len();
    reflow(&mut buf, range, config, &mut NoProgress).expect("reflow succeeds");
    buf.into_lines()
}

/// Assert that no line is wider than `width` display columns.
#[allow(dead_code, reason = "not every test crate checks widths")]
pub fn assert_within_width(lines: &[String], width: usize) {
    for line in lines {
        assert!(
            UnicodeWidthStr::width(line.as_str()) <= width,
            "line exceeds {width} columns: {line:?}"
        );
    }
}
