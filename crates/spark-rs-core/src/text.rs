//! Shared regex helpers.

use regex::Regex;
use std::sync::OnceLock;

/// Compile `pattern` once into `cell`; an invalid pattern yields `None`.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Slice from the first `open` to the last `close`, inclusive.
pub(crate) fn outer_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}
