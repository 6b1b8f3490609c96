//! Cell text fitting.

use std::borrow::Cow;

const ELLIPSIS: &str = "\u{2026}";

/// Shorten `text` with a trailing ellipsis until `measure` says it fits in
/// `max_width`. Returns the text unchanged when it already fits, and an
/// empty string when not even the ellipsis fits.
pub fn fit_text<'a, F>(text: &'a str, max_width: f64, mut measure: F) -> Cow<'a, str>
where
    F: FnMut(&str) -> f64,
{
    if text.is_empty() || measure(text) <= max_width {
        return Cow::Borrowed(text);
    }
    if measure(ELLIPSIS) > max_width {
        return Cow::Borrowed("");
    }
    // Binary search over char boundaries for the longest fitting prefix
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let (mut lo, mut hi) = (0usize, boundaries.len());
    let mut candidate = String::with_capacity(text.len() + ELLIPSIS.len());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        let end = boundaries.get(mid).copied().unwrap_or(text.len());
        candidate.clear();
        candidate.push_str(text.get(..end).unwrap_or_default());
        candidate.push_str(ELLIPSIS);
        if measure(&candidate) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    let end = boundaries.get(lo).copied().unwrap_or(text.len());
    let mut out = text.get(..end).unwrap_or_default().trim_end().to_string();
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}
