//! Literal wildcard matching for allow-list patterns.
//!
//! Patterns come from configuration and are matched literally: the only
//! special character is `*`, which matches any run of characters (including
//! none). Nothing is ever compiled to a regular expression.

/// Match `candidate` against `pattern`, anchored at both ends.
///
/// The pattern is split on `*`; the first segment must be a prefix, the last a
/// suffix, and the segments in between must appear in order.
///
/// # Example
///
/// ```
/// use gallery_proxy::access::pattern::wildcard_match;
///
/// assert!(wildcard_match("https://*.example.com", "https://a.b.example.com"));
/// assert!(!wildcard_match("https://*.example.com", "https://example.com"));
/// ```
pub fn wildcard_match(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == candidate;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let (first, rest_segments) = match segments.split_first() {
        Some(split) => split,
        None => return false,
    };
    let (last, middle) = match rest_segments.split_last() {
        Some(split) => split,
        None => return false,
    };

    let mut remaining = match candidate.strip_prefix(first) {
        Some(rest) => rest,
        None => return false,
    };

    for segment in middle {
        match remaining.find(segment) {
            Some(idx) => remaining = &remaining[idx + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last)
}
