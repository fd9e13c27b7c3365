//! Logical path splitting.
//!
//! Paths are slash-delimited and relative to a root grant. Backslashes are
//! normalized to `/` first. Empty segments (from a leading, trailing or doubled
//! slash) are kept as-is; the walker decides what an empty name means.

/// Split a logical path into its segment names.
pub fn split_path(path: &str) -> Vec<String> {
    path.replace('\\', "/").split('/').map(str::to_owned).collect()
}

/// True when the caller supplied nothing usable as a path.
#[inline]
pub fn is_blank(path: &str) -> bool {
    path.trim().is_empty()
}
