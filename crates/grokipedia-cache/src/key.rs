//! Mapping of cache keys onto file names.
//!
//! Every character outside `[A-Za-z0-9_-]` becomes `_`. Two keys that differ
//! only in replaced characters therefore share one record; this collision is
//! a known limitation.

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
