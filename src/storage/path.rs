//! Path handling
//!
//! Turns user-supplied paths into the canonical form used as map keys.

use crate::error::{Result, VstorageError};

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Split a path into its segments
///
/// Leading and trailing separators are ignored; the root (`""` or `"/"`)
/// has no segments. Empty interior segments are rejected.
pub fn path_segments(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let segments: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(VstorageError::InvalidPath(format!(
            "empty segment in path {:?}",
            path
        )));
    }
    Ok(segments)
}

/// Canonical form of `path`: segments joined by single separators, no
/// leading or trailing separator, root as `""`
pub fn normalize_path(path: &str) -> Result<String> {
    Ok(path_segments(path)?.join("/"))
}
