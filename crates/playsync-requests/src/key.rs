//! Composite request keys.

use playsync_core::RegionTarget;

/// Identity of an in-flight request: normalized destination path plus the
/// target region its response will replace.
///
/// Construction is pure and deterministic: the same element/path inputs
/// always produce the same key, which is what makes cancel-then-replace
/// dedup sound.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Normalized destination path.
    pub path: String,
    /// Target region, `Document` when the element declares none.
    pub target: RegionTarget,
}

impl RequestKey {
    /// Build a key from a raw path and target region.
    pub fn new(path: &str, target: RegionTarget) -> Self {
        Self {
            path: normalize_path(path),
            target,
        }
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            RegionTarget::Document => write!(f, "{} -> document", self.path),
            RegionTarget::Element(id) => write!(f, "{} -> {}", self.path, id.as_str()),
        }
    }
}

/// Normalize a destination path: strip query and fragment, ensure a
/// leading slash, and collapse a trailing slash (the root keeps its).
pub fn normalize_path(raw: &str) -> String {
    let raw = raw.trim();
    let without_suffix = raw
        .split_once(['?', '#'])
        .map_or(raw, |(path, _)| path);
    let mut path = if without_suffix.starts_with('/') {
        without_suffix.to_string()
    } else {
        format!("/{without_suffix}")
    };
    while path.len() > 1 && path.ends_with('/') {
        let _ = path.pop();
    }
    path
}
