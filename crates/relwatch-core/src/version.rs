use std::cmp::Ordering;
use std::fmt;

const MIN_COMPONENTS: usize = 3;
const FALLBACK_VERSION: &str = "1.0.0";

/// A published or running version, stored without its leading `v` marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self(trimmed.strip_prefix('v').unwrap_or(trimmed).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer components, zero-padded to at least major/minor/patch.
    #[must_use]
    pub fn components(&self) -> Vec<u64> {
        components(&self.0)
    }

    /// Whether `other` is a newer release than `self`.
    #[must_use]
    pub fn is_older_than(&self, other: &VersionString) -> bool {
        is_newer(&self.0, &other.0)
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Picks the running version from build metadata: the marketing version, then
/// the build version, then `1.0.0`. Blank values count as absent.
#[must_use]
pub fn resolve_current_version(
    marketing_version: Option<&str>,
    build_version: Option<&str>,
) -> VersionString {
    [marketing_version, build_version]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map_or_else(|| VersionString::new(FALLBACK_VERSION), VersionString::new)
}

/// Every `v` is removed, not only a leading one, and tokens that are not
/// non-negative integers are dropped rather than read as zero.
#[must_use]
pub fn components(version: &str) -> Vec<u64> {
    let mut parts: Vec<u64> = version
        .replace('v', "")
        .split('.')
        .filter_map(|token| token.parse().ok())
        .collect();
    if parts.len() < MIN_COMPONENTS {
        parts.resize(MIN_COMPONENTS, 0);
    }
    parts
}

/// Returns `true` when `latest` is strictly newer than `current`.
///
/// Only the common prefix of the two padded component lists is compared, so
/// `1.2.3.4` against `1.2.3` is not an update in either direction.
#[must_use]
pub fn is_newer(current: &str, latest: &str) -> bool {
    let current = components(current);
    let latest = components(latest);

    current
        .iter()
        .zip(&latest)
        .map(|(current, latest)| latest.cmp(current))
        .find(|ordering| *ordering != Ordering::Equal)
        == Some(Ordering::Greater)
}
