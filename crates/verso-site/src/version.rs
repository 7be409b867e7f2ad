//! Version-like ref names and their numeric ordering.
//!
//! Tag directories are named `vMAJOR.MINOR.PATCH` or `vMAJOR.MINOR.PATCH-rcN`.
//! Ordering compares the numeric components, never the strings, so `v2.10.0`
//! sorts after `v2.9.0`.

use std::cmp::{Ordering, Reverse};
use std::sync::LazyLock;

use regex::Regex;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)(?:-rc(\d+))?$").unwrap());

/// Class of a version-like ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    /// Ordinary release (`v1.2.3`).
    Release,
    /// Release candidate (`v1.2.3-rc1`).
    ReleaseCandidate,
}

/// Parsed version of a ref directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Release candidate number, `None` for ordinary releases.
    pub rc: Option<u64>,
}

impl Version {
    /// Parse a ref name. Returns `None` for anything that is not exactly
    /// `vMAJOR.MINOR.PATCH` or `vMAJOR.MINOR.PATCH-rcN`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(name)?;
        let rc = match caps.get(4) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
            rc,
        })
    }

    #[must_use]
    pub fn kind(&self) -> VersionKind {
        if self.rc.is_some() {
            VersionKind::ReleaseCandidate
        } else {
            VersionKind::Release
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // A release outranks all of its own candidates.
        let rc_rank = |v: &Self| v.rc.map_or((1, 0), |n| (0, n));
        (self.major, self.minor, self.patch, rc_rank(self)).cmp(&(
            other.major,
            other.minor,
            other.patch,
            rc_rank(other),
        ))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Newest ref of each version class.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Newest ordinary release, source of the `latest-tag` alias.
    pub latest_release: Option<String>,
    /// Newest release candidate, source of the `release-candidate` alias.
    pub latest_candidate: Option<String>,
}

impl Classified {
    /// Winner for the given class.
    #[must_use]
    pub fn get(&self, kind: VersionKind) -> Option<&str> {
        match kind {
            VersionKind::Release => self.latest_release.as_deref(),
            VersionKind::ReleaseCandidate => self.latest_candidate.as_deref(),
        }
    }
}

/// Pick the newest release and newest release candidate from `names`.
///
/// Names that do not parse are ignored. Names that parse to the same version
/// (e.g. `v1.0.0` and `v01.0.0`) are broken by the greater name.
pub fn classify<'a, I>(names: I) -> Classified
where
    I: IntoIterator<Item = &'a str>,
{
    let mut release: Option<(Version, &str)> = None;
    let mut candidate: Option<(Version, &str)> = None;

    for name in names {
        let Some(version) = Version::parse(name) else {
            continue;
        };
        let slot = match version.kind() {
            VersionKind::Release => &mut release,
            VersionKind::ReleaseCandidate => &mut candidate,
        };
        if slot.is_none_or(|best| (version, name) > best) {
            *slot = Some((version, name));
        }
    }

    Classified {
        latest_release: release.map(|(_, name)| name.to_owned()),
        latest_candidate: candidate.map(|(_, name)| name.to_owned()),
    }
}

/// Sort key placing other names first in descending order, then versions
/// newest first.
pub type VersionSortKey<'a> = (u8, Reverse<Option<Version>>, Reverse<&'a str>);

/// Sort key for refs outside the explicit priority list.
#[must_use]
pub fn version_sort_key(name: &str) -> VersionSortKey<'_> {
    match Version::parse(name) {
        Some(version) => (1, Reverse(Some(version)), Reverse(name)),
        None => (0, Reverse(None), Reverse(name)),
    }
}
