//! Alias directories for the newest release and release candidate.
//!
//! An alias is a full copy of its source ref directory under a stable name,
//! with the search index links rewritten from the source name to the alias
//! name. Aliases are derived data: every run removes and recreates them.

use std::fmt;
use std::path::Path;

use crate::error::AssembleError;
use crate::files::replace_dir;
use crate::search_index::{SEARCH_INDEX_FILENAME, links_mention, rewrite_ref_name, scope_urls};
use crate::version::{Classified, VersionKind};

/// Directory name of the newest-release alias.
pub const LATEST_TAG_DIR: &str = "latest-tag";
/// Directory name of the newest-release-candidate alias.
pub const RELEASE_CANDIDATE_DIR: &str = "release-candidate";

/// The two alias classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    LatestTag,
    ReleaseCandidate,
}

impl AliasKind {
    pub const ALL: [Self; 2] = [Self::LatestTag, Self::ReleaseCandidate];

    /// Fixed directory name of this alias.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::LatestTag => LATEST_TAG_DIR,
            Self::ReleaseCandidate => RELEASE_CANDIDATE_DIR,
        }
    }

    /// Version class that feeds this alias.
    #[must_use]
    pub fn version_kind(self) -> VersionKind {
        match self {
            Self::LatestTag => VersionKind::Release,
            Self::ReleaseCandidate => VersionKind::ReleaseCandidate,
        }
    }

    /// Alias whose fixed directory is `name`, if any.
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Optional alternate names for the aliases (e.g. `stable`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AliasNames {
    pub latest_tag: Option<String>,
    pub release_candidate: Option<String>,
}

impl AliasNames {
    /// Alternate name configured for `kind`.
    #[must_use]
    pub fn alternate(&self, kind: AliasKind) -> Option<&str> {
        match kind {
            AliasKind::LatestTag => self.latest_tag.as_deref(),
            AliasKind::ReleaseCandidate => self.release_candidate.as_deref(),
        }
    }

    pub(crate) fn alternate_mut(&mut self, kind: AliasKind) -> &mut Option<String> {
        match kind {
            AliasKind::LatestTag => &mut self.latest_tag,
            AliasKind::ReleaseCandidate => &mut self.release_candidate,
        }
    }

    /// Alias whose alternate name is `name`, if any.
    #[must_use]
    pub fn kind_of_alternate(&self, name: &str) -> Option<AliasKind> {
        AliasKind::ALL
            .into_iter()
            .find(|&kind| self.alternate(kind) == Some(name))
    }

    /// Check that every alternate name is a usable, distinct directory name.
    pub fn validate(&self) -> Result<(), AssembleError> {
        for kind in AliasKind::ALL {
            let Some(name) = self.alternate(kind) else {
                continue;
            };
            validate_dir_name(name)?;
            if AliasKind::from_dir_name(name).is_some() {
                return Err(AssembleError::InvalidAlias(format!(
                    "alternate name for {kind} cannot be the fixed alias name {name:?}"
                )));
            }
        }
        if let (Some(a), Some(b)) = (&self.latest_tag, &self.release_candidate)
            && a == b
        {
            return Err(AssembleError::InvalidAlias(format!(
                "both aliases use the alternate name {a:?}"
            )));
        }
        Ok(())
    }
}

fn validate_dir_name(name: &str) -> Result<(), AssembleError> {
    if name.is_empty() {
        return Err(AssembleError::InvalidAlias(
            "alias name cannot be empty".to_owned(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AssembleError::InvalidAlias(format!(
            "{name:?} is not a plain directory name"
        )));
    }
    Ok(())
}

/// Result of processing one alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome {
    /// Alias (and alternate) directories were recreated from `source`.
    Created { source: String, dirs: Vec<String> },
    /// No ref of the alias class exists.
    Skipped,
    /// Materialization failed; other aliases were still processed.
    Failed { source: String, error: String },
}

/// Outcome for one alias class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasReport {
    pub kind: AliasKind,
    pub outcome: AliasOutcome,
}

/// Recreate `<root>/<alias>` (and its alternate) from `<root>/<source>`.
///
/// With a `base_url`, absolute index links are also scoped under the alias
/// path before the alternate copy is taken. Returns the directory names that
/// were written.
pub fn materialize(
    root: &Path,
    kind: AliasKind,
    source: &str,
    alternate: Option<&str>,
    base_url: Option<&str>,
) -> Result<Vec<String>, AssembleError> {
    let alias = kind.dir_name();
    if source == alias || alternate == Some(source) {
        return Err(AssembleError::InvalidAlias(format!(
            "{kind} cannot replace its own source {source:?}"
        )));
    }

    let alias_dir = root.join(alias);
    replace_dir(&root.join(source), &alias_dir)?;

    let index_path = alias_dir.join(SEARCH_INDEX_FILENAME);
    rewrite_ref_name(&index_path, source, alias)?;
    if index_path.exists() && links_mention(&index_path, source)? {
        tracing::warn!(alias, source, "Alias search index still mentions source ref");
    }
    if let Some(base_url) = base_url {
        scope_urls(&index_path, base_url, alias)?;
    }

    let mut dirs = vec![alias.to_owned()];
    if let Some(alternate) = alternate {
        replace_dir(&alias_dir, &root.join(alternate))?;
        dirs.push(alternate.to_owned());
    }
    Ok(dirs)
}

/// Materialize every alias class that has a source ref.
///
/// `real_refs` are the ref directories built by the generator; an alternate
/// naming one of them is refused and nothing is written for that alias. A
/// failure is recorded for its alias only and never stops the other one.
pub fn materialize_all(
    root: &Path,
    classified: &Classified,
    names: &AliasNames,
    real_refs: &[&str],
    base_url: Option<&str>,
) -> Vec<AliasReport> {
    AliasKind::ALL
        .into_iter()
        .map(|kind| {
            let outcome = match classified.get(kind.version_kind()) {
                None => {
                    tracing::info!(alias = %kind, "No matching ref, skipping alias");
                    AliasOutcome::Skipped
                }
                Some(source) => {
                    let result = match names.alternate(kind) {
                        Some(alternate) if real_refs.contains(&alternate) => {
                            Err(AssembleError::InvalidAlias(format!(
                                "alternate name {alternate:?} for {kind} is a real ref"
                            )))
                        }
                        alternate => materialize(root, kind, source, alternate, base_url),
                    };
                    match result {
                        Ok(dirs) => {
                            tracing::info!(alias = %kind, source, ?dirs, "Created alias");
                            AliasOutcome::Created {
                                source: source.to_owned(),
                                dirs,
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                alias = %kind,
                                source,
                                error = %e,
                                "Failed to create alias"
                            );
                            AliasOutcome::Failed {
                                source: source.to_owned(),
                                error: e.to_string(),
                            }
                        }
                    }
                }
            };
            AliasReport { kind, outcome }
        })
        .collect()
}
