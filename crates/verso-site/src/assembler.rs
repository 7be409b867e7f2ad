//! The assembly pipeline over one site root.
//!
//! Steps, in order: scope search indexes of the real refs, recreate the
//! aliases, write the landing redirect, write the root manifest, inject the
//! versions dropdown into every ref's pages. Every step takes the root path
//! explicitly; nothing depends on the working directory.

use std::path::{Path, PathBuf};

use crate::alias::{AliasKind, AliasNames, AliasOutcome, AliasReport, materialize_all};
use crate::error::AssembleError;
use crate::files::list_ref_dirs;
use crate::inject::{InjectStats, inject_tree};
use crate::manifest::{ManifestOutcome, write_root_manifest};
use crate::navigation::{NavEntry, NavigationSettings, RefFilter, RemainingOrder, render_dropdown};
use crate::redirect::{normalize_base_url, write_landing};
use crate::search_index::{SEARCH_INDEX_FILENAME, scope_urls};
use crate::version::{Version, classify};

/// Inputs for one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Directory holding one subdirectory per ref.
    pub root: PathBuf,
    /// Absolute site URL; a trailing `/` is added when missing.
    pub base_url: String,
    /// Ref the site root redirects to.
    pub landing_ref: String,
    /// Inclusion pattern over ref directory names.
    pub pattern: String,
    /// Refs listed first in the dropdown, in this order.
    pub refs_order: Vec<String>,
    pub alias_names: AliasNames,
    pub remaining_order: RemainingOrder,
}

/// What an assembly run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleReport {
    pub aliases: Vec<AliasReport>,
    /// Search indexes whose links were rewritten.
    pub scoped_indexes: usize,
    pub root_manifest: ManifestOutcome,
    /// Dropdown entries, in display order.
    pub navigation: Vec<NavEntry>,
    pub pages: InjectStats,
}

impl AssembleReport {
    /// Number of aliases that failed to materialize.
    #[must_use]
    pub fn alias_failures(&self) -> usize {
        self.aliases
            .iter()
            .filter(|r| matches!(r.outcome, AliasOutcome::Failed { .. }))
            .count()
    }
}

/// What a navigation-only run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationReport {
    pub scoped_indexes: usize,
    pub navigation: Vec<NavEntry>,
    pub pages: InjectStats,
}

/// Assembles a multi-version site under one root directory.
#[derive(Debug)]
pub struct Assembler {
    root: PathBuf,
    landing_ref: String,
    /// Alternate names as configured, including refused ones.
    alias_names: AliasNames,
    navigation: NavigationSettings,
}

impl Assembler {
    /// Validate `config` and prepare an assembler.
    ///
    /// # Errors
    ///
    /// Fails if the root is not a directory, the pattern does not compile, or
    /// an alternate alias name is unusable.
    pub fn new(config: AssembleConfig) -> Result<Self, AssembleError> {
        if !config.root.is_dir() {
            return Err(AssembleError::RootNotFound(config.root));
        }
        config.alias_names.validate()?;

        // An alternate named like the landing ref or a version tag stands for
        // the real directory; navigation and scanning must not treat it as a copy.
        let mut shown_names = config.alias_names.clone();
        for kind in AliasKind::ALL {
            if let Some(name) = config.alias_names.alternate(kind)
                && (name == config.landing_ref || Version::parse(name).is_some())
            {
                tracing::warn!(
                    alias = %kind,
                    name,
                    "Alternate alias name is a real ref, it will not be written"
                );
                *shown_names.alternate_mut(kind) = None;
            }
        }

        let navigation = NavigationSettings {
            filter: RefFilter::new(&config.pattern)?,
            refs_order: config.refs_order,
            alias_names: shown_names,
            base_url: normalize_base_url(&config.base_url),
            remaining_order: config.remaining_order,
        };
        Ok(Self {
            root: config.root,
            landing_ref: config.landing_ref,
            alias_names: config.alias_names,
            navigation,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the full pipeline.
    ///
    /// Alias failures are reported, not returned; any other filesystem error
    /// aborts the run.
    pub fn run(&self) -> Result<AssembleReport, AssembleError> {
        let dirs = list_ref_dirs(&self.root)?;
        let real_refs: Vec<&str> = dirs
            .iter()
            .map(String::as_str)
            .filter(|dir| !self.is_derived(dir))
            .collect();

        let scoped_indexes = self.scope_search_indexes(&real_refs)?;

        let classified = classify(real_refs.iter().copied());
        // Refused alternates stay reserved even before their directory exists.
        let mut taken = real_refs.clone();
        for kind in AliasKind::ALL {
            if let Some(name) = self.alias_names.alternate(kind)
                && self.navigation.alias_names.alternate(kind).is_none()
                && !taken.contains(&name)
            {
                taken.push(name);
            }
        }
        let aliases = materialize_all(
            &self.root,
            &classified,
            &self.alias_names,
            &taken,
            Some(&self.navigation.base_url),
        );

        if !real_refs.contains(&self.landing_ref.as_str()) {
            tracing::warn!(
                landing_ref = %self.landing_ref,
                "Landing ref has no directory, redirect will point at a missing page"
            );
        }
        write_landing(&self.root, &self.navigation.base_url, &self.landing_ref)?;
        let root_manifest = write_root_manifest(&self.root, &self.landing_ref)?;

        let (navigation, pages) = self.inject_navigation()?;

        Ok(AssembleReport {
            aliases,
            scoped_indexes,
            root_manifest,
            navigation,
            pages,
        })
    }

    /// Scope search indexes and inject the dropdown, leaving aliases, the
    /// landing page and the root manifest alone.
    pub fn inject_navigation_only(&self) -> Result<NavigationReport, AssembleError> {
        let dirs = list_ref_dirs(&self.root)?;
        let real_refs: Vec<&str> = dirs
            .iter()
            .map(String::as_str)
            .filter(|dir| !self.is_derived(dir))
            .collect();
        let scoped_indexes = self.scope_search_indexes(&real_refs)?;
        let (navigation, pages) = self.inject_navigation()?;
        Ok(NavigationReport {
            scoped_indexes,
            navigation,
            pages,
        })
    }

    /// Alias directories and their alternate copies are regenerated, never
    /// edited in place.
    fn is_derived(&self, dir: &str) -> bool {
        AliasKind::from_dir_name(dir).is_some()
            || self.navigation.alias_names.kind_of_alternate(dir).is_some()
    }

    fn scope_search_indexes(&self, refs: &[&str]) -> Result<usize, AssembleError> {
        let mut scoped = 0;
        for &name in refs {
            if !self.navigation.filter.matches(name) {
                continue;
            }
            let index = self.root.join(name).join(SEARCH_INDEX_FILENAME);
            if scope_urls(&index, &self.navigation.base_url, name)? {
                tracing::info!(ref_name = name, "Scoped search index URLs");
                scoped += 1;
            }
        }
        Ok(scoped)
    }

    fn inject_navigation(&self) -> Result<(Vec<NavEntry>, InjectStats), AssembleError> {
        let dirs = list_ref_dirs(&self.root)?;
        let entries = self.navigation.build(&dirs);
        tracing::info!(
            entries = ?entries.iter().map(|e| e.dir.as_str()).collect::<Vec<_>>(),
            "Built versions dropdown"
        );
        let dropdown = render_dropdown(&entries);

        let mut pages = InjectStats::default();
        for dir in &dirs {
            let stats = inject_tree(&self.root.join(dir), &dropdown)?;
            tracing::debug!(ref_name = %dir, ?stats, "Injected navigation");
            pages.merge(stats);
        }
        Ok((entries, pages))
    }
}
