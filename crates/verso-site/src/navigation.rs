//! Cross-version navigation: which refs are listed, in what order, and the
//! "Versions" dropdown markup shown in every page's navbar.

use std::fmt::{self, Write};
use std::str::FromStr;

use regex::Regex;

use crate::alias::{AliasKind, AliasNames};
use crate::error::AssembleError;
use crate::html::escape;
use crate::version::version_sort_key;

/// Element id of the dropdown toggle; also used to find an existing dropdown.
pub const DROPDOWN_ID: &str = "dropdown-versions";

/// Inclusion filter over ref directory names.
///
/// The pattern must match at the start of the name. Anchor the end with `$`.
#[derive(Debug, Clone)]
pub struct RefFilter {
    regex: Regex,
}

impl RefFilter {
    /// Compile `pattern` as a start-anchored filter.
    pub fn new(pattern: &str) -> Result<Self, AssembleError> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Ordering of listed refs that are not in the priority list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemainingOrder {
    /// Directory enumeration order, as the filesystem returns it.
    #[default]
    Filesystem,
    /// Other names in descending order, then versions newest first.
    Sorted,
}

impl RemainingOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sorted => "sorted",
            Self::Filesystem => "filesystem",
        }
    }
}

impl fmt::Display for RemainingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemainingOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sorted" => Ok(Self::Sorted),
            "filesystem" => Ok(Self::Filesystem),
            other => Err(format!(
                "unknown order {other:?}, expected \"sorted\" or \"filesystem\""
            )),
        }
    }
}

/// One item of the versions dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Text shown in the dropdown.
    pub label: String,
    /// Ref directory the entry links to.
    pub dir: String,
    /// Absolute link target.
    pub href: String,
}

/// Inputs for building the navigation list.
#[derive(Debug, Clone)]
pub struct NavigationSettings {
    pub filter: RefFilter,
    /// Refs listed first, in this order.
    pub refs_order: Vec<String>,
    pub alias_names: AliasNames,
    /// Site base URL ending in `/`.
    pub base_url: String,
    pub remaining_order: RemainingOrder,
}

impl NavigationSettings {
    /// Build the ordered navigation list from the ref directories on disk.
    ///
    /// Priority entries with no directory are omitted; directories rejected by
    /// the filter are never listed. Alternate alias copies are represented by
    /// their alias entry, also when the priority list names the alternate.
    #[must_use]
    pub fn build(&self, dirs_on_disk: &[String]) -> Vec<NavEntry> {
        let listed: Vec<&str> = dirs_on_disk
            .iter()
            .map(String::as_str)
            .filter(|dir| self.alias_names.kind_of_alternate(dir).is_none())
            .filter(|dir| self.filter.matches(dir))
            .collect();

        let priority: Vec<&str> = self
            .refs_order
            .iter()
            .map(|wanted| match self.alias_names.kind_of_alternate(wanted) {
                Some(kind) => kind.dir_name(),
                None => wanted.as_str(),
            })
            .collect();

        let mut ordered: Vec<&str> = Vec::with_capacity(listed.len());
        for &wanted in &priority {
            if listed.contains(&wanted) && !ordered.contains(&wanted) {
                ordered.push(wanted);
            }
        }

        let mut remaining: Vec<&str> = listed
            .into_iter()
            .filter(|dir| !priority.contains(dir))
            .collect();
        if self.remaining_order == RemainingOrder::Sorted {
            remaining.sort_by(|a, b| version_sort_key(a).cmp(&version_sort_key(b)));
        }
        ordered.extend(remaining);

        ordered.into_iter().map(|dir| self.entry(dir)).collect()
    }

    fn entry(&self, dir: &str) -> NavEntry {
        let label = AliasKind::from_dir_name(dir)
            .and_then(|kind| self.alias_names.alternate(kind))
            .unwrap_or(dir);
        NavEntry {
            label: label.to_owned(),
            dir: dir.to_owned(),
            href: format!("{}{dir}/", self.base_url),
        }
    }
}

/// Render the versions dropdown as a Bootstrap navbar item.
#[must_use]
pub fn render_dropdown(entries: &[NavEntry]) -> String {
    let mut html = String::with_capacity(256 + entries.len() * 96);
    html.push_str("<li class=\"nav-item dropdown\">\n");
    let _ = writeln!(
        html,
        "<a href=\"#\" class=\"nav-link dropdown-toggle\" data-bs-toggle=\"dropdown\" \
         role=\"button\" aria-expanded=\"false\" aria-haspopup=\"true\" \
         id=\"{DROPDOWN_ID}\">Versions</a>"
    );
    let _ = writeln!(
        html,
        "<div class=\"dropdown-menu\" aria-labelledby=\"{DROPDOWN_ID}\">"
    );
    for entry in entries {
        let _ = writeln!(
            html,
            "<a class=\"dropdown-item\" data-toggle=\"tooltip\" title=\"\" href=\"{}\">{}</a>",
            escape(&entry.href),
            escape(&entry.label),
        );
    }
    html.push_str("</div>\n</li>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://o.github.io/p/";

    fn settings(pattern: &str, order: &[&str]) -> NavigationSettings {
        NavigationSettings {
            filter: RefFilter::new(pattern).unwrap(),
            refs_order: order.iter().map(|s| (*s).to_owned()).collect(),
            alias_names: AliasNames::default(),
            base_url: BASE.to_owned(),
            remaining_order: RemainingOrder::Sorted,
        }
    }

    fn dirs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn labels(entries: &[NavEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn filter_is_start_anchored() {
        let filter = RefFilter::new("v").unwrap();
        assert!(filter.matches("v1.0.0"));
        assert!(!filter.matches("dev"));
        let filter = RefFilter::new("^main$|^v").unwrap();
        assert!(filter.matches("main"));
        assert!(!filter.matches("main-old"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(RefFilter::new("("), Err(AssembleError::Pattern(_))));
    }

    #[test]
    fn priority_entries_come_first() {
        let nav = settings("^main$|^v", &["main"]).build(&dirs(&[
            "v1.0.0",
            "v1.9.0",
            "v2.0.0-rc1",
            "main",
        ]));
        assert_eq!(labels(&nav), vec!["main", "v2.0.0-rc1", "v1.9.0", "v1.0.0"]);
    }

    #[test]
    fn filesystem_order_is_kept_when_requested() {
        let mut nav_settings = settings("^main$|^v", &["main"]);
        nav_settings.remaining_order = RemainingOrder::Filesystem;
        let nav = nav_settings.build(&dirs(&["v1.0.0", "main", "v2.0.0", "v1.5.0"]));
        assert_eq!(labels(&nav), vec!["main", "v1.0.0", "v2.0.0", "v1.5.0"]);
    }

    #[test]
    fn remaining_order_from_str() {
        assert_eq!("sorted".parse(), Ok(RemainingOrder::Sorted));
        assert_eq!("filesystem".parse(), Ok(RemainingOrder::Filesystem));
        assert!("random".parse::<RemainingOrder>().is_err());
        assert_eq!(RemainingOrder::Filesystem.to_string(), "filesystem");
    }

    #[test]
    fn filtered_out_refs_never_listed() {
        let nav = settings("^main$", &["feature", "main"]).build(&dirs(&["feature", "main"]));
        assert_eq!(labels(&nav), vec!["main"]);
    }

    #[test]
    fn missing_priority_entries_are_omitted() {
        let nav = settings("^main$|^devel$", &["devel", "main", "ghost"]).build(&dirs(&["main"]));
        assert_eq!(labels(&nav), vec!["main"]);
    }

    #[test]
    fn duplicate_priority_entries_listed_once() {
        let nav = settings("^main$", &["main", "main"]).build(&dirs(&["main"]));
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn alternate_names_relabel_aliases() {
        let mut nav_settings = settings(".*", &["main", "latest-tag"]);
        nav_settings.alias_names = AliasNames {
            latest_tag: Some("stable".to_owned()),
            release_candidate: None,
        };
        let nav = nav_settings.build(&dirs(&["main", "latest-tag", "stable", "v1.0.0"]));
        assert_eq!(
            nav,
            vec![
                NavEntry {
                    label: "main".to_owned(),
                    dir: "main".to_owned(),
                    href: format!("{BASE}main/"),
                },
                NavEntry {
                    label: "stable".to_owned(),
                    dir: "latest-tag".to_owned(),
                    href: format!("{BASE}latest-tag/"),
                },
                NavEntry {
                    label: "v1.0.0".to_owned(),
                    dir: "v1.0.0".to_owned(),
                    href: format!("{BASE}v1.0.0/"),
                },
            ]
        );
    }

    #[test]
    fn priority_entry_may_name_the_alternate() {
        let mut nav_settings = settings(".*", &["main", "stable", "devel"]);
        nav_settings.alias_names.latest_tag = Some("stable".to_owned());
        let nav = nav_settings.build(&dirs(&["v1.0.0", "devel", "stable", "latest-tag", "main"]));
        assert_eq!(labels(&nav), vec!["main", "stable", "devel", "v1.0.0"]);
        assert_eq!(nav[1].dir, "latest-tag");
    }

    #[test]
    fn remaining_entries_default_to_enumeration_order() {
        assert_eq!(RemainingOrder::default(), RemainingOrder::Filesystem);
        let mut nav_settings = settings("^main$|^v|^feature", &["main"]);
        nav_settings.remaining_order = RemainingOrder::default();
        let nav = nav_settings.build(&dirs(&["v1.0.0", "feature-b", "main", "v2.0.0"]));
        assert_eq!(labels(&nav), vec!["main", "v1.0.0", "feature-b", "v2.0.0"]);
    }

    #[test]
    fn sorted_remaining_entries_put_names_before_versions() {
        let nav = settings(".*", &["main"]).build(&dirs(&[
            "v1.0.0",
            "feature-a",
            "main",
            "v2.0.0",
            "feature-b",
        ]));
        assert_eq!(
            labels(&nav),
            vec!["main", "feature-b", "feature-a", "v2.0.0", "v1.0.0"]
        );
    }

    #[test]
    fn render_dropdown_lists_entries_in_order() {
        let html = render_dropdown(&[
            NavEntry {
                label: "main".to_owned(),
                dir: "main".to_owned(),
                href: format!("{BASE}main/"),
            },
            NavEntry {
                label: "v1.0.0".to_owned(),
                dir: "v1.0.0".to_owned(),
                href: format!("{BASE}v1.0.0/"),
            },
        ]);
        assert!(html.starts_with("<li class=\"nav-item dropdown\">"));
        assert!(html.contains("aria-labelledby=\"dropdown-versions\""));
        let main = html.find(">main</a>").unwrap();
        let v1 = html.find(">v1.0.0</a>").unwrap();
        assert!(main < v1);
        assert!(html.ends_with("</div>\n</li>"));
    }

    #[test]
    fn render_dropdown_escapes_labels() {
        let html = render_dropdown(&[NavEntry {
            label: "<b>".to_owned(),
            dir: "x".to_owned(),
            href: "https://x/a\"b/".to_owned(),
        }]);
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("a&quot;b"));
    }
}
