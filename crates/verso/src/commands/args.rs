//! Arguments shared by the site commands.

use std::path::PathBuf;

use clap::Args;
use verso_config::CliSettings;
use verso_site::RemainingOrder;

/// Where the site lives and how it is addressed.
#[derive(Args, Debug)]
pub(crate) struct SiteArgs {
    /// Site root holding one directory per ref (overrides config).
    #[arg(env = "VERSO_ROOT")]
    pub(crate) root: Option<PathBuf>,

    /// Absolute URL the site is served from (overrides config).
    #[arg(long, env = "VERSO_BASE_URL", conflicts_with = "repository")]
    pub(crate) base_url: Option<String>,

    /// GitHub repository as owner/name; the base URL becomes its Pages URL.
    #[arg(long, env = "VERSO_REPOSITORY")]
    pub(crate) repository: Option<String>,

    /// Path to configuration file (default: auto-discover verso.toml).
    #[arg(short, long, env = "VERSO_CONFIG")]
    pub(crate) config: Option<PathBuf>,
}

/// Which refs the versions dropdown lists, and in what order.
#[derive(Args, Debug)]
pub(crate) struct NavigationArgs {
    /// Regular expression matched against the start of each ref name.
    #[arg(long, env = "VERSO_PATTERN")]
    pub(crate) pattern: Option<String>,

    /// Refs listed first; values may be space separated.
    #[arg(long, num_args = 1.., value_delimiter = ' ', env = "VERSO_REFS_ORDER")]
    pub(crate) refs_order: Option<Vec<String>>,

    /// Order of the remaining refs: "filesystem" or "sorted".
    #[arg(long, env = "VERSO_REMAINING_ORDER")]
    pub(crate) remaining_order: Option<RemainingOrder>,
}

impl SiteArgs {
    pub(crate) fn apply(&self, settings: &mut CliSettings) {
        settings.root.clone_from(&self.root);
        settings.base_url.clone_from(&self.base_url);
        settings.repository.clone_from(&self.repository);
    }
}

impl NavigationArgs {
    pub(crate) fn apply(&self, settings: &mut CliSettings) {
        settings.pattern.clone_from(&self.pattern);
        settings.refs_order = self.refs_order.as_ref().map(|refs| split_refs(refs));
        settings.remaining_order = self.remaining_order;
    }
}

/// Flatten whitespace-separated ref lists.
fn split_refs(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split_whitespace())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_refs_handles_mixed_input() {
        let values = vec!["main  devel".to_owned(), String::new(), "v1.0.0".to_owned()];
        assert_eq!(split_refs(&values), vec!["main", "devel", "v1.0.0"]);
    }

    #[test]
    fn navigation_args_fill_settings() {
        let args = NavigationArgs {
            pattern: Some("^v".to_owned()),
            refs_order: Some(vec!["main latest-tag".to_owned()]),
            remaining_order: Some(RemainingOrder::Filesystem),
        };
        let mut settings = CliSettings::default();
        args.apply(&mut settings);

        assert_eq!(settings.pattern.as_deref(), Some("^v"));
        assert_eq!(
            settings.refs_order,
            Some(vec!["main".to_owned(), "latest-tag".to_owned()])
        );
        assert_eq!(settings.remaining_order, Some(RemainingOrder::Filesystem));
    }
}
