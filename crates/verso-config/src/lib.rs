//! Configuration management for verso.
//!
//! Parses `verso.toml` with serde and discovers it in the current directory
//! or its parents. CLI values are layered on top via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.base_url`
//! - `site.repository`

mod expand;

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use verso_site::navigation::RefFilter;
use verso_site::{AliasNames, AssembleConfig, RemainingOrder, normalize_base_url, pages_base_url};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "verso.toml";

/// Default ref inclusion pattern.
pub const DEFAULT_PATTERN: &str =
    r"^main$|^devel$|^latest-tag$|^release-candidate$|^v[0-9]+\.[0-9]+\.[0-9]+(-rc[0-9]+)?$";

/// Default priority list for the versions dropdown.
pub const DEFAULT_REFS_ORDER: [&str; 4] = ["main", "latest-tag", "release-candidate", "devel"];

/// Default ref the site root redirects to.
pub const DEFAULT_LANDING_PAGE: &str = "main";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub root: Option<PathBuf>,
    pub base_url: Option<String>,
    /// `owner/name`; used to derive the base URL when none is given.
    pub repository: Option<String>,
    pub default_landing_page: Option<String>,
    pub pattern: Option<String>,
    pub refs_order: Option<Vec<String>>,
    pub remaining_order: Option<RemainingOrder>,
    pub latest_tag_alt_name: Option<String>,
    pub release_candidate_alt_name: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site location and URLs as written in TOML.
    site: SiteConfigRaw,
    /// Navigation configuration.
    pub navigation: NavigationConfig,
    /// Alternate alias names.
    pub aliases: AliasesConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    root: Option<String>,
    base_url: Option<String>,
    repository: Option<String>,
    default_landing_page: Option<String>,
}

/// Resolved site configuration.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SiteConfig {
    /// Absolute site root.
    pub root: PathBuf,
    /// Base URL ending in `/`, if one was given or derived.
    pub base_url: Option<String>,
    /// Ref the site root redirects to.
    pub default_landing_page: String,
}

/// Navigation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Inclusion pattern over ref directory names.
    pub pattern: String,
    /// Refs listed first in the dropdown.
    pub refs_order: Vec<String>,
    /// Ordering of the other listed refs (`"sorted"` or `"filesystem"`).
    #[serde(deserialize_with = "parse_from_str")]
    pub remaining_order: RemainingOrder,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_owned(),
            refs_order: DEFAULT_REFS_ORDER.iter().map(|&r| r.to_owned()).collect(),
            remaining_order: RemainingOrder::default(),
        }
    }
}

/// Alternate names for alias directories.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AliasesConfig {
    pub latest_tag_alt_name: Option<String>,
    pub release_candidate_alt_name: Option<String>,
}

impl AliasesConfig {
    #[must_use]
    pub fn alias_names(&self) -> AliasNames {
        AliasNames {
            latest_tag: self.latest_tag_alt_name.clone(),
            release_candidate: self.release_candidate_alt_name.clone(),
        }
    }
}

fn parse_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`PAGES_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Base URL from an explicit value or an `owner/name` repository.
fn resolve_base_url(
    base_url: Option<&str>,
    repository: Option<&str>,
) -> Result<Option<String>, ConfigError> {
    if let Some(url) = base_url {
        require_non_empty(url, "site.base_url")?;
        require_http_url(url, "site.base_url")?;
        return Ok(Some(normalize_base_url(url)));
    }
    repository
        .map(|repo| {
            pages_base_url(repo).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "site.repository must have the form owner/name, got {repo:?}"
                ))
            })
        })
        .transpose()
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `verso.toml` in the current directory and its parents, falling back
    /// to defaults. CLI settings are applied last and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(root) = &settings.root {
            self.site_resolved.root.clone_from(root);
        }
        if settings.base_url.is_some() || settings.repository.is_some() {
            self.site_resolved.base_url =
                resolve_base_url(settings.base_url.as_deref(), settings.repository.as_deref())?;
        }
        if let Some(landing) = &settings.default_landing_page {
            self.site_resolved.default_landing_page.clone_from(landing);
        }
        if let Some(pattern) = &settings.pattern {
            self.navigation.pattern.clone_from(pattern);
        }
        if let Some(refs_order) = &settings.refs_order {
            self.navigation.refs_order.clone_from(refs_order);
        }
        if let Some(order) = settings.remaining_order {
            self.navigation.remaining_order = order;
        }
        if let Some(name) = &settings.latest_tag_alt_name {
            self.aliases.latest_tag_alt_name = Some(name.clone());
        }
        if let Some(name) = &settings.release_candidate_alt_name {
            self.aliases.release_candidate_alt_name = Some(name.clone());
        }
        Ok(())
    }

    /// Build the assembler input from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no base URL is known.
    pub fn assemble_config(&self) -> Result<AssembleConfig, ConfigError> {
        let base_url = self.site_resolved.base_url.clone().ok_or_else(|| {
            ConfigError::Validation(
                "site.base_url or site.repository is required to build links".to_owned(),
            )
        })?;
        Ok(AssembleConfig {
            root: self.site_resolved.root.clone(),
            base_url,
            landing_ref: self.site_resolved.default_landing_page.clone(),
            pattern: self.navigation.pattern.clone(),
            refs_order: self.navigation.refs_order.clone(),
            alias_names: self.aliases.alias_names(),
            remaining_order: self.navigation.remaining_order,
        })
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            navigation: NavigationConfig::default(),
            aliases: AliasesConfig::default(),
            site_resolved: SiteConfig {
                root: base.to_path_buf(),
                base_url: None,
                default_landing_page: DEFAULT_LANDING_PAGE.to_owned(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(
            &self.site_resolved.default_landing_page,
            "site.default_landing_page",
        )?;
        if let Some(url) = &self.site_resolved.base_url {
            require_http_url(url, "site.base_url")?;
        }
        RefFilter::new(&self.navigation.pattern).map_err(|e| {
            ConfigError::Validation(format!("navigation.pattern is invalid: {e}"))
        })?;
        if self.navigation.refs_order.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "navigation.refs_order cannot contain empty names".to_owned(),
            ));
        }
        self.aliases
            .alias_names()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("aliases: {e}")))?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.site.base_url, "site.base_url")?;
        expand::expand_opt(&mut self.site.repository, "site.repository")?;
        Ok(())
    }

    /// Resolve the raw site section against the config file's directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.site_resolved = SiteConfig {
            root: config_dir.join(self.site.root.as_deref().unwrap_or(".")),
            base_url: resolve_base_url(
                self.site.base_url.as_deref(),
                self.site.repository.as_deref(),
            )?,
            default_landing_page: self
                .site
                .default_landing_page
                .clone()
                .unwrap_or_else(|| DEFAULT_LANDING_PAGE.to_owned()),
        };
        Ok(())
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project")).unwrap();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(
            config.site_resolved,
            SiteConfig {
                root: PathBuf::from("/site"),
                base_url: None,
                default_landing_page: "main".to_owned(),
            }
        );
        assert_eq!(config.navigation.pattern, DEFAULT_PATTERN);
        assert_eq!(
            config.navigation.refs_order,
            vec!["main", "latest-tag", "release-candidate", "devel"]
        );
        assert_eq!(config.navigation.remaining_order, RemainingOrder::Filesystem);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_pattern_selects_expected_refs() {
        let filter = RefFilter::new(DEFAULT_PATTERN).unwrap();
        for name in ["main", "devel", "latest-tag", "release-candidate", "v1.2.3", "v1.2.3-rc4"] {
            assert!(filter.matches(name), "{name}");
        }
        for name in ["feature", "v1.2", "main2", "v1.2.3-beta"] {
            assert!(!filter.matches(name), "{name}");
        }
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
[site]
root = "public"
base_url = "https://docs.example.com/pkg"
default_landing_page = "devel"

[navigation]
pattern = "^main$|^v"
refs_order = ["main", "latest-tag"]
remaining_order = "sorted"

[aliases]
latest_tag_alt_name = "stable"
"#,
        );
        assert_eq!(config.site_resolved.root, PathBuf::from("/project/public"));
        assert_eq!(
            config.site_resolved.base_url.as_deref(),
            Some("https://docs.example.com/pkg/")
        );
        assert_eq!(config.site_resolved.default_landing_page, "devel");
        assert_eq!(config.navigation.pattern, "^main$|^v");
        assert_eq!(config.navigation.refs_order, vec!["main", "latest-tag"]);
        assert_eq!(config.navigation.remaining_order, RemainingOrder::Sorted);
        assert_eq!(config.aliases.latest_tag_alt_name.as_deref(), Some("stable"));
        assert_eq!(config.aliases.release_candidate_alt_name, None);
    }

    #[test]
    fn test_repository_derives_base_url() {
        let config = parse(
            r#"
[site]
repository = "acme/pkg"
"#,
        );
        assert_eq!(
            config.site_resolved.base_url.as_deref(),
            Some("https://acme.github.io/pkg/")
        );
    }

    #[test]
    fn test_base_url_wins_over_repository() {
        let config = parse(
            r#"
[site]
base_url = "https://docs.example.com/"
repository = "acme/pkg"
"#,
        );
        assert_eq!(
            config.site_resolved.base_url.as_deref(),
            Some("https://docs.example.com/")
        );
    }

    #[test]
    fn test_malformed_repository_rejected() {
        let mut config: Config = toml::from_str("[site]\nrepository = \"acme\"\n").unwrap();
        let err = config.resolve(Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let mut config: Config =
            toml::from_str("[site]\nbase_url = \"ftp://example.com\"\n").unwrap();
        let err = config.resolve(Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_remaining_order_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[navigation]\nremaining_order = \"random\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.navigation.pattern = "(".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("navigation.pattern"));
    }

    #[test]
    fn test_invalid_alternate_name_rejected() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.aliases.latest_tag_alt_name = Some("a/b".to_owned());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_cli_settings_override() {
        let mut config = parse(
            r#"
[site]
base_url = "https://docs.example.com/"

[navigation]
refs_order = ["main"]
"#,
        );
        let settings = CliSettings {
            root: Some(PathBuf::from("/elsewhere")),
            repository: Some("acme/pkg".to_owned()),
            refs_order: Some(vec!["devel".to_owned(), "main".to_owned()]),
            remaining_order: Some(RemainingOrder::Sorted),
            release_candidate_alt_name: Some("next".to_owned()),
            ..CliSettings::default()
        };
        config.apply_cli_settings(&settings).unwrap();

        assert_eq!(config.site_resolved.root, PathBuf::from("/elsewhere"));
        assert_eq!(
            config.site_resolved.base_url.as_deref(),
            Some("https://acme.github.io/pkg/")
        );
        assert_eq!(config.navigation.refs_order, vec!["devel", "main"]);
        assert_eq!(config.navigation.remaining_order, RemainingOrder::Sorted);
        assert_eq!(config.aliases.release_candidate_alt_name.as_deref(), Some("next"));
    }

    #[test]
    fn test_assemble_config_requires_base_url() {
        let config = Config::default_with_base(Path::new("/site"));
        let err = config.assemble_config().unwrap_err();
        assert!(err.to_string().contains("site.base_url"));
    }

    #[test]
    fn test_assemble_config_carries_settings() {
        let config = parse(
            r#"
[site]
repository = "acme/pkg"

[aliases]
latest_tag_alt_name = "stable"
"#,
        );
        let assemble = config.assemble_config().unwrap();
        assert_eq!(assemble.root, PathBuf::from("/project/."));
        assert_eq!(assemble.base_url, "https://acme.github.io/pkg/");
        assert_eq!(assemble.landing_ref, "main");
        assert_eq!(assemble.alias_names.latest_tag.as_deref(), Some("stable"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/verso.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_expands_env() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[site]\nrepository = \"${VERSO_CFG_TEST_REPO:-acme/fallback}\"\n",
        )
        .unwrap();
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VERSO_CFG_TEST_REPO");
        }

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(
            config.site_resolved.base_url.as_deref(),
            Some("https://acme.github.io/fallback/")
        );
        assert_eq!(config.site_resolved.root, temp.path().join("."));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_discover_config_walks_parents() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            discover_config(&nested),
            Some(temp.path().join(CONFIG_FILENAME))
        );
    }
}
