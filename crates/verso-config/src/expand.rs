//! `${VAR}` expansion for configuration strings.
//!
//! `${VAR}` must be set; `${VAR:-default}` falls back to `default`. Values
//! without `${` are returned as is, so a bare `$VAR` alone is not expanded.

use crate::ConfigError;

/// Expand `${...}` references in `value`, naming `field` in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| match std::env::var(var) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(UnsetVar(var.to_owned())),
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

/// Expand an optional field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(inner) = value.as_deref() {
        *value = Some(expand_env(inner, field)?);
    }
    Ok(())
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(
            expand_env("https://o.github.io/p/", "site.base_url").unwrap(),
            "https://o.github.io/p/"
        );
    }

    #[test]
    fn test_expands_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("VERSO_TEST_OWNER", "acme");
        }
        let result = expand_env("https://${VERSO_TEST_OWNER}.github.io/pkg/", "site.base_url");
        assert_eq!(result.unwrap(), "https://acme.github.io/pkg/");
        unsafe {
            std::env::remove_var("VERSO_TEST_OWNER");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VERSO_TEST_REPO_UNSET");
        }
        let result = expand_env("${VERSO_TEST_REPO_UNSET:-acme/pkg}", "site.repository");
        assert_eq!(result.unwrap(), "acme/pkg");
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VERSO_TEST_MISSING");
        }
        let err = expand_env("${VERSO_TEST_MISSING}", "site.repository").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("VERSO_TEST_MISSING"));
        assert!(message.contains("site.repository"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOME/x", "site.base_url").unwrap(), "$HOME/x");
    }

    #[test]
    fn test_expand_opt_skips_none() {
        let mut value = None;
        expand_opt(&mut value, "site.base_url").unwrap();
        assert_eq!(value, None);
    }
}
