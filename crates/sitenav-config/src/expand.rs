//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// Bare `$VAR` is left untouched. An unset variable without a default is an
/// error naming both the variable and the config field.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_taxonomy_url_host() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SITENAV_TEST_TAXONOMY_HOST", "cd.example.com");
        }
        let result = expand_env(
            "https://${SITENAV_TEST_TAXONOMY_HOST}/taxonomy",
            "source.taxonomy_url",
        )
        .unwrap();
        assert_eq!(result, "https://cd.example.com/taxonomy");
        unsafe {
            std::env::remove_var("SITENAV_TEST_TAXONOMY_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("SITENAV_TEST_UNSET_DIR");
        }
        let result = expand_env("${SITENAV_TEST_UNSET_DIR:-content}", "source.content_dir").unwrap();
        assert_eq!(result, "content");
    }

    #[test]
    fn test_expand_missing_var_error_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("SITENAV_TEST_MISSING");
        }
        let err = expand_env("${SITENAV_TEST_MISSING}", "source.taxonomy_url").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("SITENAV_TEST_MISSING"));
        assert!(message.contains("source.taxonomy_url"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("content", "f").unwrap(), "content");
        assert_eq!(expand_env("$HOME/content", "f").unwrap(), "$HOME/content");
    }
}
