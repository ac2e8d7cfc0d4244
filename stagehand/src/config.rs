//! Explicit configuration plumbing.
//!
//! Configuration enters the harness as values, never as reads of ambient
//! mutable state from deep inside a stage. These helpers exist for the
//! composition root that builds those values.

use crate::errors::ConfigError;

/// Reads a required environment variable.
///
/// Unset or empty is an error; there is no silent default for required
/// coordinates like state-backend credentials.
pub fn require_var(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar {
            name: name.to_string(),
        }),
    }
}

/// Reads an optional environment variable, falling back to a default.
#[must_use]
pub fn var_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_require_var_present() {
        std::env::set_var("STAGEHAND_CONFIG_TEST_SET", "value");
        let value = require_var("STAGEHAND_CONFIG_TEST_SET").unwrap();
        std::env::remove_var("STAGEHAND_CONFIG_TEST_SET");
        assert_eq!(value, "value");
    }

    #[test]
    fn test_require_var_missing() {
        let err = require_var("STAGEHAND_CONFIG_TEST_MISSING").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVar {
                name: "STAGEHAND_CONFIG_TEST_MISSING".to_string()
            }
        );
    }

    #[test]
    fn test_require_var_empty_is_missing() {
        std::env::set_var("STAGEHAND_CONFIG_TEST_EMPTY", "  ");
        let result = require_var("STAGEHAND_CONFIG_TEST_EMPTY");
        std::env::remove_var("STAGEHAND_CONFIG_TEST_EMPTY");
        assert!(result.is_err());
    }

    #[test]
    fn test_var_or_default() {
        assert_eq!(var_or("STAGEHAND_CONFIG_TEST_ABSENT", "eastasia"), "eastasia");

        std::env::set_var("STAGEHAND_CONFIG_TEST_REGION", "canadacentral");
        let value = var_or("STAGEHAND_CONFIG_TEST_REGION", "eastasia");
        std::env::remove_var("STAGEHAND_CONFIG_TEST_REGION");
        assert_eq!(value, "canadacentral");
    }
}
