//! Harness configuration.
//!
//! [`ReqrConfig`] holds the defaults shared by every dispatcher of a test
//! suite. [`ConfigLoader`] builds one in layers: defaults, then a TOML or
//! JSON document, then environment overrides.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::customize::parse_header;
use crate::error::{ReqrError, ReqrResult};
use crate::logging::LogConfig;
use crate::reporter::TestReporter;

/// Complete harness configuration.
///
/// # Example
///
/// ```
/// use reqr::ReqrConfig;
///
/// let config = ReqrConfig::default();
/// assert!(config.strict);
/// assert!(config.default_headers.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReqrConfig {
    /// Headers added to every dispatched request.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    /// Host header used when a request does not set one.
    #[serde(default)]
    pub default_host: Option<String>,

    /// Whether reporters fail the test on unclaimed soft failures.
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,
}

const fn default_strict() -> bool {
    true
}

impl Default for ReqrConfig {
    fn default() -> Self {
        Self {
            default_headers: BTreeMap::new(),
            default_host: None,
            strict: default_strict(),
            logging: LogConfig::default(),
        }
    }
}

impl ReqrConfig {
    /// Validates header names, header values and the log level.
    pub fn validate(&self) -> ReqrResult<()> {
        for (name, value) in &self.default_headers {
            parse_header(name, value).map_err(|e| ReqrError::ConfigInvalid(e.to_string()))?;
        }
        if let Some(host) = &self.default_host {
            HeaderValue::try_from(host.as_str())
                .map_err(|e| ReqrError::ConfigInvalid(format!("default_host {host:?}: {e}")))?;
        }
        self.logging.validate()
    }

    /// Creates a reporter for the named test with this configuration's
    /// strictness.
    #[must_use]
    pub fn reporter(&self, name: impl Into<String>) -> Arc<TestReporter> {
        TestReporter::with_strict(name, self.strict)
    }
}

/// Layered configuration loader.
///
/// ```
/// use reqr::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_string("default_host = \"api.test\"", "toml")
///     .unwrap()
///     .load()
///     .unwrap();
///
/// assert_eq!(config.default_host.as_deref(), Some("api.test"));
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ReqrConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file, picking the format from its extension.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ReqrResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReqrError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");
        self.with_string(&content, format)
    }

    /// Load configuration from a string in `toml` or `json` format.
    pub fn with_string(mut self, content: &str, format: &str) -> ReqrResult<Self> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content).map_err(ReqrError::ConfigJson)?,
            other => {
                return Err(ReqrError::ConfigInvalid(format!(
                    "unsupported configuration format: {other}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `REQR`:
    /// - `REQR__DEFAULT_HOST=api.test`
    /// - `REQR__STRICT=false`
    /// - `REQR__LOGGING__LEVEL=reqr=debug`
    /// - `REQR__LOGGING__JSON=true`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> ReqrResult<ReqrConfig> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> ReqrResult<()> {
        let var = |key: &str| env::var(format!("{prefix}__{key}")).ok();

        if let Some(host) = var("DEFAULT_HOST") {
            self.config.default_host = Some(host);
        }
        if let Some(strict) = var("STRICT") {
            self.config.strict = parse_bool("STRICT", &strict)?;
        }
        if let Some(enabled) = var("LOGGING__ENABLED") {
            self.config.logging.enabled = parse_bool("LOGGING__ENABLED", &enabled)?;
        }
        if let Some(level) = var("LOGGING__LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = var("LOGGING__JSON") {
            self.config.logging.json = parse_bool("LOGGING__JSON", &json)?;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> ReqrResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ReqrError::ConfigInvalid(format!(
            "{key}: expected a boolean, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml() {
        let toml = r#"
            default_host = "api.test"
            strict = false

            [default_headers]
            Accept = "application/json"

            [logging]
            level = "reqr=debug"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.default_host.as_deref(), Some("api.test"));
        assert!(!config.strict);
        assert_eq!(config.default_headers["Accept"], "application/json");
        assert_eq!(config.logging.level, "reqr=debug");
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"default_headers": {"X-Suite": "reqr"}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.default_headers["X-Suite"], "reqr");
        assert!(config.strict);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ConfigLoader::new()
            .with_string("timeout = 5", "toml")
            .unwrap_err();
        assert!(matches!(err, ReqrError::ConfigToml(_)));
        assert!(err.is_config());
    }

    #[test]
    fn test_unsupported_format() {
        let err = ConfigLoader::new().with_string("", "yaml").unwrap_err();
        assert!(matches!(err, ReqrError::ConfigInvalid(_)));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = ConfigLoader::new()
            .with_string("[default_headers]\n\"X Bad\" = \"v\"", "toml")
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ReqrError::ConfigInvalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/reqr.toml")
            .unwrap_err();
        assert!(matches!(err, ReqrError::ConfigRead { .. }));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("REQR_CONFIG_TEST__DEFAULT_HOST", "env.test");
        env::set_var("REQR_CONFIG_TEST__STRICT", "false");
        env::set_var("REQR_CONFIG_TEST__LOGGING__JSON", "1");

        let config = ConfigLoader::new()
            .with_env_prefix("reqr_config_test")
            .load()
            .unwrap();

        assert_eq!(config.default_host.as_deref(), Some("env.test"));
        assert!(!config.strict);
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_bad_bool() {
        env::set_var("REQR_BAD_BOOL_TEST__STRICT", "maybe");
        let err = ConfigLoader::new()
            .with_env_prefix("REQR_BAD_BOOL_TEST")
            .load()
            .unwrap_err();
        assert!(matches!(err, ReqrError::ConfigInvalid(_)));
    }

    #[test]
    fn test_reporter_strictness() {
        let config = ReqrConfig {
            strict: false,
            ..ReqrConfig::default()
        };
        let reporter = config.reporter("lenient");
        crate::Reporter::error(reporter.as_ref(), "left unclaimed");
        assert_eq!(reporter.failures().len(), 1);
    }
}
