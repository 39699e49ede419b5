//! Log output for tests.
//!
//! Dispatches, transform steps and recorded failures are emitted as `tracing`
//! events. [`init_test_logging`] routes them through the test harness's
//! captured output.
//!
//! ```rust,ignore
//! reqr::logging::init_test_logging(&LogConfig::default())?;
//! ```

use crate::error::{ReqrError, ReqrResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "warn", "reqr=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Verbose configuration showing every dispatch and transform step.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: "reqr=debug".to_string(),
            ..Self::default()
        }
    }

    /// Checks that the level parses as a filter.
    pub fn validate(&self) -> ReqrResult<()> {
        create_env_filter(&self.level).map(|_| ())
    }
}

/// Installs a subscriber that writes through the test harness.
///
/// Returns `Ok(false)` when logging is disabled or a global subscriber is
/// already installed, which is expected when several tests call this.
pub fn init_test_logging(config: &LogConfig) -> ReqrResult<bool> {
    if !config.enabled {
        return Ok(false);
    }
    let filter = create_env_filter(&config.level)?;

    let installed = if config.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_test_writer()
            .with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).try_init()
    };

    Ok(installed.is_ok())
}

fn create_env_filter(filter: &str) -> ReqrResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| ReqrError::ConfigInvalid(format!("invalid log level {filter:?}: {e}")))
}
