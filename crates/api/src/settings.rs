//! Runner endpoint resolution.

use std::env;
use std::time::Duration;

use url::Url;
use vlei_util::ExplorerConfig;

use crate::BridgeError;

/// Environment variable overriding the runner base URL.
pub const RUNNER_URL_ENV: &str = "VLEI_RUNNER_URL";
/// Base URL used when nothing else is configured.
pub const DEFAULT_RUNNER_URL: &str = "http://localhost:3001";
/// Path of the submission endpoint relative to the base URL.
pub const RUN_WORKFLOW_PATH: &str = "run-workflow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
}

impl RunnerSettings {
    /// Resolves the base URL from, in order: `explicit`, `VLEI_RUNNER_URL`, the
    /// explorer config file, then [`DEFAULT_RUNNER_URL`].
    pub fn resolve(explicit: Option<&str>, config: &ExplorerConfig) -> Result<Self, BridgeError> {
        let from_env = env::var(RUNNER_URL_ENV).ok().filter(|value| !value.trim().is_empty());
        let base = explicit
            .map(str::to_string)
            .or(from_env)
            .or_else(|| config.runner_url.clone())
            .unwrap_or_else(|| DEFAULT_RUNNER_URL.to_string());
        Self::from_url(&base)
    }

    pub fn from_url(base: &str) -> Result<Self, BridgeError> {
        Ok(Self {
            base_url: validate_base_url(base)?,
            connect_timeout: Duration::from_secs(10),
        })
    }

    /// Absolute URL of the submission endpoint.
    pub fn run_url(&self) -> Result<Url, BridgeError> {
        let joined = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), RUN_WORKFLOW_PATH);
        Url::parse(&joined).map_err(|error| BridgeError::InvalidUrl {
            url: joined.clone(),
            reason: error.to_string(),
        })
    }
}

/// Validates that a base URL parses, uses http(s) and names a host.
fn validate_base_url(base: &str) -> Result<Url, BridgeError> {
    let invalid = |reason: String| BridgeError::InvalidUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme must be http or https; got '{}://'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must include a host".to_string()));
    }
    Ok(parsed)
}
