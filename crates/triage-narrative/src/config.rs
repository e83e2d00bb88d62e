//! Narrative service configuration.

use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::generator::DEFAULT_TIMEOUT;

/// Primary API key variable.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Fallback API key variable.
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
/// Model override.
pub const ENV_MODEL: &str = "TRIAGE_NARRATIVE_MODEL";
/// Per-request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "TRIAGE_NARRATIVE_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Narrative service settings. Without an API key every request is
/// reported unavailable.
#[derive(Clone, PartialEq)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for NarrativeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NarrativeConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()).filter(|k| !k.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as missing;
    /// an unusable timeout falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: present(ENV_API_KEY).or_else(|| present(ENV_API_KEY_FALLBACK)),
            model: present(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: present(ENV_TIMEOUT_SECS).map_or(DEFAULT_TIMEOUT, |raw| parse_timeout(&raw)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_timeout(raw: &str) -> Duration {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(value = raw, "ignoring invalid narrative timeout");
            DEFAULT_TIMEOUT
        }
    }
}
