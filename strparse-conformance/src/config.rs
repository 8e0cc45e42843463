use std::env;

pub const FAIL_FAST_ENV: &str = "STRPARSE_FAIL_FAST";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Settings for a conformance run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceConfig {
    /// Stop at the first failing check instead of reporting all of them
    pub fail_fast: bool,
    /// `tracing` filter directives used when installing the subscriber
    pub log_filter: String,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            log_filter: "strparse_core=debug,strparse_conformance=info,warn".to_string(),
        }
    }
}

impl ConformanceConfig {
    /// Build a config from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fail_fast: lookup(FAIL_FAST_ENV)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.fail_fast),
            log_filter: lookup(LOG_FILTER_ENV)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}
