//! Configuration types.

use serde::{Deserialize, Serialize};

/// Settings for the outbound report client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Connection timeout for report requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall request timeout for report requests, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

/// Configuration for the supervisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Echo the child's diagnostic output to the supervisor's stderr.
    pub echo_diagnostics: bool,
    /// Outbound report settings.
    pub report: ReportConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            echo_diagnostics: true,
            report: ReportConfig::default(),
        }
    }
}
