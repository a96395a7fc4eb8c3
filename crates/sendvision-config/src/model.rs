// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level SendVision configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SendvisionConfig {
    /// Remote record source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Dashboard behavior.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Which remote collection the dashboard watches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Name of the table the classification pipeline writes to.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

fn default_collection() -> String {
    "emails".to_string()
}

/// Dashboard refresh and time-window defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Refresh on remote change notifications. When false only filter
    /// changes and manual refreshes re-query.
    #[serde(default = "default_realtime_enabled")]
    pub realtime_enabled: bool,

    /// Size of the monitoring window: today minus this many days through today.
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            realtime_enabled: default_realtime_enabled(),
            default_window_days: default_window_days(),
        }
    }
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_window_days() -> u32 {
    7
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
