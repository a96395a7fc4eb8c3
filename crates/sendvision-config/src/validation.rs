// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::SendvisionConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest monitoring window accepted, in days.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Validate a deserialized configuration, collecting every problem found.
pub fn validate_config(config: &SendvisionConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.source.collection.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "source.collection must not be empty".to_string(),
        });
    }

    let days = config.dashboard.default_window_days;
    if days == 0 || days > MAX_WINDOW_DAYS {
        errors.push(ConfigError::Validation {
            message: format!(
                "dashboard.default_window_days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
            ),
        });
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
