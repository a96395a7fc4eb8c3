// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the SendVision dashboard.
//!
//! TOML files are layered with Figment (system, user, local, then
//! `SENDVISION_*` environment variables), rejected on unknown keys, and
//! validated after deserialization. Errors render as miette diagnostics.
//!
//! ```no_run
//! use sendvision_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("watching collection {}", config.source.collection);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SendvisionConfig;

/// Load the layered configuration and validate it.
pub fn load_and_validate() -> Result<SendvisionConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(collection = %config.source.collection, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from one explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<SendvisionConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SendvisionConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read whichever config files exist so diagnostics can show source spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_FILE))
        .unwrap_or_else(|_| loader::LOCAL_FILE.into());
    [
        Some(local),
        loader::user_file(),
        Some(loader::SYSTEM_FILE.into()),
    ]
    .into_iter()
    .flatten()
    .filter_map(|path| {
        std::fs::read_to_string(&path)
            .ok()
            .map(|content| (path.display().to_string(), content))
    })
    .collect()
}
