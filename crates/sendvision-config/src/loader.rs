// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `/etc/sendvision/sendvision.toml`, then
//! `~/.config/sendvision/sendvision.toml`, then `./sendvision.toml`, then
//! `SENDVISION_*` environment variables. Later layers win.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SendvisionConfig;

pub(crate) const LOCAL_FILE: &str = "sendvision.toml";
pub(crate) const SYSTEM_FILE: &str = "/etc/sendvision/sendvision.toml";

/// Path of the per-user config file, if a config directory exists.
pub(crate) fn user_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sendvision").join(LOCAL_FILE))
}

/// Build the full Figment (defaults, three files, environment).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(SendvisionConfig::default()))
        .merge(Toml::file(SYSTEM_FILE));
    if let Some(user) = user_file() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_FILE)).merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<SendvisionConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SendvisionConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SendvisionConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SendvisionConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SendvisionConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `SENDVISION_<SECTION>_<KEY>` maps to `<section>.<key>`.
///
/// Only the first underscore separates the section, so keys that contain
/// underscores (`SENDVISION_DASHBOARD_REALTIME_ENABLED`) stay intact.
fn env_provider() -> Env {
    Env::prefixed("SENDVISION_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        ["source_", "dashboard_", "log_"]
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .map(|rest| format!("{}.{rest}", section.trim_end_matches('_')))
            })
            .unwrap_or(key)
            .into()
    })
}
