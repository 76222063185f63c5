// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Merge order (later overrides earlier): compiled defaults,
//! `/etc/turnstile/turnstile.toml`, `~/.config/turnstile/turnstile.toml`,
//! `./turnstile.toml`, then `TURNSTILE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TurnstileConfig;

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/turnstile/turnstile.toml";

/// Sections whose keys may be set from the environment.
const ENV_SECTIONS: &[&str] = &["service", "gateway", "storage", "queue", "hub", "prometheus"];

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<TurnstileConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<TurnstileConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TurnstileConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TurnstileConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TurnstileConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TurnstileConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file("turnstile.toml"))
        .merge(env_provider())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("turnstile/turnstile.toml"))
}

/// Map `TURNSTILE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `TURNSTILE_GATEWAY_BEARER_TOKEN` maps to `gateway.bearer_token`.
fn env_provider() -> Env {
    Env::prefixed("TURNSTILE_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
