// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment overrides on top of an explicit config file.
//!
//! These tests mutate process environment, so they run serially.

use std::io::Write;

use serial_test::serial;
use turnstile_config::load_and_validate_path;

const FILE: &str = r#"
[gateway]
port = 8000

[queue]
utc_offset_minutes = 240
"#;

fn config_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FILE.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let file = config_file();
    unsafe {
        std::env::set_var("TURNSTILE_GATEWAY_PORT", "9100");
        std::env::set_var("TURNSTILE_GATEWAY_BEARER_TOKEN", "from-env");
    }
    let config = load_and_validate_path(file.path());
    unsafe {
        std::env::remove_var("TURNSTILE_GATEWAY_PORT");
        std::env::remove_var("TURNSTILE_GATEWAY_BEARER_TOKEN");
    }

    let config = config.unwrap();
    assert_eq!(config.gateway.port, 9100);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("from-env"));
    assert_eq!(config.queue.utc_offset_minutes, 240);
}

#[test]
#[serial]
fn invalid_env_value_is_reported() {
    let file = config_file();
    unsafe {
        std::env::set_var("TURNSTILE_QUEUE_UTC_OFFSET_MINUTES", "9999");
    }
    let result = load_and_validate_path(file.path());
    unsafe {
        std::env::remove_var("TURNSTILE_QUEUE_UTC_OFFSET_MINUTES");
    }

    let errors = result.unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
#[serial]
fn file_values_apply_without_env() {
    let file = config_file();
    let config = load_and_validate_path(file.path()).unwrap();
    assert_eq!(config.gateway.port, 8000);
    assert!(config.gateway.bearer_token.is_none());
}
