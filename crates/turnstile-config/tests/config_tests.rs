// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Turnstile configuration system.

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use turnstile_config::diagnostic::ConfigError;
use turnstile_config::model::TurnstileConfig;
use turnstile_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use turnstile_core::{CounterType, DepartmentId};

const FULL: &str = r#"
[service]
name = "front-desk"
log_level = "debug"

[gateway]
host = "0.0.0.0"
port = 9000
bearer_token = "staff-secret"

[storage]
database_path = "/tmp/turnstile-test.db"
wal_mode = false

[queue]
utc_offset_minutes = 240
carry_over_waiting = true

[hub]
dispatch_buffer = 16
subscriber_buffer = 4

[prometheus]
enabled = false

[[directory.departments]]
id = "6f1c1c1e-8d4f-4a55-9d1a-0b0b0b0b0001"
name = "Licensing"
name_ar = "الترخيص"

[[directory.services]]
id = "6f1c1c1e-8d4f-4a55-9d1a-0b0b0b0b0002"
symbol = "A"
name = "Renewals"
department = "6f1c1c1e-8d4f-4a55-9d1a-0b0b0b0b0001"

[[directory.counters]]
id = "6f1c1c1e-8d4f-4a55-9d1a-0b0b0b0b0003"
number = 3
counter_type = "cashier"
departments = ["6f1c1c1e-8d4f-4a55-9d1a-0b0b0b0b0001"]
employee = "agent-7"
"#;

#[test]
fn full_toml_deserializes_into_turnstile_config() {
    let config = load_config_from_str(FULL).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "front-desk");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("staff-secret"));
    assert_eq!(config.storage.database_path, "/tmp/turnstile-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.queue.utc_offset_minutes, 240);
    assert!(config.queue.carry_over_waiting);
    assert_eq!(config.hub.dispatch_buffer, 16);
    assert_eq!(config.hub.subscriber_buffer, 4);
    assert!(!config.prometheus.enabled);
    assert_eq!(config.directory.counters[0].counter_type, CounterType::Cashier);
}

#[test]
fn full_toml_passes_validation() {
    let config = load_and_validate_str(FULL).expect("directory is consistent");
    let directory = config.directory.to_directory();
    assert_eq!(directory.services[0].symbol, "A");
    assert_eq!(
        directory.counters[0].departments,
        vec![directory.departments[0].id]
    );
    assert_eq!(
        directory.counters[0].employee.as_ref().map(|a| a.as_str()),
        Some("agent-7")
    );
    assert_eq!(
        directory.services[0].department,
        DepartmentId(config.directory.departments[0].id)
    );
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.service.name, "turnstile");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8080);
    assert!(config.gateway.bearer_token.is_none());
    assert!(config.storage.database_path.ends_with("turnstile.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.queue.utc_offset_minutes, 0);
    assert!(!config.queue.carry_over_waiting);
    assert!(config.prometheus.enabled);
    assert!(config.directory.is_empty());
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = "[gateway]\nprot = 9000\n";
    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "prot");
            assert_eq!(suggestion.as_deref(), Some("port"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = "[gateway]\nport = \"eighty\"\n";
    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[gateway]
port = 0

[hub]
subscriber_buffer = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn dotted_override_wins_over_toml() {
    let config: TurnstileConfig = Figment::new()
        .merge(Serialized::defaults(TurnstileConfig::default()))
        .merge(Toml::string("[gateway]\nbearer_token = \"from-file\"\n"))
        .merge(("gateway.bearer_token", "from-env"))
        .extract()
        .expect("should merge override");
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("from-env"));
}

#[test]
fn missing_config_file_is_skipped() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/turnstile.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.service.name, "turnstile");
}
