// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: listener address,
//! buffer sizes, and the consistency of the directory section.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{DirectoryConfig, TurnstileConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest real-world UTC offset is +14:00.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &TurnstileConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.port == 0 {
        fail("gateway.port must be between 1 and 65535".to_string());
    }

    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|token| token.trim().is_empty())
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.queue.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        fail(format!(
            "queue.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
            config.queue.utc_offset_minutes
        ));
    }

    if config.hub.dispatch_buffer == 0 {
        fail("hub.dispatch_buffer must be at least 1".to_string());
    }
    if config.hub.subscriber_buffer == 0 {
        fail("hub.subscriber_buffer must be at least 1".to_string());
    }

    validate_directory(&config.directory, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_directory(directory: &DirectoryConfig, errors: &mut Vec<ConfigError>) {
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let mut department_ids = HashSet::new();
    for (i, department) in directory.departments.iter().enumerate() {
        if !department_ids.insert(department.id) {
            fail(format!("duplicate department id `{}`", department.id));
        }
        if department.name.trim().is_empty() {
            fail(format!("directory.departments[{i}].name must not be empty"));
        }
    }

    let mut service_ids = HashSet::new();
    let mut symbols = HashSet::new();
    for (i, service) in directory.services.iter().enumerate() {
        if !service_ids.insert(service.id) {
            fail(format!("duplicate service id `{}`", service.id));
        }
        let symbol_len = service.symbol.chars().count();
        if !(1..=2).contains(&symbol_len)
            || !service.symbol.chars().all(|c| c.is_ascii_alphanumeric())
        {
            fail(format!(
                "directory.services[{i}].symbol `{}` must be 1-2 letters or digits",
                service.symbol
            ));
        }
        if !symbols.insert(service.symbol.as_str()) {
            fail(format!("duplicate service symbol `{}`", service.symbol));
        }
        if service.name.trim().is_empty() {
            fail(format!("directory.services[{i}].name must not be empty"));
        }
        if !department_ids.contains(&service.department) {
            fail(format!(
                "directory.services[{i}] references unknown department `{}`",
                service.department
            ));
        }
    }

    let mut counter_ids = HashSet::new();
    let mut numbers = HashSet::new();
    let mut employees = HashSet::new();
    for (i, counter) in directory.counters.iter().enumerate() {
        if !counter_ids.insert(counter.id) {
            fail(format!("duplicate counter id `{}`", counter.id));
        }
        if counter.number == 0 {
            fail(format!("directory.counters[{i}].number must be positive"));
        } else if !numbers.insert(counter.number) {
            fail(format!("duplicate counter number {}", counter.number));
        }
        for department in &counter.departments {
            if !department_ids.contains(department) {
                fail(format!(
                    "directory.counters[{i}] references unknown department `{department}`"
                ));
            }
        }
        if let Some(employee) = &counter.employee {
            if employee.trim().is_empty() {
                fail(format!("directory.counters[{i}].employee must not be blank"));
            } else if !employees.insert(employee.as_str()) {
                fail(format!("employee `{employee}` is assigned to more than one counter"));
            }
        }
    }
}
