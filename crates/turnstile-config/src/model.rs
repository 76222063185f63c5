// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Turnstile queue service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};
use turnstile_core::{
    AgentId, Counter, CounterId, CounterType, Department, DepartmentId, Directory, Service,
    ServiceId,
};
use uuid::Uuid;

/// Top-level Turnstile configuration.
///
/// Every section is optional and defaults to values suitable for a single
/// local instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TurnstileConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP and WebSocket listener.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SQLite storage backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Queue scoping rules.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Notification hub buffers.
    #[serde(default)]
    pub hub: HubConfig,

    /// Prometheus metrics export.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Departments, services and counters synced into the store at startup.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Instance name, used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "turnstile".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on staff routes. `None` rejects every staff request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("turnstile").join("turnstile.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "turnstile.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Site offset from UTC used to compute the business day.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Let waiting tickets from earlier days stay callable.
    #[serde(default)]
    pub carry_over_waiting: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Capacity of the queue between publishers and the dispatcher task.
    #[serde(default = "default_dispatch_buffer")]
    pub dispatch_buffer: usize,

    /// Per-subscriber mailbox capacity. Events to a full mailbox are dropped.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            dispatch_buffer: default_dispatch_buffer(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

fn default_dispatch_buffer() -> usize {
    1024
}

fn default_subscriber_buffer() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    #[serde(default = "default_prometheus_enabled")]
    pub enabled: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: default_prometheus_enabled(),
        }
    }
}

fn default_prometheus_enabled() -> bool {
    true
}

/// Standalone directory, upserted into the store on startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub departments: Vec<DepartmentEntry>,

    #[serde(default)]
    pub services: Vec<ServiceEntry>,

    #[serde(default)]
    pub counters: Vec<CounterEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DepartmentEntry {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    pub id: Uuid,
    /// One or two characters, used as the ticket number prefix.
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    pub department: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CounterEntry {
    pub id: Uuid,
    pub number: u32,
    #[serde(default)]
    pub counter_type: CounterType,
    #[serde(default)]
    pub departments: Vec<Uuid>,
    /// Agent identity operating this counter.
    #[serde(default)]
    pub employee: Option<String>,
}

impl DirectoryConfig {
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() && self.services.is_empty() && self.counters.is_empty()
    }

    /// Convert into the domain directory the store syncs.
    pub fn to_directory(&self) -> Directory {
        Directory {
            departments: self
                .departments
                .iter()
                .map(|d| Department {
                    id: DepartmentId(d.id),
                    name: d.name.clone(),
                    name_ar: d.name_ar.clone(),
                })
                .collect(),
            services: self
                .services
                .iter()
                .map(|s| Service {
                    id: ServiceId(s.id),
                    symbol: s.symbol.clone(),
                    name: s.name.clone(),
                    name_ar: s.name_ar.clone(),
                    department: DepartmentId(s.department),
                })
                .collect(),
            counters: self
                .counters
                .iter()
                .map(|c| Counter {
                    id: CounterId(c.id),
                    number: c.number,
                    counter_type: c.counter_type,
                    departments: c.departments.iter().copied().map(DepartmentId).collect(),
                    employee: c.employee.as_deref().map(AgentId::from),
                })
                .collect(),
        }
    }
}
